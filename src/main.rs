//! gymsim - Gym roster simulator

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate, NaiveDateTime, Utc};
use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use gymsim::auth;
use gymsim::catalog::{Expertise, weekday_name};
use gymsim::config::{AssignMode, AssignOptions, DB_ENV, DEFAULT_DB_PATH, ProjectionOptions};
use gymsim::db::{Database, MemberDraft, NutrientTargets, TrainerDraft};
use gymsim::roster;
use gymsim::sim::{self, Outcome, TimeUnit, WeightTrend};
use gymsim::tui::App;
use gymsim::validate;

#[derive(Parser)]
#[command(name = "gymsim")]
#[command(author, version, about = "Gym roster simulator: trainer assignment and progress projection")]
struct Cli {
    /// SQLite database file
    #[arg(long, global = true, env = DB_ENV, default_value = DEFAULT_DB_PATH)]
    db: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open TUI dashboard
    Tui {
        #[command(flatten)]
        assign: AssignArgs,

        /// Scale weight change by activity level
        #[arg(long)]
        activity_scaling: bool,
    },

    /// Manage trainers
    Trainer {
        #[command(subcommand)]
        action: TrainerCommand,
    },

    /// Manage members
    Member {
        #[command(subcommand)]
        action: MemberCommand,
    },

    /// Manage rooms
    Room {
        #[command(subcommand)]
        action: RoomCommand,
    },

    /// Assign members to trainers
    Assign {
        #[command(flatten)]
        assign: AssignArgs,

        /// Pretend it is this local time ("YYYY-MM-DD HH:MM")
        #[arg(long)]
        at: Option<String>,

        /// Seed for random mode
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Simulate progress for all members (or one)
    Simulate {
        /// Number of days or weeks that pass
        elapsed: String,

        #[arg(short, long, value_enum, default_value_t = TimeUnit::Day)]
        unit: TimeUnit,

        /// Only this member
        #[arg(short, long)]
        member: Option<i64>,

        /// Scale weight change by activity level
        #[arg(long)]
        activity_scaling: bool,
    },

    /// Show progress log for a member
    Progress {
        member_id: i64,

        #[arg(long)]
        json: bool,
    },

    /// Register staff credentials
    Register { username: String, password: String },

    /// Check staff credentials
    Login { username: String, password: String },
}

#[derive(Args)]
struct AssignArgs {
    #[arg(long, value_enum, default_value_t = AssignMode::FirstMatch)]
    mode: AssignMode,

    /// Reconsider members that already have a trainer
    #[arg(long)]
    rescan: bool,

    /// Max members per trainer
    #[arg(long)]
    capacity: Option<usize>,

    /// Do not require the trainer to be working right now
    #[arg(long)]
    ignore_schedule: bool,
}

impl AssignArgs {
    fn options(&self) -> AssignOptions {
        AssignOptions {
            mode: self.mode,
            skip_already_assigned: !self.rescan,
            check_schedule: !self.ignore_schedule,
            capacity: self.capacity,
        }
    }
}

#[derive(Subcommand)]
enum TrainerCommand {
    /// Add a trainer
    Add {
        name: String,

        #[arg(short, long)]
        expertise: String,

        /// Comma-separated weekdays, e.g. "Monday,Wednesday"
        #[arg(short, long)]
        days: String,

        /// Shift start, HH:MM
        #[arg(long)]
        start: Option<String>,

        /// Shift end, HH:MM
        #[arg(long)]
        end: Option<String>,

        #[arg(long)]
        room: Option<i64>,
    },
    /// List trainers
    List {
        #[arg(long)]
        json: bool,
    },
    /// Add a batch of random trainers
    Auto,
}

#[derive(Subcommand)]
enum MemberCommand {
    /// Add a member
    Add {
        name: String,

        /// YYYY-MM-DD
        #[arg(long)]
        birthday: Option<String>,

        /// Height in cm
        #[arg(long)]
        height: Option<String>,

        /// Weight in kg
        #[arg(long)]
        weight: String,

        /// 1-10
        #[arg(long)]
        activity: String,

        /// Preferred expertise
        #[arg(short, long)]
        expertise: String,

        #[arg(short, long)]
        goal: String,

        /// Daily protein target, grams
        #[arg(long, requires_all = ["carb", "fiber"])]
        protein: Option<String>,

        #[arg(long, requires_all = ["protein", "fiber"])]
        carb: Option<String>,

        #[arg(long, requires_all = ["protein", "carb"])]
        fiber: Option<String>,
    },
    /// List members
    List {
        #[arg(long)]
        json: bool,
    },
    /// Add a batch of random members
    Auto,
}

#[derive(Subcommand)]
enum RoomCommand {
    /// Add a room
    Add {
        capacity: String,
        kind: String,
    },
    /// List rooms
    List,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut db = Database::open(&cli.db)?;

    match cli.command {
        Some(Commands::Tui { assign, activity_scaling }) => {
            let mut app = App::new(db, assign.options(), ProjectionOptions { activity_scaling })?;
            app.run()?;
        }

        Some(Commands::Trainer { action }) => trainer_command(&db, action)?,

        Some(Commands::Member { action }) => member_command(&mut db, action)?,

        Some(Commands::Room { action }) => match action {
            RoomCommand::Add { capacity, kind } => {
                let capacity = validate::whole_number("capacity", &capacity)?;
                let kind = validate::required("room type", &kind)?;
                let id = db.add_room(capacity, kind)?;
                println!("Room added (id: {})", id);
            }
            RoomCommand::List => {
                let rooms = db.get_rooms()?;
                if rooms.is_empty() {
                    println!("No rooms found.");
                }
                for r in rooms {
                    println!("{}: {} (capacity {})", r.id, r.kind, r.capacity);
                }
            }
        },

        Some(Commands::Assign { assign, at, seed }) => {
            let now = match at {
                Some(at) => NaiveDateTime::parse_from_str(at.trim(), "%Y-%m-%d %H:%M")
                    .with_context(|| format!("--at {:?}: expected \"YYYY-MM-DD HH:MM\"", at))?,
                None => Local::now().naive_local(),
            };
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };

            let results = sim::run_assignment(&mut db, now, &assign.options(), &mut rng)?;
            if results.is_empty() {
                println!("No unassigned members.");
            }
            for a in &results {
                println!("{}", a.describe());
            }
            let unassigned = results.iter().filter(|a| a.outcome == Outcome::Unassigned).count();
            if unassigned > 0 {
                println!("{} member(s) left without a trainer.", unassigned);
            }
        }

        Some(Commands::Simulate { elapsed, unit, member, activity_scaling }) => {
            let elapsed = validate::elapsed_units(&elapsed)?;
            let options = ProjectionOptions { activity_scaling };
            let projections = sim::run_simulation(&mut db, elapsed, unit, member, &options, Utc::now())?;

            println!("Simulated {} {}:", elapsed, unit.label(elapsed));
            println!("{:-<60}", "");
            for p in &projections {
                println!(
                    "{:4} | {:20} | {:6.1} -> {:6.1} kg ({:+.1}) | BMI {} | {}",
                    p.member_id,
                    p.member_name,
                    p.previous_weight,
                    p.new_weight,
                    p.change(),
                    p.bmi.map(|b| format!("{:.1}", b)).unwrap_or_else(|| "-".to_string()),
                    p.observation.date.format("%Y-%m-%d"),
                );
            }
        }

        Some(Commands::Progress { member_id, json }) => {
            let log = sim::history(&db, member_id)?;
            if json {
                print_json(&log)?;
            } else if log.is_empty() {
                println!("No progress found for this member.");
            } else {
                println!("Progress for member {}:", member_id);
                for o in &log {
                    println!(
                        "Date: {}, Weight: {:.1}, BMI: {}",
                        o.date.format("%Y-%m-%d"),
                        o.weight_kg,
                        o.bmi.map(|b| format!("{:.1}", b)).unwrap_or_else(|| "-".to_string())
                    );
                }
                if let Some(trend) = WeightTrend::fit(&log) {
                    println!("{}", trend.format());
                }
            }
        }

        Some(Commands::Register { username, password }) => {
            let id = auth::register(&db, &username, &password)?;
            println!("Registered {} (id: {})", username.trim(), id);
        }

        Some(Commands::Login { username, password }) => {
            if auth::login(&db, &username, &password)? {
                println!("Welcome, {}!", username.trim());
            } else {
                bail!("invalid username or password");
            }
        }

        None => {
            // Default: show TUI
            let mut app = App::new(db, AssignOptions::default(), ProjectionOptions::default())?;
            app.run()?;
        }
    }

    Ok(())
}

fn trainer_command(db: &Database, action: TrainerCommand) -> Result<()> {
    match action {
        TrainerCommand::Add { name, expertise, days, start, end, room } => {
            let draft = TrainerDraft {
                name: validate::required("trainer name", &name)?.to_string(),
                expertise: validate::required("expertise", &expertise)?.parse()?,
                available_days: validate::weekdays(&days)?,
                shift: validate::shift_window(start.as_deref(), end.as_deref())?,
                room_id: room,
            };
            let id = db.add_trainer(&draft)?;
            println!("Trainer added successfully! (id: {})", id);
        }

        TrainerCommand::List { json } => {
            let trainers = db.get_trainers()?;
            if json {
                return print_json(&trainers);
            }
            if trainers.is_empty() {
                println!("No trainers found.");
            }
            for t in trainers {
                let days: Vec<_> = t.available_days.iter().map(|d| weekday_name(*d)).collect();
                let shift = t
                    .shift
                    .map(|s| format!("{}-{}", s.start.format("%H:%M"), s.end.format("%H:%M")))
                    .unwrap_or_else(|| "any time".to_string());
                println!(
                    "{}: {}, Expertise: {}, Days: {}, Hours: {}",
                    t.id,
                    t.name,
                    t.expertise,
                    days.join(","),
                    shift
                );
            }
        }

        TrainerCommand::Auto => {
            let ids = roster::add_random_trainers(db, &mut rand::thread_rng())?;
            println!("Auto-added {} trainers successfully!", ids.len());
        }
    }
    Ok(())
}

fn member_command(db: &mut Database, action: MemberCommand) -> Result<()> {
    match action {
        MemberCommand::Add {
            name,
            birthday,
            height,
            weight,
            activity,
            expertise,
            goal,
            protein,
            carb,
            fiber,
        } => {
            let preference: Expertise = validate::required("expertise", &expertise)?.parse()?;
            let birthday = birthday
                .map(|b| {
                    NaiveDate::parse_from_str(b.trim(), "%Y-%m-%d")
                        .with_context(|| format!("birthday {:?}: expected YYYY-MM-DD", b))
                })
                .transpose()?;
            let height_cm = height
                .map(|h| validate::number_in("height", &h, 50.0, 260.0))
                .transpose()?;
            let nutrients = match (protein, carb, fiber) {
                (Some(p), Some(c), Some(f)) => Some(NutrientTargets {
                    protein_g: validate::number("protein", &p)?,
                    carb_g: validate::number("carb", &c)?,
                    fiber_g: validate::number("fiber", &f)?,
                }),
                _ => None,
            };

            let draft = MemberDraft {
                name: validate::required("member name", &name)?.to_string(),
                birthday,
                height_cm,
                weight_kg: validate::number_in("weight", &weight, 1.0, 500.0)?,
                activity_level: validate::activity_level(&activity)?,
                preference,
                goal: validate::goal_for(preference, &goal)?,
                nutrients,
            };
            let id = db.add_member(&draft)?;
            println!("Member added successfully! (id: {})", id);
        }

        MemberCommand::List { json } => {
            let members = db.get_members()?;
            if json {
                return print_json(&members);
            }
            if members.is_empty() {
                println!("No members found.");
            }
            let today = Local::now().date_naive();
            for m in members {
                println!(
                    "{}: {}, Age: {}, Goal: {} ({}), Weight: {:.1}, Trainer ID: {}",
                    m.id,
                    m.name,
                    m.age_on(today).map(|a| a.to_string()).unwrap_or_else(|| "-".to_string()),
                    m.goal,
                    m.preference,
                    m.weight_kg,
                    m.trainer_id.map(|t| t.to_string()).unwrap_or_else(|| "-".to_string())
                );
            }
        }

        MemberCommand::Auto => {
            let today = Local::now().date_naive();
            let ids = roster::add_random_members(db, &mut rand::thread_rng(), today)?;
            println!("Auto-added {} members successfully!", ids.len());
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
