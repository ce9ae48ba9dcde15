//! Database module - SQLite storage for the gym roster and progress log

mod models;

pub use models::*;

use std::error::Error as StdError;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, params, types::Type};

use crate::catalog::weekday_name;
use crate::error::GymError;
use crate::validate;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS rooms (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    capacity INTEGER NOT NULL,
    kind TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS trainers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    expertise TEXT NOT NULL,
    available_days TEXT NOT NULL,
    shift_start TEXT,
    shift_end TEXT,
    room_id INTEGER REFERENCES rooms(id)
);

CREATE TABLE IF NOT EXISTS members (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    birthday TEXT,
    preference TEXT NOT NULL,
    goal TEXT NOT NULL,
    trainer_id INTEGER REFERENCES trainers(id)
);

CREATE TABLE IF NOT EXISTS member_metrics (
    member_id INTEGER PRIMARY KEY REFERENCES members(id),
    height_cm REAL,
    weight_kg REAL NOT NULL,
    activity_level INTEGER NOT NULL CHECK (activity_level BETWEEN 1 AND 10),
    protein_g REAL,
    carb_g REAL,
    fiber_g REAL
);

CREATE TABLE IF NOT EXISTS progress (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    member_id INTEGER NOT NULL REFERENCES members(id),
    date TEXT NOT NULL,
    weight_kg REAL NOT NULL,
    bmi REAL
);

CREATE TABLE IF NOT EXISTS credentials (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL
);
";

const MEMBER_COLUMNS: &str = "m.id, m.name, m.birthday, mm.height_cm, mm.weight_kg, mm.activity_level,
     m.preference, m.goal, mm.protein_g, mm.carb_g, mm.fiber_g, m.trainer_id
     FROM members m JOIN member_metrics mm ON mm.member_id = m.id";

/// Database wrapper, the session handed to every operation
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path).with_context(|| format!("opening {}", path))?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Fresh in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let db = Self {
            conn: Connection::open_in_memory()?,
        };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    // --- rooms ---

    pub fn add_room(&self, capacity: u32, kind: &str) -> Result<RoomId> {
        self.conn.execute(
            "INSERT INTO rooms (capacity, kind) VALUES (?1, ?2)",
            params![capacity, kind],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_rooms(&self) -> Result<Vec<Room>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, capacity, kind FROM rooms ORDER BY id")?;
        let rooms = stmt
            .query_map([], |row| {
                Ok(Room {
                    id: row.get(0)?,
                    capacity: row.get(1)?,
                    kind: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rooms)
    }

    // --- trainers ---

    pub fn add_trainer(&self, trainer: &TrainerDraft) -> Result<TrainerId> {
        let days: Vec<&str> = trainer
            .available_days
            .iter()
            .map(|d| weekday_name(*d))
            .collect();
        self.conn.execute(
            "INSERT INTO trainers (name, expertise, available_days, shift_start, shift_end, room_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                trainer.name,
                trainer.expertise.label(),
                days.join(","),
                trainer.shift.map(|s| s.start.format("%H:%M").to_string()),
                trainer.shift.map(|s| s.end.format("%H:%M").to_string()),
                trainer.room_id,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// All trainers in registration order
    pub fn get_trainers(&self) -> Result<Vec<Trainer>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, expertise, available_days, shift_start, shift_end, room_id
             FROM trainers ORDER BY id",
        )?;
        let trainers = stmt
            .query_map([], trainer_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(trainers)
    }

    // --- members ---

    /// Insert member and metrics rows atomically
    pub fn add_member(&mut self, member: &MemberDraft) -> Result<MemberId> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO members (name, birthday, preference, goal) VALUES (?1, ?2, ?3, ?4)",
            params![
                member.name,
                member.birthday.map(|b| b.format("%Y-%m-%d").to_string()),
                member.preference.label(),
                member.goal.label(),
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.execute(
            "INSERT INTO member_metrics
             (member_id, height_cm, weight_kg, activity_level, protein_g, carb_g, fiber_g)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                id,
                member.height_cm,
                member.weight_kg,
                member.activity_level,
                member.nutrients.map(|n| n.protein_g),
                member.nutrients.map(|n| n.carb_g),
                member.nutrients.map(|n| n.fiber_g),
            ],
        )?;
        tx.commit()?;
        Ok(id)
    }

    /// All members in registration order
    pub fn get_members(&self) -> Result<Vec<Member>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} ORDER BY m.id", MEMBER_COLUMNS))?;
        let members = stmt
            .query_map([], member_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(members)
    }

    pub fn get_member(&self, id: MemberId) -> Result<Option<Member>> {
        let member = self
            .conn
            .query_row(
                &format!("SELECT {} WHERE m.id = ?1", MEMBER_COLUMNS),
                params![id],
                member_from_row,
            )
            .optional()?;
        Ok(member)
    }

    /// Write matcher outcomes in one transaction
    pub fn set_trainers(&mut self, links: &[(MemberId, Option<TrainerId>)]) -> Result<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare("UPDATE members SET trainer_id = ?1 WHERE id = ?2")?;
            for (member_id, trainer_id) in links {
                stmt.execute(params![trainer_id, member_id])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    // --- progress ---

    /// Append observations and overwrite current weights in one transaction
    pub fn record_progress(&mut self, observations: &[Observation]) -> Result<Vec<i64>> {
        let tx = self.conn.transaction()?;
        let mut ids = Vec::with_capacity(observations.len());
        {
            let mut insert = tx.prepare(
                "INSERT INTO progress (member_id, date, weight_kg, bmi) VALUES (?1, ?2, ?3, ?4)",
            )?;
            let mut update =
                tx.prepare("UPDATE member_metrics SET weight_kg = ?1 WHERE member_id = ?2")?;
            for obs in observations {
                insert.execute(params![
                    obs.member_id,
                    obs.date.to_rfc3339_opts(SecondsFormat::Micros, true),
                    obs.weight_kg,
                    obs.bmi,
                ])?;
                ids.push(tx.last_insert_rowid());
                let changed = update.execute(params![obs.weight_kg, obs.member_id])?;
                if changed == 0 {
                    return Err(GymError::NotFound {
                        entity: "member",
                        id: obs.member_id,
                    }
                    .into());
                }
            }
        }
        tx.commit()?;
        Ok(ids)
    }

    /// Progress log for a member, oldest first
    pub fn get_progress(&self, member_id: MemberId) -> Result<Vec<Observation>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, member_id, date, weight_kg, bmi FROM progress
             WHERE member_id = ?1 ORDER BY date ASC, id ASC",
        )?;
        let observations = stmt
            .query_map(params![member_id], observation_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(observations)
    }

    pub fn last_observation(&self, member_id: MemberId) -> Result<Option<Observation>> {
        let obs = self
            .conn
            .query_row(
                "SELECT id, member_id, date, weight_kg, bmi FROM progress
                 WHERE member_id = ?1 ORDER BY date DESC, id DESC LIMIT 1",
                params![member_id],
                observation_from_row,
            )
            .optional()?;
        Ok(obs)
    }

    // --- credentials ---

    /// Insert a credential; a taken username is reported, not retried
    pub fn add_credential(&self, username: &str, password_hash: &str) -> Result<i64> {
        let result = self.conn.execute(
            "INSERT INTO credentials (username, password_hash) VALUES (?1, ?2)",
            params![username, password_hash],
        );
        match result {
            Ok(_) => Ok(self.conn.last_insert_rowid()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(GymError::UsernameTaken(username.to_string()).into())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn get_password_hash(&self, username: &str) -> Result<Option<String>> {
        let hash = self
            .conn
            .query_row(
                "SELECT password_hash FROM credentials WHERE username = ?1",
                params![username],
                |row| row.get(0),
            )
            .optional()?;
        Ok(hash)
    }
}

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: StdError + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

/// Read a text column and parse it
fn parse_col<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: StdError + Send + Sync + 'static,
{
    let text: String = row.get(idx)?;
    text.parse().map_err(|e| conversion_error(idx, e))
}

fn parse_opt_col<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<T>>
where
    T: FromStr,
    T::Err: StdError + Send + Sync + 'static,
{
    let text: Option<String> = row.get(idx)?;
    text.map(|t| t.parse().map_err(|e| conversion_error(idx, e)))
        .transpose()
}

fn trainer_from_row(row: &Row<'_>) -> rusqlite::Result<Trainer> {
    let days: String = row.get(3)?;
    let available_days = validate::weekdays(&days).map_err(|e| conversion_error(3, e))?;

    let start = parse_time_col(row, 4)?;
    let end = parse_time_col(row, 5)?;
    let shift = match (start, end) {
        (Some(start), Some(end)) => {
            Some(ShiftWindow::new(start, end).map_err(|e| conversion_error(4, e))?)
        }
        _ => None,
    };

    Ok(Trainer {
        id: row.get(0)?,
        name: row.get(1)?,
        expertise: parse_col(row, 2)?,
        available_days,
        shift,
        room_id: row.get(6)?,
    })
}

fn parse_time_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveTime>> {
    let text: Option<String> = row.get(idx)?;
    text.map(|t| validate::time_of_day(&t).map_err(|e| conversion_error(idx, e)))
        .transpose()
}

fn member_from_row(row: &Row<'_>) -> rusqlite::Result<Member> {
    let protein: Option<f64> = row.get(8)?;
    let carb: Option<f64> = row.get(9)?;
    let fiber: Option<f64> = row.get(10)?;
    let nutrients = match (protein, carb, fiber) {
        (Some(protein_g), Some(carb_g), Some(fiber_g)) => Some(NutrientTargets {
            protein_g,
            carb_g,
            fiber_g,
        }),
        _ => None,
    };

    Ok(Member {
        id: row.get(0)?,
        name: row.get(1)?,
        birthday: parse_opt_col::<NaiveDate>(row, 2)?,
        height_cm: row.get(3)?,
        weight_kg: row.get(4)?,
        activity_level: row.get(5)?,
        preference: parse_col(row, 6)?,
        goal: parse_col(row, 7)?,
        nutrients,
        trainer_id: row.get(11)?,
    })
}

fn observation_from_row(row: &Row<'_>) -> rusqlite::Result<Observation> {
    let date_str: String = row.get(2)?;
    let date = DateTime::parse_from_rfc3339(&date_str)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| conversion_error(2, e))?;
    Ok(Observation {
        id: Some(row.get(0)?),
        member_id: row.get(1)?,
        date,
        weight_kg: row.get(3)?,
        bmi: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Expertise, Goal};
    use chrono::{Duration, TimeZone, Weekday};

    fn draft_member(name: &str) -> MemberDraft {
        MemberDraft {
            name: name.to_string(),
            birthday: NaiveDate::from_ymd_opt(1990, 5, 1),
            height_cm: Some(175.0),
            weight_kg: 70.0,
            activity_level: 5,
            preference: Expertise::Fitness,
            goal: Goal::WeightLoss,
            nutrients: None,
        }
    }

    fn draft_trainer(name: &str) -> TrainerDraft {
        TrainerDraft {
            name: name.to_string(),
            expertise: Expertise::Fitness,
            available_days: vec![Weekday::Mon, Weekday::Thu],
            shift: validate::shift_window(Some("08:00"), Some("16:30")).unwrap(),
            room_id: None,
        }
    }

    #[test]
    fn test_trainer_roundtrip() {
        let db = Database::open_in_memory().unwrap();
        let room = db.add_room(20, "studio").unwrap();
        let mut draft = draft_trainer("John Doe");
        draft.room_id = Some(room);
        let id = db.add_trainer(&draft).unwrap();

        let trainers = db.get_trainers().unwrap();
        assert_eq!(trainers.len(), 1);
        let t = &trainers[0];
        assert_eq!(t.id, id);
        assert_eq!(t.expertise, Expertise::Fitness);
        assert_eq!(t.available_days, vec![Weekday::Mon, Weekday::Thu]);
        assert_eq!(t.shift, draft.shift);
        assert_eq!(t.room_id, Some(room));
    }

    #[test]
    fn test_trainers_in_registration_order() {
        let db = Database::open_in_memory().unwrap();
        db.add_trainer(&draft_trainer("B")).unwrap();
        db.add_trainer(&draft_trainer("A")).unwrap();
        let names: Vec<_> = db.get_trainers().unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn test_member_roundtrip() {
        let mut db = Database::open_in_memory().unwrap();
        let mut draft = draft_member("Alice Johnson");
        draft.nutrients = Some(NutrientTargets {
            protein_g: 110.0,
            carb_g: 250.0,
            fiber_g: 30.0,
        });
        let id = db.add_member(&draft).unwrap();

        let m = db.get_member(id).unwrap().unwrap();
        assert_eq!(m.name, "Alice Johnson");
        assert_eq!(m.goal, Goal::WeightLoss);
        assert_eq!(m.height_cm, Some(175.0));
        assert_eq!(m.nutrients, draft.nutrients);
        assert_eq!(m.trainer_id, None);
        assert!(db.get_member(id + 1).unwrap().is_none());
    }

    #[test]
    fn test_failed_member_insert_rolls_back() {
        let mut db = Database::open_in_memory().unwrap();
        let mut draft = draft_member("Bob Davis");
        draft.activity_level = 42; // violates the metrics CHECK

        assert!(db.add_member(&draft).is_err());

        let orphans: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM members", [], |row| row.get(0))
            .unwrap();
        assert_eq!(orphans, 0);
        assert!(db.get_members().unwrap().is_empty());
    }

    #[test]
    fn test_set_trainers() {
        let mut db = Database::open_in_memory().unwrap();
        let trainer = db.add_trainer(&draft_trainer("John Doe")).unwrap();
        let a = db.add_member(&draft_member("A")).unwrap();
        let b = db.add_member(&draft_member("B")).unwrap();

        db.set_trainers(&[(a, Some(trainer)), (b, None)]).unwrap();

        assert_eq!(db.get_member(a).unwrap().unwrap().trainer_id, Some(trainer));
        assert_eq!(db.get_member(b).unwrap().unwrap().trainer_id, None);
    }

    #[test]
    fn test_set_trainers_unknown_trainer_rolls_back() {
        let mut db = Database::open_in_memory().unwrap();
        let trainer = db.add_trainer(&draft_trainer("John Doe")).unwrap();
        let a = db.add_member(&draft_member("A")).unwrap();
        let b = db.add_member(&draft_member("B")).unwrap();

        let result = db.set_trainers(&[(a, Some(trainer)), (b, Some(trainer + 100))]);
        assert!(result.is_err());
        assert_eq!(db.get_member(a).unwrap().unwrap().trainer_id, None);
    }

    #[test]
    fn test_progress_log_ordered_and_weight_overwritten() {
        let mut db = Database::open_in_memory().unwrap();
        let id = db.add_member(&draft_member("Cathy White")).unwrap();
        let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();

        let later = Observation {
            id: None,
            member_id: id,
            date: t0 + Duration::days(7),
            weight_kg: 68.0,
            bmi: None,
        };
        let earlier = Observation {
            date: t0,
            weight_kg: 69.0,
            ..later.clone()
        };
        db.record_progress(&[later]).unwrap();
        db.record_progress(&[earlier]).unwrap();

        let log = db.get_progress(id).unwrap();
        assert_eq!(log.len(), 2);
        assert!(log[0].date <= log[1].date);
        assert_eq!(log[0].weight_kg, 69.0);

        let last = db.last_observation(id).unwrap().unwrap();
        assert_eq!(last.date, t0 + Duration::days(7));

        // stored weight is whatever was written last
        assert_eq!(db.get_member(id).unwrap().unwrap().weight_kg, 69.0);
    }

    #[test]
    fn test_record_progress_unknown_member_rolls_back() {
        let mut db = Database::open_in_memory().unwrap();
        let id = db.add_member(&draft_member("Daniel Black")).unwrap();
        let obs = Observation {
            id: None,
            member_id: id,
            date: Utc::now(),
            weight_kg: 71.0,
            bmi: None,
        };
        let ghost = Observation {
            member_id: id + 99,
            ..obs.clone()
        };

        assert!(db.record_progress(&[obs, ghost]).is_err());
        assert!(db.get_progress(id).unwrap().is_empty());
        assert_eq!(db.get_member(id).unwrap().unwrap().weight_kg, 70.0);
    }

    #[test]
    fn test_empty_progress() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_progress(1).unwrap().is_empty());
        assert!(db.last_observation(1).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_username() {
        let db = Database::open_in_memory().unwrap();
        db.add_credential("coach", "$argon2id$stub").unwrap();
        let err = db.add_credential("coach", "$argon2id$other").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GymError>(),
            Some(GymError::UsernameTaken(name)) if name == "coach"
        ));
        assert_eq!(
            db.get_password_hash("coach").unwrap().as_deref(),
            Some("$argon2id$stub")
        );
    }
}
