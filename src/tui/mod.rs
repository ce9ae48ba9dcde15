//! TUI module - Terminal dashboard with ratatui

use std::collections::HashMap;

use anyhow::Result;
use chrono::{Local, Utc};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Table, Row, Cell},
};
use std::io::{stdout, Stdout};

use crate::config::{AssignOptions, ProjectionOptions};
use crate::db::{Database, Member, Trainer, TrainerId};
use crate::sim::{self, Outcome, TimeUnit};

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// App state for TUI
pub struct App {
    db: Database,
    members: Vec<Member>,
    trainers: Vec<Trainer>,
    assign_options: AssignOptions,
    projection_options: ProjectionOptions,
    status: String,
    should_quit: bool,
}

impl App {
    pub fn new(
        db: Database,
        assign_options: AssignOptions,
        projection_options: ProjectionOptions,
    ) -> Result<Self> {
        let mut app = Self {
            db,
            members: Vec::new(),
            trainers: Vec::new(),
            assign_options,
            projection_options,
            status: String::from("Ready"),
            should_quit: false,
        };
        app.refresh()?;
        Ok(app)
    }

    fn refresh(&mut self) -> Result<()> {
        self.members = self.db.get_members()?;
        self.trainers = self.db.get_trainers()?;
        Ok(())
    }

    /// Run the TUI application
    pub fn run(&mut self) -> Result<()> {
        let mut terminal = init_terminal()?;

        let result = self.event_loop(&mut terminal);

        restore_terminal()?;
        result
    }

    fn event_loop(&mut self, terminal: &mut Tui) -> Result<()> {
        while !self.should_quit {
            terminal.draw(|frame| self.render(frame))?;
            self.handle_events()?;
        }
        Ok(())
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(3),
            ])
            .split(area);

        // Header
        let header = Paragraph::new(format!(
            "gymsim - {} trainers, {} members",
            self.trainers.len(),
            self.members.len()
        ))
        .style(Style::default().fg(Color::Cyan).bold())
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, chunks[0]);

        // Member table
        let trainer_names: HashMap<TrainerId, &str> = self
            .trainers
            .iter()
            .map(|t| (t.id, t.name.as_str()))
            .collect();

        let rows: Vec<Row> = self.members.iter().map(|m| {
            let trainer = m
                .trainer_id
                .and_then(|id| trainer_names.get(&id).copied())
                .unwrap_or("-");
            Row::new(vec![
                Cell::from(m.id.to_string()),
                Cell::from(m.name.clone()),
                Cell::from(m.goal.label()),
                Cell::from(format!("{:.1}", m.weight_kg)),
                Cell::from(m.bmi().map(|b| format!("{:.1}", b)).unwrap_or_else(|| "-".to_string())),
                Cell::from(trainer.to_string()),
            ])
        }).collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(5),
                Constraint::Length(20),
                Constraint::Length(24),
                Constraint::Length(8),
                Constraint::Length(6),
                Constraint::Min(16),
            ],
        )
        .header(Row::new(vec!["ID", "Name", "Goal", "Weight", "BMI", "Trainer"])
            .style(Style::default().bold()))
        .block(Block::default().borders(Borders::ALL).title("Members"));

        frame.render_widget(table, chunks[1]);

        // Footer
        let footer = Paragraph::new(format!(
            "q: quit | a: assign | d: +1 day | w: +1 week | r: refresh   {}",
            self.status
        ))
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(footer, chunks[2]);
    }

    fn assign(&mut self) -> Result<()> {
        let now = Local::now().naive_local();
        let results = sim::run_assignment(
            &mut self.db,
            now,
            &self.assign_options,
            &mut rand::thread_rng(),
        )?;
        let unassigned = results
            .iter()
            .filter(|a| a.outcome == Outcome::Unassigned)
            .count();
        self.status = if results.is_empty() {
            "No unassigned members.".to_string()
        } else {
            format!(
                "Assigned {}, unassigned {}",
                results.len() - unassigned,
                unassigned
            )
        };
        self.refresh()
    }

    fn simulate(&mut self, unit: TimeUnit) -> Result<()> {
        let projections = sim::run_simulation(
            &mut self.db,
            1,
            unit,
            None,
            &self.projection_options,
            Utc::now(),
        )?;
        self.status = format!(
            "Simulated 1 {} for {} members",
            unit.label(1),
            projections.len()
        );
        self.refresh()
    }

    fn handle_events(&mut self) -> Result<()> {
        if event::poll(std::time::Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press {
                    let result = match key.code {
                        KeyCode::Char('q') => {
                            self.should_quit = true;
                            Ok(())
                        }
                        KeyCode::Char('r') => self.refresh(),
                        KeyCode::Char('a') => self.assign(),
                        KeyCode::Char('d') => self.simulate(TimeUnit::Day),
                        KeyCode::Char('w') => self.simulate(TimeUnit::Week),
                        _ => Ok(()),
                    };
                    // keep the dashboard open; show the failure instead
                    if let Err(e) = result {
                        self.status = format!("Error: {:#}", e);
                    }
                }
        Ok(())
    }
}

fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    Ok(terminal)
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}
