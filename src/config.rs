//! Runtime configuration
//!
//! The store path comes from `--db` or `GYMSIM_DB` (a `.env` file is read
//! first). Matcher and projector policies are plain structs so the CLI,
//! the TUI and tests can all pick them explicitly.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub const DB_ENV: &str = "GYMSIM_DB";
pub const DEFAULT_DB_PATH: &str = "gym_simulation.db";

/// How a trainer is picked for a member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
pub enum AssignMode {
    /// First trainer, in registration order, whose expertise and schedule fit
    #[default]
    FirstMatch,
    /// Any trainer at random, ignoring fit
    Random,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignOptions {
    pub mode: AssignMode,
    /// Leave members that already have a trainer alone
    pub skip_already_assigned: bool,
    /// Require the trainer to be working right now
    pub check_schedule: bool,
    /// Max members per trainer; `None` means unbounded
    pub capacity: Option<usize>,
}

impl Default for AssignOptions {
    fn default() -> Self {
        Self {
            mode: AssignMode::FirstMatch,
            skip_already_assigned: true,
            check_schedule: true,
            capacity: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProjectionOptions {
    /// Scale weight change by `1 + (activity - 5) * 0.1`
    pub activity_scaling: bool,
}
