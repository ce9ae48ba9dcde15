//! Error taxonomy
//!
//! Validation failures abort an operation before anything is written.
//! "No qualifying trainer" and "no progress yet" are outcomes, not errors,
//! so they have no variant here.

use thiserror::Error;

/// Form input rejected before reaching the store
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Empty { field: &'static str },

    #[error("{field} must be a number, got {value:?}")]
    NotANumber { field: &'static str, value: String },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: String },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("unknown weekday {0:?}")]
    Weekday(String),

    #[error("invalid time {0:?}, expected HH:MM")]
    Time(String),

    #[error("shift must start before it ends ({start} >= {end})")]
    Window { start: String, end: String },

    #[error("unknown expertise {0:?}")]
    Expertise(String),

    #[error("unknown goal {0:?}")]
    Goal(String),

    #[error("goal {goal} is not offered under {expertise}")]
    GoalMismatch { goal: String, expertise: String },

    #[error("{elapsed} {unit} after {from} is past 9999-12-31")]
    PastLastDate {
        elapsed: u32,
        unit: &'static str,
        from: String,
    },

    #[error("password must be at least {0} characters long")]
    PasswordTooShort(usize),
}

/// Domain errors surfaced to the user
#[derive(Debug, Error)]
pub enum GymError {
    #[error("username {0:?} is already registered")]
    UsernameTaken(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
}
