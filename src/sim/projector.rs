//! Progress projection: linear weight change over simulated time
//!
//! Simulated time accumulates from the member's last observation, not from
//! the wall clock, so repeated runs walk forward through the calendar.

use chrono::{DateTime, Datelike, Duration, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::catalog::Goal;
use crate::config::ProjectionOptions;
use crate::db::{Member, MemberId, Observation};
use crate::error::ValidationError;

/// Rate used for any goal without its own entry
pub const GENERAL_HEALTH_RATE: f64 = 0.002;

/// Dates after this year no longer format as four-digit RFC3339 text
pub const LAST_STORABLE_YEAR: i32 = 9999;

/// Activity level at which the scaling factor is neutral
const NEUTRAL_ACTIVITY: f64 = 5.0;
const ACTIVITY_STEP: f64 = 0.1;

/// Size of one elapsed unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
pub enum TimeUnit {
    #[default]
    #[value(alias = "days", alias = "d")]
    Day,
    #[value(alias = "weeks", alias = "w")]
    Week,
}

impl TimeUnit {
    /// `None` when the span does not fit in a `Duration`
    pub fn span(&self, units: u32) -> Option<Duration> {
        match self {
            TimeUnit::Day => Duration::try_days(units as i64),
            TimeUnit::Week => Duration::try_weeks(units as i64),
        }
    }

    pub fn label(&self, units: u32) -> &'static str {
        match (self, units) {
            (TimeUnit::Day, 1) => "day",
            (TimeUnit::Day, _) => "days",
            (TimeUnit::Week, 1) => "week",
            (TimeUnit::Week, _) => "weeks",
        }
    }
}

/// Signed fraction of body weight gained per elapsed unit
pub fn rate_for(goal: Goal) -> f64 {
    match goal {
        Goal::WeightLoss => -0.01,
        Goal::FatLoss => -0.008,
        Goal::Endurance => -0.003,
        Goal::MuscleGain => 0.005,
        Goal::StrengthBuilding | Goal::Powerlifting => 0.004,
        Goal::Strength => 0.003,
        _ => GENERAL_HEALTH_RATE,
    }
}

/// 1.0 at level 5, +/-10% per level away from it
pub fn activity_factor(level: u8) -> f64 {
    1.0 + (level as f64 - NEUTRAL_ACTIVITY) * ACTIVITY_STEP
}

/// Body mass index; `None` without a usable height
pub fn bmi(weight_kg: f64, height_cm: Option<f64>) -> Option<f64> {
    let height_m = height_cm.filter(|h| *h > 0.0)? / 100.0;
    Some(weight_kg / (height_m * height_m))
}

/// Result of one projection step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projection {
    pub member_id: MemberId,
    pub member_name: String,
    pub previous_weight: f64,
    pub new_weight: f64,
    pub bmi: Option<f64>,
    pub observation: Observation,
}

impl Projection {
    pub fn change(&self) -> f64 {
        self.new_weight - self.previous_weight
    }
}

/// Project a member's weight forward by `elapsed` units.
///
/// No floor is applied: extreme inputs can drive the weight to zero or below.
/// A date that would land after `LAST_STORABLE_YEAR` is rejected.
pub fn project(
    member: &Member,
    last: Option<&Observation>,
    elapsed: u32,
    unit: TimeUnit,
    options: &ProjectionOptions,
    now: DateTime<Utc>,
) -> Result<Projection, ValidationError> {
    let mut change = member.weight_kg * rate_for(member.goal) * elapsed as f64;
    if options.activity_scaling {
        change *= activity_factor(member.activity_level);
    }
    let new_weight = member.weight_kg + change;
    let bmi = bmi(new_weight, member.height_cm);

    let date = match last {
        Some(prev) => unit
            .span(elapsed)
            .and_then(|span| prev.date.checked_add_signed(span))
            .filter(|date| date.year() <= LAST_STORABLE_YEAR)
            .ok_or_else(|| ValidationError::PastLastDate {
                elapsed,
                unit: unit.label(elapsed),
                from: prev.date.format("%Y-%m-%d").to_string(),
            })?,
        None => now,
    };

    Ok(Projection {
        member_id: member.id,
        member_name: member.name.clone(),
        previous_weight: member.weight_kg,
        new_weight,
        bmi,
        observation: Observation {
            id: None,
            member_id: member.id,
            date,
            weight_kg: new_weight,
            bmi,
        },
    })
}
