//! Catalogue - expertise areas, goals and the name pools used by auto-add

use std::fmt;
use std::str::FromStr;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// What a trainer is qualified in and what a member asks for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Expertise {
    Fitness,
    Yoga,
    Hiit,
    Weightlifting,
    Pilates,
}

impl Expertise {
    pub fn all() -> &'static [Expertise] {
        &[
            Expertise::Fitness,
            Expertise::Yoga,
            Expertise::Hiit,
            Expertise::Weightlifting,
            Expertise::Pilates,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Expertise::Fitness => "Fitness",
            Expertise::Yoga => "Yoga",
            Expertise::Hiit => "HIIT",
            Expertise::Weightlifting => "Weightlifting",
            Expertise::Pilates => "Pilates",
        }
    }

    /// Goals a trainer with this expertise can take on
    pub fn goals(&self) -> &'static [Goal] {
        match self {
            Expertise::Fitness => &[Goal::WeightLoss, Goal::MuscleGain, Goal::GeneralHealth],
            Expertise::Yoga => &[
                Goal::FlexibilityImprovement,
                Goal::StressRelief,
                Goal::Mindfulness,
            ],
            Expertise::Hiit => &[Goal::FatLoss, Goal::Endurance, Goal::Strength],
            Expertise::Weightlifting => &[
                Goal::MuscleGain,
                Goal::StrengthBuilding,
                Goal::Powerlifting,
            ],
            Expertise::Pilates => &[Goal::CoreStrength, Goal::Flexibility, Goal::Rehabilitation],
        }
    }

    pub fn covers(&self, goal: Goal) -> bool {
        self.goals().contains(&goal)
    }
}

impl fmt::Display for Expertise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Expertise {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Expertise::all()
            .iter()
            .find(|e| e.label().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| ValidationError::Expertise(s.to_string()))
    }
}

/// Outcome a member is training towards
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Goal {
    WeightLoss,
    MuscleGain,
    GeneralHealth,
    FlexibilityImprovement,
    StressRelief,
    Mindfulness,
    FatLoss,
    Endurance,
    Strength,
    StrengthBuilding,
    Powerlifting,
    CoreStrength,
    Flexibility,
    Rehabilitation,
}

impl Goal {
    pub fn all() -> &'static [Goal] {
        &[
            Goal::WeightLoss,
            Goal::MuscleGain,
            Goal::GeneralHealth,
            Goal::FlexibilityImprovement,
            Goal::StressRelief,
            Goal::Mindfulness,
            Goal::FatLoss,
            Goal::Endurance,
            Goal::Strength,
            Goal::StrengthBuilding,
            Goal::Powerlifting,
            Goal::CoreStrength,
            Goal::Flexibility,
            Goal::Rehabilitation,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Goal::WeightLoss => "Weight Loss",
            Goal::MuscleGain => "Muscle Gain",
            Goal::GeneralHealth => "General Health",
            Goal::FlexibilityImprovement => "Flexibility Improvement",
            Goal::StressRelief => "Stress Relief",
            Goal::Mindfulness => "Mindfulness",
            Goal::FatLoss => "Fat Loss",
            Goal::Endurance => "Endurance",
            Goal::Strength => "Strength",
            Goal::StrengthBuilding => "Strength Building",
            Goal::Powerlifting => "Powerlifting",
            Goal::CoreStrength => "Core Strength",
            Goal::Flexibility => "Flexibility",
            Goal::Rehabilitation => "Rehabilitation",
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Goal {
    type Err = ValidationError;

    /// Accepts the display label ("Weight Loss") or a slug ("weight-loss")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace(['-', '_'], " ");
        Goal::all()
            .iter()
            .find(|g| g.label().eq_ignore_ascii_case(&wanted))
            .copied()
            .ok_or_else(|| ValidationError::Goal(s.trim().to_string()))
    }
}

pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Names used by "auto add trainers"
pub const TRAINER_NAMES: &[&str] = &[
    "John Doe",
    "Jane Smith",
    "Jim Brown",
    "Jake White",
    "Lisa Green",
    "Tom Black",
];

/// Names used by "auto add members"
pub const MEMBER_NAMES: &[&str] = &[
    "Alice Johnson",
    "Bob Davis",
    "Cathy White",
    "Daniel Black",
    "Eva Brown",
];
