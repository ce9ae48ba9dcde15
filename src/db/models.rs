//! Row types shared by the store, the simulation and the UI

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::catalog::{Expertise, Goal};
use crate::error::ValidationError;

pub type RoomId = i64;
pub type TrainerId = i64;
pub type MemberId = i64;

/// Daily working hours, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl ShiftWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, ValidationError> {
        if start >= end {
            return Err(ValidationError::Window {
                start: start.format("%H:%M").to_string(),
                end: end.format("%H:%M").to_string(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, time: NaiveTime) -> bool {
        self.start <= time && time <= self.end
    }
}

/// Gym room
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub capacity: u32,
    pub kind: String,
}

/// Trainer as stored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trainer {
    pub id: TrainerId,
    pub name: String,
    pub expertise: Expertise,
    pub available_days: Vec<Weekday>,
    pub shift: Option<ShiftWindow>,
    pub room_id: Option<RoomId>,
}

impl Trainer {
    /// Works on that weekday and, if a shift is set, is inside it
    pub fn is_available(&self, at: NaiveDateTime) -> bool {
        if !self.available_days.contains(&at.weekday()) {
            return false;
        }
        match &self.shift {
            Some(shift) => shift.contains(at.time()),
            None => true,
        }
    }
}

/// Trainer form input, validated
#[derive(Debug, Clone)]
pub struct TrainerDraft {
    pub name: String,
    pub expertise: Expertise,
    pub available_days: Vec<Weekday>,
    pub shift: Option<ShiftWindow>,
    pub room_id: Option<RoomId>,
}

/// Daily nutrient targets in grams
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutrientTargets {
    pub protein_g: f64,
    pub carb_g: f64,
    pub fiber_g: f64,
}

/// Member (student) with current body metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    pub birthday: Option<NaiveDate>,
    pub height_cm: Option<f64>,
    pub weight_kg: f64,
    pub activity_level: u8,
    pub preference: Expertise,
    pub goal: Goal,
    pub nutrients: Option<NutrientTargets>,
    pub trainer_id: Option<TrainerId>,
}

impl Member {
    pub fn bmi(&self) -> Option<f64> {
        crate::sim::projector::bmi(self.weight_kg, self.height_cm)
    }

    /// Full years on the given day
    pub fn age_on(&self, day: NaiveDate) -> Option<u32> {
        self.birthday.and_then(|b| day.years_since(b))
    }
}

/// Member form input, validated
#[derive(Debug, Clone)]
pub struct MemberDraft {
    pub name: String,
    pub birthday: Option<NaiveDate>,
    pub height_cm: Option<f64>,
    pub weight_kg: f64,
    pub activity_level: u8,
    pub preference: Expertise,
    pub goal: Goal,
    pub nutrients: Option<NutrientTargets>,
}

/// One logged progress point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub id: Option<i64>,
    pub member_id: MemberId,
    pub date: DateTime<Utc>,
    pub weight_kg: f64,
    pub bmi: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(date: &str, time: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{} {}", date, time), "%Y-%m-%d %H:%M").unwrap()
    }

    fn time(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%H:%M").unwrap()
    }

    fn trainer(days: Vec<Weekday>, shift: Option<ShiftWindow>) -> Trainer {
        Trainer {
            id: 1,
            name: "Jane Smith".to_string(),
            expertise: Expertise::Yoga,
            available_days: days,
            shift,
            room_id: None,
        }
    }

    #[test]
    fn test_shift_window_rejects_inverted() {
        assert!(ShiftWindow::new(time("17:00"), time("09:00")).is_err());
        assert!(ShiftWindow::new(time("09:00"), time("09:00")).is_err());
    }

    #[test]
    fn test_shift_window_inclusive() {
        let shift = ShiftWindow::new(time("09:00"), time("17:00")).unwrap();
        assert!(shift.contains(time("09:00")));
        assert!(shift.contains(time("17:00")));
        assert!(!shift.contains(time("08:59")));
        assert!(!shift.contains(time("17:01")));
    }

    #[test]
    fn test_trainer_availability() {
        let shift = ShiftWindow::new(time("09:00"), time("17:00")).unwrap();
        let t = trainer(vec![Weekday::Mon, Weekday::Wed], Some(shift));

        // 2026-10-12 is a Monday
        assert!(t.is_available(at("2026-10-12", "10:00")));
        assert!(!t.is_available(at("2026-10-12", "18:00")));
        assert!(!t.is_available(at("2026-10-13", "10:00")));
    }

    #[test]
    fn test_trainer_without_shift_is_available_all_day() {
        let t = trainer(vec![Weekday::Fri], None);
        // 2026-10-16 is a Friday
        assert!(t.is_available(at("2026-10-16", "03:00")));
        assert!(t.is_available(at("2026-10-16", "23:59")));
    }

    #[test]
    fn test_member_age() {
        let member = Member {
            id: 1,
            name: "Eva Brown".to_string(),
            birthday: NaiveDate::from_ymd_opt(2000, 10, 17),
            height_cm: Some(170.0),
            weight_kg: 60.0,
            activity_level: 5,
            preference: Expertise::Pilates,
            goal: Goal::CoreStrength,
            nutrients: None,
            trainer_id: None,
        };
        let day = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        assert_eq!(member.age_on(day), Some(25));
    }
}
