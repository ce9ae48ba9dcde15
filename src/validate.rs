//! Form input validation
//!
//! Callers hand in raw strings exactly as typed; everything here trims,
//! checks presence, and converts to typed values. Nothing is defaulted
//! silently.

use chrono::{NaiveTime, Weekday};

use crate::catalog::{Expertise, Goal, WEEKDAYS};
use crate::db::ShiftWindow;
use crate::error::ValidationError;

/// Non-empty, trimmed text field
pub fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(value)
}

/// Non-negative decimal number
pub fn number(field: &'static str, value: &str) -> Result<f64, ValidationError> {
    let value = required(field, value)?;
    let parsed: f64 = value.parse().map_err(|_| ValidationError::NotANumber {
        field,
        value: value.to_string(),
    })?;
    if !parsed.is_finite() {
        return Err(ValidationError::NotANumber {
            field,
            value: value.to_string(),
        });
    }
    if parsed < 0.0 {
        return Err(ValidationError::Negative {
            field,
            value: value.to_string(),
        });
    }
    Ok(parsed)
}

/// Number within an inclusive range
pub fn number_in(
    field: &'static str,
    value: &str,
    min: f64,
    max: f64,
) -> Result<f64, ValidationError> {
    let parsed = number(field, value)?;
    if parsed < min || parsed > max {
        return Err(ValidationError::OutOfRange {
            field,
            min,
            max,
            value: parsed,
        });
    }
    Ok(parsed)
}

/// Non-negative whole number
pub fn whole_number(field: &'static str, value: &str) -> Result<u32, ValidationError> {
    let value = required(field, value)?;
    let parsed: i64 = value.parse().map_err(|_| ValidationError::NotANumber {
        field,
        value: value.to_string(),
    })?;
    if parsed < 0 {
        return Err(ValidationError::Negative {
            field,
            value: value.to_string(),
        });
    }
    u32::try_from(parsed).map_err(|_| ValidationError::OutOfRange {
        field,
        min: 0.0,
        max: u32::MAX as f64,
        value: parsed as f64,
    })
}

/// Number of simulated days/weeks
pub fn elapsed_units(value: &str) -> Result<u32, ValidationError> {
    whole_number("elapsed units", value)
}

/// Activity level on the 1-10 scale
pub fn activity_level(value: &str) -> Result<u8, ValidationError> {
    const FIELD: &str = "activity level";
    let value = required(FIELD, value)?;
    let parsed: i64 = value.parse().map_err(|_| ValidationError::NotANumber {
        field: FIELD,
        value: value.to_string(),
    })?;
    if !(1..=10).contains(&parsed) {
        return Err(ValidationError::OutOfRange {
            field: FIELD,
            min: 1.0,
            max: 10.0,
            value: parsed as f64,
        });
    }
    Ok(parsed as u8)
}

/// Comma-separated weekday names, returned Monday-first without duplicates
pub fn weekdays(value: &str) -> Result<Vec<Weekday>, ValidationError> {
    let value = required("available days", value)?;
    let mut picked = Vec::new();
    for part in value.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let day: Weekday = part
            .parse()
            .map_err(|_| ValidationError::Weekday(part.to_string()))?;
        picked.push(day);
    }
    if picked.is_empty() {
        return Err(ValidationError::Empty {
            field: "available days",
        });
    }
    Ok(WEEKDAYS
        .iter()
        .copied()
        .filter(|d| picked.contains(d))
        .collect())
}

/// "HH:MM" wall-clock time
pub fn time_of_day(value: &str) -> Result<NaiveTime, ValidationError> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|_| ValidationError::Time(value.to_string()))
}

/// Optional shift: both ends or neither
pub fn shift_window(
    start: Option<&str>,
    end: Option<&str>,
) -> Result<Option<ShiftWindow>, ValidationError> {
    match (start, end) {
        (None, None) => Ok(None),
        (Some(_), None) => Err(ValidationError::Empty { field: "shift end" }),
        (None, Some(_)) => Err(ValidationError::Empty {
            field: "shift start",
        }),
        (Some(start), Some(end)) => {
            ShiftWindow::new(time_of_day(start)?, time_of_day(end)?).map(Some)
        }
    }
}

/// Member's goal must be one the chosen expertise offers
pub fn goal_for(expertise: Expertise, goal: &str) -> Result<Goal, ValidationError> {
    let goal: Goal = required("goal", goal)?.parse()?;
    if !expertise.covers(goal) {
        return Err(ValidationError::GoalMismatch {
            goal: goal.to_string(),
            expertise: expertise.to_string(),
        });
    }
    Ok(goal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims() {
        assert_eq!(required("name", "  Ann ").unwrap(), "Ann");
        assert_eq!(
            required("name", "   "),
            Err(ValidationError::Empty { field: "name" })
        );
    }

    #[test]
    fn test_elapsed_units_valid() {
        assert_eq!(elapsed_units("0").unwrap(), 0);
        assert_eq!(elapsed_units(" 14 ").unwrap(), 14);
    }

    #[test]
    fn test_elapsed_units_rejects_garbage() {
        assert!(matches!(
            elapsed_units("ten"),
            Err(ValidationError::NotANumber { .. })
        ));
        assert!(matches!(
            elapsed_units("2.5"),
            Err(ValidationError::NotANumber { .. })
        ));
        assert!(matches!(
            elapsed_units(""),
            Err(ValidationError::Empty { .. })
        ));
    }

    #[test]
    fn test_elapsed_units_rejects_negative() {
        assert!(matches!(
            elapsed_units("-3"),
            Err(ValidationError::Negative { .. })
        ));
    }

    #[test]
    fn test_number_checks() {
        assert_eq!(number("weight", "72.5").unwrap(), 72.5);
        assert!(matches!(
            number("weight", "-1"),
            Err(ValidationError::Negative { .. })
        ));
        assert!(matches!(
            number("weight", "NaN"),
            Err(ValidationError::NotANumber { .. })
        ));
        assert!(matches!(
            number_in("height", "400", 50.0, 260.0),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_activity_level_range() {
        assert_eq!(activity_level("7").unwrap(), 7);
        assert!(activity_level("0").is_err());
        assert!(activity_level("11").is_err());
    }

    #[test]
    fn test_weekdays_ordered_and_deduped() {
        let days = weekdays("Friday, monday,Mon").unwrap();
        assert_eq!(days, vec![Weekday::Mon, Weekday::Fri]);
    }

    #[test]
    fn test_weekdays_unknown() {
        assert_eq!(
            weekdays("Monday,Funday"),
            Err(ValidationError::Weekday("Funday".to_string()))
        );
        assert!(weekdays(" , ").is_err());
    }

    #[test]
    fn test_time_of_day_is_a_time_not_a_string() {
        let nine = time_of_day("9:00").unwrap();
        let ten = time_of_day("10:00").unwrap();
        // "9:00" > "10:00" lexically, but not as times
        assert!(nine < ten);
        assert!(time_of_day("25:00").is_err());
    }

    #[test]
    fn test_shift_window_pairs() {
        assert_eq!(shift_window(None, None).unwrap(), None);
        assert!(shift_window(Some("09:00"), None).is_err());
        assert!(shift_window(Some("17:00"), Some("09:00")).is_err());
        let window = shift_window(Some("09:00"), Some("17:00")).unwrap().unwrap();
        assert_eq!(window.start, time_of_day("09:00").unwrap());
    }

    #[test]
    fn test_goal_for_expertise() {
        assert_eq!(
            goal_for(Expertise::Fitness, "Weight Loss").unwrap(),
            Goal::WeightLoss
        );
        assert!(matches!(
            goal_for(Expertise::Yoga, "Weight Loss"),
            Err(ValidationError::GoalMismatch { .. })
        ));
    }
}
