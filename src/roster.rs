//! Roster auto-add - random trainers and members for quick simulations

use anyhow::Result;
use chrono::{Duration, NaiveDate, NaiveTime};
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::info;

use crate::catalog::{Expertise, MEMBER_NAMES, TRAINER_NAMES, WEEKDAYS};
use crate::db::{Database, MemberDraft, MemberId, ShiftWindow, TrainerDraft, TrainerId};

/// One trainer per name in the pool, random expertise, days and shift
pub fn random_trainers<R: Rng + ?Sized>(rng: &mut R) -> Vec<TrainerDraft> {
    TRAINER_NAMES
        .iter()
        .map(|name| {
            let mut days: Vec<_> = WEEKDAYS
                .iter()
                .copied()
                .filter(|_| rng.gen_bool(0.5))
                .collect();
            if days.is_empty() {
                days.push(WEEKDAYS[rng.gen_range(0..WEEKDAYS.len())]);
            }

            let start_hour = rng.gen_range(6..=11);
            let length = rng.gen_range(4..=9);
            let shift = NaiveTime::from_hms_opt(start_hour, 0, 0)
                .zip(NaiveTime::from_hms_opt(start_hour + length, 0, 0))
                .and_then(|(start, end)| ShiftWindow::new(start, end).ok());

            TrainerDraft {
                name: name.to_string(),
                expertise: random_expertise(rng),
                available_days: days,
                shift,
                room_id: None,
            }
        })
        .collect()
}

/// One member per name in the pool with plausible random metrics
pub fn random_members<R: Rng + ?Sized>(rng: &mut R, today: NaiveDate) -> Vec<MemberDraft> {
    MEMBER_NAMES
        .iter()
        .map(|name| {
            let preference = random_expertise(rng);
            let goal = *preference
                .goals()
                .choose(rng)
                .unwrap_or(&preference.goals()[0]);
            let age_days = rng.gen_range(18 * 365..=60 * 365);
            let weight: f64 = rng.gen_range(50.0..=100.0);

            MemberDraft {
                name: name.to_string(),
                birthday: Some(today - Duration::days(age_days)),
                height_cm: Some(rng.gen_range(150..=190) as f64),
                weight_kg: (weight * 10.0).round() / 10.0,
                activity_level: rng.gen_range(1..=10),
                preference,
                goal,
                nutrients: None,
            }
        })
        .collect()
}

fn random_expertise<R: Rng + ?Sized>(rng: &mut R) -> Expertise {
    Expertise::all()[rng.gen_range(0..Expertise::all().len())]
}

pub fn add_random_trainers<R: Rng + ?Sized>(db: &Database, rng: &mut R) -> Result<Vec<TrainerId>> {
    let ids = random_trainers(rng)
        .iter()
        .map(|t| db.add_trainer(t))
        .collect::<Result<Vec<_>>>()?;
    info!("Auto-added {} trainers", ids.len());
    Ok(ids)
}

pub fn add_random_members<R: Rng + ?Sized>(
    db: &mut Database,
    rng: &mut R,
    today: NaiveDate,
) -> Result<Vec<MemberId>> {
    let ids = random_members(rng, today)
        .iter()
        .map(|m| db.add_member(m))
        .collect::<Result<Vec<_>>>()?;
    info!("Auto-added {} members", ids.len());
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn test_random_trainers_are_valid() {
        let mut rng = StdRng::seed_from_u64(3);
        let trainers = random_trainers(&mut rng);
        assert_eq!(trainers.len(), TRAINER_NAMES.len());
        for t in &trainers {
            assert!(!t.available_days.is_empty());
            let shift = t.shift.expect("generated trainers always have a shift");
            assert!(shift.start < shift.end);
        }
    }

    #[test]
    fn test_random_members_are_valid() {
        let mut rng = StdRng::seed_from_u64(3);
        for m in random_members(&mut rng, today()) {
            assert!(m.preference.covers(m.goal), "{} / {}", m.preference, m.goal);
            assert!((1..=10).contains(&m.activity_level));
            assert!((50.0..=100.0).contains(&m.weight_kg));
            let age = today().years_since(m.birthday.unwrap()).unwrap();
            assert!((17..=60).contains(&age), "age {}", age);
        }
    }

    #[test]
    fn test_auto_add_writes_rows() {
        let mut db = Database::open_in_memory().unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        add_random_trainers(&db, &mut rng).unwrap();
        add_random_members(&mut db, &mut rng, today()).unwrap();
        assert_eq!(db.get_trainers().unwrap().len(), TRAINER_NAMES.len());
        assert_eq!(db.get_members().unwrap().len(), MEMBER_NAMES.len());
    }
}
