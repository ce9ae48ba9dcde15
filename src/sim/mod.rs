//! Simulation module - assignment runs and progress projection
//!
//! Features:
//! - Trainer assignment with explicit policy (first match / random)
//! - Linear progress projection over simulated days or weeks
//! - Weight trend over the progress log (linfa)

pub mod matcher;
pub mod projector;
pub mod trend;

pub use matcher::{Assignment, Outcome};
pub use projector::{Projection, TimeUnit};
pub use trend::WeightTrend;

use anyhow::Result;
use chrono::{DateTime, NaiveDateTime, Utc};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::config::{AssignOptions, ProjectionOptions};
use crate::db::{Database, MemberId, Observation};
use crate::error::GymError;

/// Run the matcher over the stored roster and persist the outcome
pub fn run_assignment<R: Rng + ?Sized>(
    db: &mut Database,
    now: NaiveDateTime,
    options: &AssignOptions,
    rng: &mut R,
) -> Result<Vec<Assignment>> {
    let members = db.get_members()?;
    let trainers = db.get_trainers()?;
    debug!(
        members = members.len(),
        trainers = trainers.len(),
        ?options,
        "running assignment"
    );

    let assignments = matcher::assign(&members, &trainers, now, options, rng);

    let links: Vec<_> = assignments
        .iter()
        .filter(|a| a.is_change())
        .map(|a| (a.member_id, a.trainer_id()))
        .collect();
    db.set_trainers(&links)?;

    let unassigned: Vec<_> = assignments
        .iter()
        .filter(|a| a.outcome == Outcome::Unassigned)
        .collect();
    for a in &unassigned {
        warn!(member_id = a.member_id, "no qualifying trainer for {}", a.member_name);
    }
    info!(
        "Assignment: {} considered, {} changed, {} unassigned",
        assignments.len(),
        links.len(),
        unassigned.len()
    );

    Ok(assignments)
}

/// Project every member (or just one) and log the results
pub fn run_simulation(
    db: &mut Database,
    elapsed: u32,
    unit: TimeUnit,
    member: Option<MemberId>,
    options: &ProjectionOptions,
    now: DateTime<Utc>,
) -> Result<Vec<Projection>> {
    let members = match member {
        Some(id) => vec![db.get_member(id)?.ok_or(GymError::NotFound {
            entity: "member",
            id,
        })?],
        None => db.get_members()?,
    };

    let mut projections = Vec::with_capacity(members.len());
    for member in &members {
        let last = db.last_observation(member.id)?;
        let projection =
            projector::project(member, last.as_ref(), elapsed, unit, options, now)?;
        debug!(
            member_id = member.id,
            from = projection.previous_weight,
            to = projection.new_weight,
            "projected"
        );
        projections.push(projection);
    }

    let observations: Vec<Observation> =
        projections.iter().map(|p| p.observation.clone()).collect();
    db.record_progress(&observations)?;

    info!(
        "Simulated {} {} for {} members",
        elapsed,
        unit.label(elapsed),
        projections.len()
    );
    Ok(projections)
}

/// Progress log for one member; an empty log is a normal answer
pub fn history(db: &Database, member_id: MemberId) -> Result<Vec<Observation>> {
    if db.get_member(member_id)?.is_none() {
        return Err(GymError::NotFound {
            entity: "member",
            id: member_id,
        }
        .into());
    }
    db.get_progress(member_id)
}
