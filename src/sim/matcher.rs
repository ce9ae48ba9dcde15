//! Trainer assignment
//!
//! Members are visited in the order given and each is offered the trainers
//! in the order given. There is no backtracking: once a member is placed the
//! choice is final for this run.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::config::{AssignMode, AssignOptions};
use crate::db::{Member, MemberId, Trainer, TrainerId};

/// What happened to one member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Assigned {
        trainer_id: TrainerId,
        trainer_name: String,
    },
    Unassigned,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub member_id: MemberId,
    pub member_name: String,
    /// Trainer the member had before this run
    pub previous: Option<TrainerId>,
    pub outcome: Outcome,
}

impl Assignment {
    pub fn trainer_id(&self) -> Option<TrainerId> {
        match &self.outcome {
            Outcome::Assigned { trainer_id, .. } => Some(*trainer_id),
            Outcome::Unassigned => None,
        }
    }

    /// True when the stored reference has to change
    pub fn is_change(&self) -> bool {
        self.trainer_id() != self.previous
    }

    pub fn describe(&self) -> String {
        match &self.outcome {
            Outcome::Assigned { trainer_name, .. } => {
                format!("{} has been assigned to trainer {}.", self.member_name, trainer_name)
            }
            Outcome::Unassigned => {
                format!("{} could not be assigned: no trainer fits.", self.member_name)
            }
        }
    }
}

/// Trainer's expertise is the member's preference and offers the member's goal
pub fn can_coach(trainer: &Trainer, member: &Member) -> bool {
    trainer.expertise == member.preference && trainer.expertise.covers(member.goal)
}

/// Capability plus, when enabled, schedule. Capacity is checked separately.
pub fn qualifies(
    trainer: &Trainer,
    member: &Member,
    now: NaiveDateTime,
    options: &AssignOptions,
) -> bool {
    can_coach(trainer, member) && (!options.check_schedule || trainer.is_available(now))
}

/// Compute assignments for `members` against `trainers`.
///
/// With `skip_already_assigned` set, members that have a trainer are left
/// out of the result entirely, so rerunning on an unchanged roster yields an
/// empty result.
pub fn assign<R: Rng + ?Sized>(
    members: &[Member],
    trainers: &[Trainer],
    now: NaiveDateTime,
    options: &AssignOptions,
    rng: &mut R,
) -> Vec<Assignment> {
    let mut load: HashMap<TrainerId, usize> = HashMap::new();
    if options.skip_already_assigned {
        for id in members.iter().filter_map(|m| m.trainer_id) {
            *load.entry(id).or_insert(0) += 1;
        }
    }

    let mut assignments = Vec::new();

    for member in members {
        if options.skip_already_assigned && member.trainer_id.is_some() {
            continue;
        }

        let has_room = |t: &Trainer| match options.capacity {
            Some(cap) => load.get(&t.id).copied().unwrap_or(0) < cap,
            None => true,
        };

        let chosen = match options.mode {
            AssignMode::FirstMatch => trainers
                .iter()
                .find(|&t| qualifies(t, member, now, options) && has_room(t)),
            AssignMode::Random => {
                let open: Vec<&Trainer> = trainers.iter().filter(|&t| has_room(t)).collect();
                open.choose(rng).copied()
            }
        };

        let outcome = match chosen {
            Some(trainer) => {
                *load.entry(trainer.id).or_insert(0) += 1;
                Outcome::Assigned {
                    trainer_id: trainer.id,
                    trainer_name: trainer.name.clone(),
                }
            }
            None => Outcome::Unassigned,
        };

        assignments.push(Assignment {
            member_id: member.id,
            member_name: member.name.clone(),
            previous: member.trainer_id,
            outcome,
        });
    }

    assignments
}
