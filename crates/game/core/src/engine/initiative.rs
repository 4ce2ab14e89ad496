//! Initiative ordering.
//!
//! Each round every actor rolls the initiative die and adds a speed bonus:
//!
//! ```text
//! score = roll + speed / speed_divisor
//! ```
//!
//! Living actors act in descending score order. Dead actors are kept at the
//! end of the order so a revived actor can still be reached.

use std::cmp::Ordering;

use crate::rng::CombatRng;
use crate::state::{ActorId, BattleState};

/// One actor's initiative inputs for a round.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InitiativeEntry {
    pub actor: ActorId,
    pub roll: u32,
    pub speed: f32,
    pub is_dead: bool,
}

impl InitiativeEntry {
    pub fn score(&self, speed_divisor: f32) -> f32 {
        let bonus = if speed_divisor > 0.0 {
            self.speed / speed_divisor
        } else {
            0.0
        };
        self.roll as f32 + bonus
    }
}

/// Roll initiative for every actor in id order.
///
/// Dead actors roll too, so the number of draws per round does not depend on
/// who is still standing.
pub fn roll_initiative(state: &BattleState, rng: &mut dyn CombatRng, die: u32) -> Vec<InitiativeEntry> {
    state
        .actors()
        .iter()
        .map(|actor| InitiativeEntry {
            actor: actor.id,
            roll: rng.roll_die(die),
            speed: actor.speed(),
            is_dead: actor.is_dead,
        })
        .collect()
}

/// Sort entries into acting order: living first, higher score first, lower
/// id on ties.
pub fn compute_turn_order(entries: &[InitiativeEntry], speed_divisor: f32) -> Vec<ActorId> {
    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| {
        a.is_dead
            .cmp(&b.is_dead)
            .then_with(|| {
                b.score(speed_divisor)
                    .partial_cmp(&a.score(speed_divisor))
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| a.actor.cmp(&b.actor))
    });
    sorted.into_iter().map(|e| e.actor).collect()
}
