//! Round and turn scheduling.
//!
//! ```text
//! start_battle → RoundStart → TurnStart ─┬─ AwaitingAction → use_ability ─┐
//!                    ▲                   ├─ Stunned → skip_turn ──────────┤
//!                    │                   └─ fell at turn start ───────────┤
//!                    └──────── index wraps ◀── advance ◀── TurnEnd ◀──────┘
//! ```
use super::attrition::attrition_damage;
use super::initiative::{compute_turn_order, roll_initiative};
use super::{Battle, TurnError};
use crate::combat::DamageCategory;
use crate::events::{BattleEvent, SkipReason};
use crate::state::{Actor, ActorId, TeamId, TurnInstruction, TurnPhase};

/// What the caller should do now that a turn has (or has not) begun.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TurnStartOutcome {
    /// `actor` may act.
    AwaitingAction { actor: ActorId },
    /// `actor` is stunned. Wait `delay_ms`, then call [`Battle::skip_turn`].
    Stunned { actor: ActorId, delay_ms: u64 },
    /// The advance is held by an [`AdvanceLock`](super::AdvanceLock).
    Deferred,
    BattleOver { winner: Option<TeamId> },
}

impl Battle {
    /// Fire game-start rules, run round 1 and begin the first turn.
    pub fn start_battle(&mut self) -> Result<TurnStartOutcome, TurnError> {
        if self.core.state.turn.has_started() {
            return Err(TurnError::AlreadyStarted);
        }
        self.core.state.turn.phase = TurnPhase::BetweenTurns;

        let actors = self.core.state.actors().len() as u32;
        tracing::info!(
            target: "arena::turns",
            actors,
            affinity = self.core.config.affinity_enabled,
            "battle started"
        );
        self.core.events.emit(BattleEvent::GameStarted { actors });
        self.passives.run_game_start(&mut self.core.passive_context());
        self.settle();

        if let Some(over) = self.over_outcome() {
            return Ok(over);
        }
        self.begin_round();
        self.enter_turn_from(0)
    }

    /// End the current actor's turn without acting.
    ///
    /// A stunned actor's skip is reported as [`SkipReason::Stunned`].
    pub fn skip_turn(&mut self, actor: ActorId) -> Result<TurnStartOutcome, TurnError> {
        let current = self.acting_actor()?;
        if current != actor {
            return Err(TurnError::NotCurrentActor {
                expected: current,
                actual: actor,
            });
        }
        let reason = if self.core.state.actor(actor).is_some_and(Actor::is_stunned) {
            SkipReason::Stunned
        } else {
            SkipReason::Requested
        };
        tracing::debug!(target: "arena::turns", %actor, ?reason, "turn skipped");
        self.core
            .events
            .emit(BattleEvent::TurnSkipped { actor, reason });
        self.finish_turn(actor);
        self.request_advance()
    }

    /// End the current turn and advance.
    pub fn end_turn(&mut self) -> Result<TurnStartOutcome, TurnError> {
        let current = self.acting_actor()?;
        self.finish_turn(current);
        self.request_advance()
    }

    /// Hold back turn advancement until [`release_advance`](Self::release_advance).
    ///
    /// Returns false if the lock was already held.
    pub fn lock_advance(&mut self) -> bool {
        self.lock.acquire()
    }

    /// Release the advance lock, flushing the deferred advance if there is one.
    pub fn release_advance(&mut self) -> Result<Option<TurnStartOutcome>, TurnError> {
        if !self.lock.is_held() {
            return Err(TurnError::NotLocked);
        }
        if !self.lock.release() {
            return Ok(None);
        }
        tracing::debug!(target: "arena::turns", "deferred advance flushed");
        self.advance().map(Some)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// The actor whose turn is open, or why there is none.
    fn acting_actor(&self) -> Result<ActorId, TurnError> {
        let turn = &self.core.state.turn;
        match turn.phase {
            TurnPhase::NotStarted => Err(TurnError::BattleNotStarted),
            TurnPhase::Ended => Err(TurnError::BattleOver),
            TurnPhase::Resolving => Err(TurnError::ResolutionInProgress),
            TurnPhase::BetweenTurns => Err(TurnError::NoOpenTurn),
            TurnPhase::AwaitingAction => turn.current.ok_or(TurnError::NoLivingActors),
        }
    }

    pub(super) fn over_outcome(&self) -> Option<TurnStartOutcome> {
        let turn = &self.core.state.turn;
        turn.is_over().then_some(TurnStartOutcome::BattleOver {
            winner: turn.winner,
        })
    }

    /// Advance past the current order index, unless the lock defers it.
    pub(super) fn request_advance(&mut self) -> Result<TurnStartOutcome, TurnError> {
        if let Some(over) = self.over_outcome() {
            return Ok(over);
        }
        if self.lock.defer() {
            tracing::debug!(target: "arena::turns", "advance deferred");
            return Ok(TurnStartOutcome::Deferred);
        }
        self.advance()
    }

    fn advance(&mut self) -> Result<TurnStartOutcome, TurnError> {
        let next = self.core.state.turn.cursor + 1;
        self.enter_turn_from(next)
    }

    /// Expire the actor's effects and close the turn.
    pub(super) fn finish_turn(&mut self, actor: ActorId) {
        let core = &mut self.core;
        if let Some(owner) = core.state.actor_mut(actor) {
            let expired = owner.expire_effects(&mut core.events);
            if expired > 0 {
                tracing::trace!(target: "arena::turns", %actor, expired, "effects expired");
            }
        }
        core.state.turn.phase = TurnPhase::BetweenTurns;
        core.events.emit(BattleEvent::TurnEnded { actor });
        self.settle();
    }

    /// Begin the first living actor's turn at or after `start`, rolling a
    /// new round whenever the order is exhausted.
    fn enter_turn_from(&mut self, mut start: usize) -> Result<TurnStartOutcome, TurnError> {
        loop {
            if let Some(over) = self.over_outcome() {
                return Ok(over);
            }
            match self.seek_living(start) {
                Some(index) => {
                    if let Some(outcome) = self.begin_turn(index) {
                        return Ok(outcome);
                    }
                    start = index + 1;
                }
                None => {
                    if !self.core.state.actors().iter().any(Actor::is_alive) {
                        self.check_victory();
                        return Ok(TurnStartOutcome::BattleOver {
                            winner: self.core.state.turn.winner,
                        });
                    }
                    self.begin_round();
                    start = 0;
                }
            }
        }
    }

    fn seek_living(&self, start: usize) -> Option<usize> {
        let state = &self.core.state;
        state
            .turn
            .order
            .iter()
            .enumerate()
            .skip(start)
            .find(|(_, id)| state.actor(**id).is_some_and(Actor::is_alive))
            .map(|(index, _)| index)
    }

    /// Round boundary: attrition, initiative, cooldowns, round-start rules,
    /// due fusions.
    fn begin_round(&mut self) {
        let round = {
            let turn = &mut self.core.state.turn;
            turn.round += 1;
            turn.round
        };
        tracing::info!(target: "arena::turns", round, "round started");
        self.core.events.emit(BattleEvent::RoundStarted { round });

        if let Some(tier) = self.core.config.attrition_for(round).copied() {
            let bleed: Vec<(ActorId, u32)> = self
                .core
                .state
                .actors()
                .iter()
                .filter(|a| a.is_alive())
                .map(|a| (a.id, attrition_damage(&tier, a)))
                .collect();
            tracing::debug!(target: "arena::turns", round, percent = tier.percent, "attrition");
            for (id, amount) in bleed {
                if amount > 0 {
                    self.strike(id, amount as i32, DamageCategory::True, None);
                }
            }
        }

        let core = &mut self.core;
        let entries = roll_initiative(&core.state, &mut *core.rng, core.config.initiative_die);
        let order = compute_turn_order(&entries, core.config.speed_divisor);
        {
            let turn = &mut core.state.turn;
            turn.order = order.clone();
            turn.cursor = 0;
            turn.current = None;
        }
        for actor in core.state.actors_mut() {
            actor.begin_round();
        }

        self.passives
            .run_round_start(round, &mut self.core.passive_context());
        if self.core.config.affinity_enabled {
            self.affinity
                .begin_round(round, &mut self.core.passive_context());
        }

        tracing::debug!(target: "arena::turns", round, ?order, "turn order computed");
        self.core
            .events
            .emit(BattleEvent::TurnOrderComputed { round, order });
        self.settle();
    }

    /// Open the turn of the actor at order `index`.
    ///
    /// Returns `None` when the actor fell to its own per-turn effects; that
    /// turn is closed and the caller moves on.
    fn begin_turn(&mut self, index: usize) -> Option<TurnStartOutcome> {
        let id = *self.core.state.turn.order.get(index)?;
        let team = self.core.state.actor(id)?.team;
        let round = {
            let turn = &mut self.core.state.turn;
            turn.cursor = index;
            turn.current = Some(id);
            turn.last_team = Some(team);
            turn.phase = TurnPhase::AwaitingAction;
            turn.round
        };
        tracing::debug!(target: "arena::turns", actor = %id, round, "turn started");
        self.core.events.emit(BattleEvent::TurnStarted {
            actor: id,
            team,
            round,
        });

        let instructions = self
            .core
            .state
            .actor(id)
            .map(Actor::turn_instructions)
            .unwrap_or_default();
        for instruction in instructions {
            self.apply_instruction(id, instruction);
        }
        if let Some(actor) = self.core.state.actor_mut(id) {
            actor.apply_cooldown_modifiers();
        }
        self.passives
            .run_turn_start(id, &mut self.core.passive_context());
        self.settle();

        if let Some(over) = self.over_outcome() {
            return Some(over);
        }
        let actor = self.core.state.actor(id)?;
        if actor.is_dead {
            tracing::debug!(target: "arena::turns", actor = %id, "fell at turn start");
            self.finish_turn(id);
            return None;
        }
        if actor.is_stunned() {
            return Some(TurnStartOutcome::Stunned {
                actor: id,
                delay_ms: self.core.config.stun_skip_delay_ms,
            });
        }
        Some(TurnStartOutcome::AwaitingAction { actor: id })
    }

    fn apply_instruction(&mut self, owner: ActorId, instruction: TurnInstruction) {
        match instruction {
            TurnInstruction::Damage {
                amount,
                category,
                source,
                ..
            } => {
                self.strike(owner, amount, category, source);
            }
            TurnInstruction::Heal { amount, source, .. } => {
                let core = &mut self.core;
                if let Some(actor) = core.state.actor_mut(owner) {
                    actor.heal(amount, source, &mut core.events);
                }
            }
            TurnInstruction::Shield { amount, source, .. } => {
                let core = &mut self.core;
                if let Some(actor) = core.state.actor_mut(owner) {
                    actor.add_shield(amount, source, &mut core.events);
                }
            }
            TurnInstruction::ShiftDurations { effect, delta } => {
                if let Some(actor) = self.core.state.actor_mut(owner) {
                    actor.shift_debuff_durations(effect, delta);
                }
            }
        }
    }
}
