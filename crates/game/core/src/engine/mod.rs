//! Battle orchestration.
//!
//! [`Battle`] is the explicit context object that owns everything one match
//! needs: the canonical [`BattleState`], the passive rule registry, the RNG,
//! the affinity meter, the event log and the subscriber bus. There is no
//! global state; two battles in one process never share anything.
//!
//! Every mutating operation follows the same shape:
//!
//! 1. mutate state through the actor surface, appending events to the emitter
//! 2. [`settle`](Battle::settle): let death hooks and the affinity layer react
//!    to each new event (their reactions are appended behind it), check the
//!    win condition
//! 3. move the settled events to the log and publish them on the bus
mod actions;
mod attrition;
mod errors;
mod initiative;
mod lock;
mod turns;

pub use actions::ActionReport;
pub use attrition::attrition_damage;
pub use errors::{BattleError, TurnError};
pub use initiative::{InitiativeEntry, compute_turn_order, roll_initiative};
pub use lock::AdvanceLock;
pub use turns::TurnStartOutcome;

use crate::affinity::AffinityMeter;
use crate::combat::{DamageCategory, ResolutionPlan, ResolveContext};
use crate::config::BattleConfig;
use crate::events::{BattleEvent, Emitter, EventBus};
use crate::passive::{IncomingDamage, PassiveContext, PassiveRegistry};
use crate::rng::{CombatRng, PcgRng};
use crate::state::{Actor, ActorId, BattleState, StateError, TeamId, TurnPhase};

/// State, pending events, RNG and config: the pieces every mutation borrows.
struct BattleCore {
    state: BattleState,
    events: Emitter,
    rng: Box<dyn CombatRng>,
    config: BattleConfig,
}

impl BattleCore {
    fn passive_context(&mut self) -> PassiveContext<'_> {
        PassiveContext {
            state: &mut self.state,
            events: &mut self.events,
            rng: &mut *self.rng,
            config: &self.config,
        }
    }

    fn resolve_context<'a>(&'a mut self, passives: &'a PassiveRegistry) -> ResolveContext<'a> {
        ResolveContext {
            state: &mut self.state,
            events: &mut self.events,
            rng: &mut *self.rng,
            passives,
            config: &self.config,
        }
    }
}

/// One running match.
pub struct Battle {
    core: BattleCore,
    passives: PassiveRegistry,
    affinity: AffinityMeter,
    bus: EventBus,
    log: Vec<BattleEvent>,
    lock: AdvanceLock,
    /// Plan handed out by `plan_ability` and not yet committed.
    outstanding: Option<ResolutionPlan>,
}

impl Battle {
    pub fn builder(actors: Vec<Actor>) -> BattleBuilder {
        BattleBuilder::new(actors)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn state(&self) -> &BattleState {
        &self.core.state
    }

    pub fn config(&self) -> &BattleConfig {
        &self.core.config
    }

    pub fn passives(&self) -> &PassiveRegistry {
        &self.passives
    }

    pub fn affinity(&self) -> &AffinityMeter {
        &self.affinity
    }

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.core.state.actor(id)
    }

    pub fn round(&self) -> u32 {
        self.core.state.turn.round
    }

    pub fn phase(&self) -> TurnPhase {
        self.core.state.turn.phase
    }

    pub fn current_actor(&self) -> Option<ActorId> {
        self.core.state.turn.current
    }

    pub fn turn_order(&self) -> &[ActorId] {
        &self.core.state.turn.order
    }

    pub fn is_over(&self) -> bool {
        self.core.state.turn.is_over()
    }

    pub fn winner(&self) -> Option<TeamId> {
        self.core.state.turn.winner
    }

    pub fn outstanding_plan(&self) -> Option<&ResolutionPlan> {
        self.outstanding.as_ref()
    }

    /// Every event committed so far, in order.
    pub fn log(&self) -> &[BattleEvent] {
        &self.log
    }

    /// Events committed at or after log position `mark`.
    pub fn events_since(&self, mark: usize) -> &[BattleEvent] {
        self.log.get(mark..).unwrap_or(&[])
    }

    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    // ========================================================================
    // Settlement
    // ========================================================================

    /// React to pending events, check the win condition, then commit.
    ///
    /// Reactions append behind the event that caused them, so the walk is
    /// breadth-first and terminates once no reaction emits anything new.
    fn settle(&mut self) {
        let mut cursor = 0;
        while let Some(event) = self.core.events.get(cursor).cloned() {
            cursor += 1;
            self.react(&event);
        }
        self.check_victory();

        for event in self.core.events.drain() {
            tracing::trace!(target: "arena::events", topic = %event.topic(), "committed");
            self.log.push(event.clone());
            self.bus.publish(event);
        }
    }

    fn react(&mut self, event: &BattleEvent) {
        match event {
            BattleEvent::CharacterDied { actor, .. } => {
                self.passives
                    .run_character_death(*actor, &mut self.core.passive_context());
            }
            BattleEvent::CharacterRevived { actor, .. } => self.requeue(*actor),
            _ => {}
        }
        if self.core.config.affinity_enabled {
            self.affinity.observe(event, &mut self.core.passive_context());
        }
    }

    /// Move a revived actor to the bottom of the current order.
    fn requeue(&mut self, actor: ActorId) {
        let turn = &mut self.core.state.turn;
        if let Some(pos) = turn.order.iter().position(|&id| id == actor) {
            turn.order.remove(pos);
            if pos < turn.cursor {
                turn.cursor -= 1;
            }
        }
        turn.order.push(actor);
        tracing::debug!(target: "arena::turns", %actor, "revived actor requeued");
    }

    fn check_victory(&mut self) {
        let turn = &self.core.state.turn;
        if !turn.has_started() || turn.is_over() {
            return;
        }
        if !self.core.state.is_decided() {
            return;
        }
        let round = turn.round;
        let winner = self.core.state.winner();
        let turn = &mut self.core.state.turn;
        turn.phase = TurnPhase::Ended;
        turn.winner = winner;
        self.outstanding = None;
        tracing::info!(target: "arena::turns", ?winner, round, "battle over");
        self.core.events.emit(BattleEvent::GameEnded { winner });
    }

    /// Scheduler-originated damage (per-turn effects, attrition).
    ///
    /// The target's incoming-damage rules see it first.
    fn strike(
        &mut self,
        target: ActorId,
        amount: i32,
        category: DamageCategory,
        source: Option<ActorId>,
    ) -> u32 {
        let mut hit = IncomingDamage {
            target,
            source,
            amount,
            category,
        };
        let mut ctx = self.core.passive_context();
        self.passives.run_incoming_damage(&mut hit, &mut ctx);
        ctx.deal_damage(hit.target, hit.amount, hit.category, hit.source)
    }
}

impl std::fmt::Debug for Battle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Battle")
            .field("round", &self.core.state.turn.round)
            .field("phase", &self.core.state.turn.phase)
            .field("current", &self.core.state.turn.current)
            .field("actors", &self.core.state.actors().len())
            .field("log", &self.log.len())
            .field("passives", &self.passives)
            .finish_non_exhaustive()
    }
}

/// Assembles a [`Battle`].
pub struct BattleBuilder {
    actors: Vec<Actor>,
    config: BattleConfig,
    passives: PassiveRegistry,
    rng: Option<Box<dyn CombatRng>>,
    seed: u64,
}

impl BattleBuilder {
    pub fn new(actors: Vec<Actor>) -> Self {
        Self {
            actors,
            config: BattleConfig::default(),
            passives: PassiveRegistry::default(),
            rng: None,
            seed: 0,
        }
    }

    pub fn config(mut self, config: BattleConfig) -> Self {
        self.config = config;
        self
    }

    pub fn passives(mut self, passives: PassiveRegistry) -> Self {
        self.passives = passives;
        self
    }

    /// Seed for the default generator. Ignored when [`rng`](Self::rng) is set.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn rng(mut self, rng: impl CombatRng + 'static) -> Self {
        self.rng = Some(Box::new(rng));
        self
    }

    pub fn build(self) -> Result<Battle, StateError> {
        let state = BattleState::new(self.actors)?;
        let rng = self
            .rng
            .unwrap_or_else(|| Box::new(PcgRng::seeded(self.seed)));
        tracing::debug!(
            target: "arena::turns",
            actors = state.actors().len(),
            rules = self.passives.len(),
            affinity = self.config.affinity_enabled,
            "battle assembled"
        );
        Ok(Battle {
            core: BattleCore {
                state,
                events: Emitter::new(),
                rng,
                config: self.config,
            },
            passives: self.passives,
            affinity: AffinityMeter::new(),
            bus: EventBus::new(),
            log: Vec::new(),
            lock: AdvanceLock::new(),
            outstanding: None,
        })
    }
}
