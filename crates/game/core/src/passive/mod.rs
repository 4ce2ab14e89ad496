//! Passive rule engine.
//!
//! Passive rules are archetype-specific reactions invoked at fixed lifecycle
//! hooks. Each rule declares the hooks it participates in through
//! [`PassiveHooks`]; the [`PassiveRegistry`] only dispatches declared hooks,
//! so the full {archetype → hooks} table is explicit and inspectable.
//!
//! # Hook Points
//!
//! - **Game start**: persistent one-time buffs
//! - **Round start**: every living owner, after initiative is rolled
//! - **Turn start**: the owner's own turn, after per-turn effects
//! - **Character death**: every owner still standing, plus the fallen owner
//! - **Incoming damage**: just before damage is applied to the owner
//! - **Damage override**: just before an ability hits, for the owner as
//!   caster or target; the override lives for that resolution only
//! - **Ability resolved**: after the owner's ability is broadcast
//!
//! Rules never bypass the actor mutation surface: [`PassiveContext`] helpers
//! call the same `take_damage`/`add_status_effect` methods as the resolver,
//! so their effects publish through the same topics.

mod registry;

use std::sync::Arc;

use bitflags::bitflags;

pub use registry::PassiveRegistry;

use crate::combat::{DamageCategory, ResolutionOutcome};
use crate::config::BattleConfig;
use crate::events::{BattleEvent, Emitter};
use crate::rng::CombatRng;
use crate::state::{Ability, Actor, ActorId, BattleState, DamageScaling, EffectId, StatusEffect, StatusTemplate};

bitflags! {
    /// Lifecycle hooks a rule participates in.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct PassiveHooks: u8 {
        const GAME_START       = 1 << 0;
        const ROUND_START      = 1 << 1;
        const TURN_START       = 1 << 2;
        const CHARACTER_DEATH  = 1 << 3;
        const INCOMING_DAMAGE  = 1 << 4;
        const DAMAGE_OVERRIDE  = 1 << 5;
        const ABILITY_RESOLVED = 1 << 6;
    }
}

/// Damage about to be applied, open for rewriting by incoming-damage rules.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IncomingDamage {
    pub target: ActorId,
    pub source: Option<ActorId>,
    pub amount: i32,
    pub category: DamageCategory,
}

/// Mutable battle access handed to rules.
pub struct PassiveContext<'a> {
    pub state: &'a mut BattleState,
    pub events: &'a mut Emitter,
    pub rng: &'a mut dyn CombatRng,
    pub config: &'a BattleConfig,
}

impl PassiveContext<'_> {
    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.state.actor(id)
    }

    /// Emit a `PassiveTriggered` marker for presentation.
    pub fn announce(&mut self, owner: ActorId, rule: &str) {
        tracing::debug!(target: "arena::passives", %owner, rule, "passive triggered");
        self.events.emit(BattleEvent::PassiveTriggered {
            actor: owner,
            rule: rule.to_owned(),
        });
    }

    pub fn deal_damage(
        &mut self,
        target: ActorId,
        amount: i32,
        category: DamageCategory,
        source: Option<ActorId>,
    ) -> u32 {
        let Some(actor) = self.state.actor_mut(target) else {
            return 0;
        };
        match actor.take_damage(amount, category, source, self.events) {
            Ok(dealt) => dealt,
            Err(violation) => {
                tracing::warn!(target: "arena::passives", %violation, "rule damage aborted");
                0
            }
        }
    }

    pub fn heal(&mut self, target: ActorId, amount: u32, source: Option<ActorId>) -> u32 {
        self.state
            .actor_mut(target)
            .map_or(0, |actor| actor.heal(amount, source, self.events))
    }

    pub fn add_shield(&mut self, target: ActorId, amount: u32, source: Option<ActorId>) -> u32 {
        self.state
            .actor_mut(target)
            .map_or(0, |actor| actor.add_shield(amount, source, self.events))
    }

    pub fn grant_charge(&mut self, target: ActorId, amount: u32) {
        if let Some(actor) = self.state.actor_mut(target) {
            actor.increase_charge(amount, self.events);
        }
    }

    /// Bind and attach a template. Returns the new instance id if it landed.
    pub fn apply_status(
        &mut self,
        target: ActorId,
        template: &StatusTemplate,
        source: Option<ActorId>,
    ) -> Option<EffectId> {
        let id = self.state.allocate_effect_id();
        let actor = self.state.actor_mut(target)?;
        let effect = StatusEffect::bind(template, id, source);
        actor.add_status_effect(effect, self.events).then_some(id)
    }
}

/// One archetype-specific conditional behavior.
///
/// Every hook has a no-op default; a rule overrides the ones it declares in
/// [`PassiveRule::hooks`]. `owner` is always the actor carrying the rule.
pub trait PassiveRule: Send + Sync {
    /// Returns a human-readable name for this rule (used in logs and events).
    fn name(&self) -> &'static str;

    fn hooks(&self) -> PassiveHooks;

    /// Lower values run first within one archetype.
    fn priority(&self) -> i32 {
        0
    }

    fn on_game_start(&self, _owner: ActorId, _ctx: &mut PassiveContext<'_>) {}

    fn on_round_start(&self, _owner: ActorId, _round: u32, _ctx: &mut PassiveContext<'_>) {}

    fn on_turn_start(&self, _owner: ActorId, _ctx: &mut PassiveContext<'_>) {}

    fn on_character_death(&self, _owner: ActorId, _dead: ActorId, _ctx: &mut PassiveContext<'_>) {}

    /// Rewrite damage about to hit `owner`.
    fn on_incoming_damage(
        &self,
        _owner: ActorId,
        _hit: &mut IncomingDamage,
        _ctx: &mut PassiveContext<'_>,
    ) {
    }

    /// Substitute the damage function for one (caster, target) resolution.
    fn damage_override(
        &self,
        _owner: ActorId,
        _caster: &Actor,
        _target: &Actor,
        _ability: &Ability,
    ) -> Option<Arc<dyn DamageScaling>> {
        None
    }

    fn on_ability_resolved(
        &self,
        _owner: ActorId,
        _outcome: &ResolutionOutcome,
        _ctx: &mut PassiveContext<'_>,
    ) {
    }
}
