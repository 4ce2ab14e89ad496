//! Ability resolution pipeline.
//!
//! ```text
//! Validate → ResolveHits → ApplyEffects → Bookkeep → Broadcast
//! ```
//!
//! Resolution is split into two calls so a presentation layer can wait
//! between them:
//!
//! - [`plan`] validates and freezes one hit roll per target. It touches
//!   nothing but the RNG.
//! - [`commit`] applies the plan, books cooldown and charge, and broadcasts
//!   the aggregate `AbilityResolved` event.
//!
//! Damage overrides offered by passive rules are looked up per
//! (caster, target) pair inside [`commit`] and live only for that call.

use std::sync::Arc;

use super::{
    HitRoll, InvariantViolation, OutcomeFlags, ResolutionOutcome, ResolutionPlan,
    ResolveError, TargetOutcome, check_crit, check_hit, hit_chance, scale,
};
use crate::config::BattleConfig;
use crate::error::GameError;
use crate::events::{BattleEvent, Emitter};
use crate::passive::{IncomingDamage, PassiveContext, PassiveRegistry};
use crate::rng::CombatRng;
use crate::state::{
    Ability, AbilityCategory, ActorId, BattleState, DamageScaling, StatusEffect, StatusKind, TeamId,
};
use crate::stats::CombatStats;

/// Mutable battle access for one resolution.
pub struct ResolveContext<'a> {
    pub state: &'a mut BattleState,
    pub events: &'a mut Emitter,
    pub rng: &'a mut dyn CombatRng,
    pub passives: &'a PassiveRegistry,
    pub config: &'a BattleConfig,
}

impl ResolveContext<'_> {
    fn passive_context(&mut self) -> PassiveContext<'_> {
        PassiveContext {
            state: &mut *self.state,
            events: &mut *self.events,
            rng: &mut *self.rng,
            config: self.config,
        }
    }
}

/// A use that passed validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedUse {
    pub caster: ActorId,
    pub team: TeamId,
    pub category: AbilityCategory,
    pub ability: String,
    pub targets: Vec<ActorId>,
}

/// Check a requested use against current state without mutating anything.
///
/// Unknown or illegal target ids are dropped; the request is rejected only
/// when none remain. Targets beyond the ability's cap are ignored.
pub fn validate(
    state: &BattleState,
    caster: ActorId,
    category: AbilityCategory,
    targets: &[ActorId],
) -> Result<ValidatedUse, ResolveError> {
    let actor = state.actor(caster).ok_or(ResolveError::UnknownCaster(caster))?;
    if actor.is_dead {
        return Err(ResolveError::CasterDead(caster));
    }
    let ability = actor
        .ability(category)
        .ok_or(ResolveError::AbilityNotFound { caster, category })?;
    if !category.is_activatable() {
        return Err(ResolveError::PassiveNotActivatable);
    }
    if !ability.is_usable(actor.charge) {
        return Err(ResolveError::AbilityNotUsable {
            cooldown: ability.current_cooldown,
            charge: actor.charge,
            required: ability.charge_requirement,
        });
    }

    let mut valid: Vec<ActorId> = Vec::with_capacity(targets.len());
    for &id in targets {
        let Some(target) = state.actor(id) else {
            continue;
        };
        let reachable = target.is_alive() || (ability.revives && target.team == actor.team);
        if reachable && ability.targeting.admits(actor, target) && !valid.contains(&id) {
            valid.push(id);
        }
    }
    if ability.max_targets > 0 {
        valid.truncate(ability.max_targets as usize);
    }
    if valid.is_empty() {
        return Err(ResolveError::NoValidTargets);
    }

    Ok(ValidatedUse {
        caster,
        team: actor.team,
        category,
        ability: ability.name.clone(),
        targets: valid,
    })
}

/// Validate and roll hits.
///
/// A rejection emits a diagnostic `ActionRejected` event and leaves the
/// battle state untouched.
pub fn plan(
    ctx: &mut ResolveContext<'_>,
    caster: ActorId,
    category: AbilityCategory,
    targets: &[ActorId],
) -> Result<ResolutionPlan, ResolveError> {
    let validated = match validate(ctx.state, caster, category, targets) {
        Ok(validated) => validated,
        Err(error) => {
            reject(ctx.events, Some(caster), &error);
            return Err(error);
        }
    };

    let Some(actor) = ctx.state.actor(caster) else {
        return Err(ResolveError::UnknownCaster(caster));
    };
    let Some(ability) = actor.ability(category) else {
        return Err(ResolveError::AbilityNotFound { caster, category });
    };
    let accuracy = actor.accuracy();

    let mut hits = Vec::with_capacity(validated.targets.len());
    for &id in &validated.targets {
        let Some(target) = ctx.state.actor(id) else {
            continue;
        };
        if !ability.requires_hit_roll(actor, target) {
            hits.push(HitRoll::automatic(id));
            continue;
        }
        let roll = ctx.rng.roll_unit();
        let dodge = target.dodge();
        let hit = check_hit(accuracy, dodge, roll);
        tracing::trace!(
            target: "arena::combat",
            caster = %caster,
            target_actor = %id,
            roll,
            chance = hit_chance(accuracy, dodge),
            hit,
            "hit roll"
        );
        hits.push(HitRoll {
            target: id,
            roll: Some(roll),
            chance: hit_chance(accuracy, dodge),
            hit,
        });
    }

    Ok(ResolutionPlan {
        caster,
        team: validated.team,
        category,
        ability: validated.ability,
        hits,
        round: ctx.state.turn.round,
    })
}

/// Report a rejected action: log plus diagnostic event, no state change.
pub fn reject(events: &mut Emitter, caster: Option<ActorId>, error: &ResolveError) {
    tracing::warn!(
        target: "arena::combat",
        caster = ?caster,
        code = error.error_code(),
        %error,
        "action rejected"
    );
    events.emit(BattleEvent::ActionRejected {
        caster,
        reason: error.error_code().to_owned(),
    });
}

/// Apply a plan: effects per target in order, then bookkeeping, then the
/// aggregate broadcast. Runs to completion once started.
pub fn commit(
    ctx: &mut ResolveContext<'_>,
    plan: &ResolutionPlan,
) -> Result<ResolutionOutcome, ResolveError> {
    let Some(ability) = ctx
        .state
        .actor(plan.caster)
        .and_then(|a| a.ability(plan.category))
        .cloned()
    else {
        let error = ResolveError::AbilityNotFound {
            caster: plan.caster,
            category: plan.category,
        };
        reject(ctx.events, Some(plan.caster), &error);
        return Err(error);
    };

    let mut targets = Vec::with_capacity(plan.hits.len());
    for hit in &plan.hits {
        if let Some(outcome) = apply_to_target(ctx, plan.caster, &ability, hit) {
            targets.push(outcome);
        }
    }

    let flags = targets
        .iter()
        .fold(OutcomeFlags::empty(), |acc, t| acc | t.flags);
    let charge_gained = bookkeep(ctx, plan.caster, &ability, &targets);

    let outcome = ResolutionOutcome {
        caster: plan.caster,
        category: plan.category,
        targets,
        flags,
        charge_gained,
    };

    tracing::debug!(
        target: "arena::combat",
        caster = %plan.caster,
        ability = %ability.name,
        flags = ?flags,
        charge_gained,
        "ability resolved"
    );
    ctx.events.emit(BattleEvent::AbilityResolved {
        caster: plan.caster,
        team: plan.team,
        ability: ability.name.clone(),
        category: plan.category,
        damage_category: ability.damage_category,
        targets: outcome.targets.iter().map(|t| t.target).collect(),
        flags,
        charge_gained,
    });

    let passives = ctx.passives;
    passives.run_ability_resolved(&outcome, &mut ctx.passive_context());
    Ok(outcome)
}

fn apply_to_target(
    ctx: &mut ResolveContext<'_>,
    caster_id: ActorId,
    ability: &Ability,
    hit: &HitRoll,
) -> Option<TargetOutcome> {
    let (caster_team, stats) = {
        let caster = ctx.state.actor(caster_id)?;
        (caster.team, caster.combat_stats())
    };
    let target = ctx.state.actor(hit.target)?;
    let reviving = target.is_dead && ability.revives;
    if target.is_dead && !reviving {
        tracing::trace!(target: "arena::combat", target_actor = %hit.target, "target already dead, skipped");
        return None;
    }
    let is_enemy = target.team != caster_team;

    let mut outcome = TargetOutcome {
        target: hit.target,
        ..TargetOutcome::default()
    };

    if !hit.hit {
        ctx.events.emit(BattleEvent::AttackMissed {
            source: caster_id,
            target: hit.target,
        });
        outcome.flags |= OutcomeFlags::MISS;
        return Some(outcome);
    }

    if reviving {
        let hp = ability.heal.max(1);
        let revived = ctx
            .state
            .actor_mut(hit.target)
            .is_some_and(|t| t.revive(hp, Some(caster_id), ctx.events));
        if revived {
            outcome.healed = ctx.state.actor(hit.target).map_or(0, |t| t.hp);
            outcome.flags |= OutcomeFlags::HEAL;
        }
    }

    if is_enemy && ability.is_damaging() {
        deal_ability_damage(ctx, caster_id, ability, hit.target, &stats, &mut outcome);
    }

    if !is_enemy && !reviving {
        if let Some(target) = ctx.state.actor_mut(hit.target) {
            let healed = target.heal(ability.heal, Some(caster_id), ctx.events);
            let shielded = target.add_shield(ability.shield, Some(caster_id), ctx.events);
            if healed > 0 {
                outcome.healed = healed;
                outcome.flags |= OutcomeFlags::HEAL;
            }
            if shielded > 0 {
                outcome.shielded = shielded;
                outcome.flags |= OutcomeFlags::SHIELD;
            }
        }
    }

    for template in &ability.effects {
        let roll = ctx.rng.roll_unit();
        if roll >= template.apply_chance {
            tracing::trace!(target: "arena::combat", effect = %template.name, roll, "effect resisted");
            continue;
        }
        let id = ctx.state.allocate_effect_id();
        let Some(target) = ctx.state.actor_mut(hit.target) else {
            continue;
        };
        let effect = StatusEffect::bind(template, id, Some(caster_id));
        if !target.add_status_effect(effect, ctx.events) {
            continue;
        }
        outcome.effects.push(id);
        outcome.flags |= match template.kind {
            StatusKind::Stun => OutcomeFlags::STUN,
            StatusKind::DamageOverTime => OutcomeFlags::DOT,
            StatusKind::Shield => OutcomeFlags::SHIELD,
            _ => OutcomeFlags::empty(),
        };
        outcome.flags |= if template.is_debuff {
            OutcomeFlags::DEBUFF
        } else {
            OutcomeFlags::BUFF
        };
    }

    Some(outcome)
}

fn deal_ability_damage(
    ctx: &mut ResolveContext<'_>,
    caster_id: ActorId,
    ability: &Ability,
    target_id: ActorId,
    stats: &CombatStats,
    outcome: &mut TargetOutcome,
) {
    let base = {
        let (Some(caster), Some(target)) = (ctx.state.actor(caster_id), ctx.state.actor(target_id))
        else {
            return;
        };
        let scaling: Option<Arc<dyn DamageScaling>> =
            match ctx.passives.damage_override(caster, target, ability) {
                Some((rule, scaling)) => {
                    tracing::debug!(
                        target: "arena::passives",
                        rule,
                        scaling = scaling.name(),
                        "damage override installed"
                    );
                    Some(scaling)
                }
                None => ability.scaling.clone(),
            };
        match scaling {
            Some(scaling) => scaling.base_damage(caster, target, ability),
            None => ability.damage as i32,
        }
    };
    if base < 0 {
        let violation = InvariantViolation::NegativeDamage {
            target: target_id,
            amount: base,
        };
        tracing::warn!(target: "arena::combat", %violation, "damage step aborted");
        return;
    }

    let mut amount = scale(base as u32, stats.damage_multiplier);
    let crit_roll = ctx.rng.roll_unit();
    if amount > 0 && check_crit(stats.crit_rate, crit_roll) {
        amount = scale(amount, stats.crit_damage);
        ctx.events.emit(BattleEvent::CriticalHit {
            source: caster_id,
            target: target_id,
            multiplier: stats.crit_damage,
        });
        outcome.flags |= OutcomeFlags::CRIT;
    }

    let mut incoming = IncomingDamage {
        target: target_id,
        source: Some(caster_id),
        amount: amount as i32,
        category: ability.damage_category,
    };
    let passives = ctx.passives;
    passives.run_incoming_damage(&mut incoming, &mut ctx.passive_context());

    let Some(target) = ctx.state.actor_mut(target_id) else {
        return;
    };
    match target.take_damage(incoming.amount, incoming.category, Some(caster_id), ctx.events) {
        Ok(dealt) => {
            outcome.damage = dealt;
            outcome.flags |= OutcomeFlags::DAMAGE;
            if target.is_dead {
                outcome.flags |= OutcomeFlags::KILL;
            }
        }
        Err(violation) => {
            tracing::warn!(target: "arena::combat", %violation, "damage step aborted");
        }
    }
}

fn bookkeep(
    ctx: &mut ResolveContext<'_>,
    caster_id: ActorId,
    ability: &Ability,
    targets: &[TargetOutcome],
) -> u32 {
    let Some(caster) = ctx.state.actor_mut(caster_id) else {
        return 0;
    };
    if let Some(slot) = caster.ability_mut(ability.category) {
        slot.start_cooldown();
    }
    caster.has_acted = true;

    if ability.category.is_signature() {
        let charge = caster.charge;
        caster.reduce_charge(charge, ctx.events);
        0
    } else {
        let gained: u32 = targets.iter().map(TargetOutcome::effect_value).sum();
        caster.increase_charge(gained, ctx.events);
        gained
    }
}
