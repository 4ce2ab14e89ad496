//! Built-in archetype passive rules.
//!
//! Data files attach rules to archetypes through [`RuleSpec`]; the
//! [`build_registry`] table maps each archetype id to the rules it carries,
//! so every {archetype → hooks} registration is visible in one place.

use std::sync::Arc;

use arena_core::combat::{ResolutionOutcome, mitigate};
use arena_core::state::MissingHpScaling;
use arena_core::{
    Ability, Actor, ActorId, DamageCategory, DamageScaling, EffectDuration, IncomingDamage,
    PassiveContext, PassiveHooks, PassiveRegistry, PassiveRule, StatusKind, StatusTemplate,
};

use crate::roster::Roster;

/// Data-file form of a built-in rule.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RuleSpec {
    /// Once per battle, a fatal hit leaves the owner at 1 HP.
    SurviveFatalHit,
    /// Heal a fraction of max HP at each round start.
    Regeneration { percent: f32 },
    /// Gain signature charge at each of the owner's turn starts.
    ChargeTrickle { amount: u32 },
    /// Damage multiplier buff when an ally falls.
    Enrage { magnitude: f32, turns: i32 },
    /// Permanent resistance granted at game start. `None` covers every category.
    Bulwark {
        category: Option<DamageCategory>,
        amount: f32,
    },
    /// Incoming hits of `category` with base damage below `below` deal nothing.
    Ward { category: DamageCategory, below: u32 },
    /// The owner's attacks scale with the owner's missing HP.
    Executioner { ratio: f32 },
    /// Heal the owner for a fraction of the damage its abilities deal.
    Lifesteal { ratio: f32 },
}

impl RuleSpec {
    pub fn build(self) -> Arc<dyn PassiveRule> {
        match self {
            Self::SurviveFatalHit => Arc::new(SurviveFatalHit),
            Self::Regeneration { percent } => Arc::new(Regeneration { percent }),
            Self::ChargeTrickle { amount } => Arc::new(ChargeTrickle { amount }),
            Self::Enrage { magnitude, turns } => Arc::new(Enrage { magnitude, turns }),
            Self::Bulwark { category, amount } => Arc::new(Bulwark { category, amount }),
            Self::Ward { category, below } => Arc::new(Ward { category, below }),
            Self::Executioner { ratio } => Arc::new(Executioner { ratio }),
            Self::Lifesteal { ratio } => Arc::new(Lifesteal { ratio }),
        }
    }
}

/// Register every archetype's rules.
pub fn build_registry(roster: &Roster) -> PassiveRegistry {
    let mut registry = PassiveRegistry::new();
    for record in &roster.archetypes {
        for spec in &record.rules {
            registry.register(record.archetype(), spec.build());
        }
    }
    tracing::debug!(target: "arena::passives", rules = registry.len(), "passive table built");
    registry
}

// ============================================================================
// Rules
// ============================================================================

pub struct SurviveFatalHit;

impl PassiveRule for SurviveFatalHit {
    fn name(&self) -> &'static str {
        "survive_fatal_hit"
    }

    fn hooks(&self) -> PassiveHooks {
        PassiveHooks::INCOMING_DAMAGE
    }

    /// Runs after other incoming-damage rules have shaped the hit.
    fn priority(&self) -> i32 {
        100
    }

    fn on_incoming_damage(
        &self,
        owner: ActorId,
        hit: &mut IncomingDamage,
        ctx: &mut PassiveContext<'_>,
    ) {
        let Some(actor) = ctx.state.actor_mut(owner) else {
            return;
        };
        if actor.used_one_time_passive || hit.amount <= 0 {
            return;
        }
        let pool = actor.hp + actor.shield;
        let landed = mitigate(hit.amount as u32, hit.category, actor.resistance(hit.category));
        if landed < pool {
            return;
        }
        actor.used_one_time_passive = true;
        hit.amount = pool.saturating_sub(1) as i32;
        hit.category = DamageCategory::True;
        ctx.announce(owner, self.name());
    }
}

pub struct Regeneration {
    pub percent: f32,
}

impl PassiveRule for Regeneration {
    fn name(&self) -> &'static str {
        "regeneration"
    }

    fn hooks(&self) -> PassiveHooks {
        PassiveHooks::ROUND_START
    }

    fn on_round_start(&self, owner: ActorId, _round: u32, ctx: &mut PassiveContext<'_>) {
        let Some(actor) = ctx.actor(owner) else {
            return;
        };
        if actor.hp >= actor.max_hp {
            return;
        }
        let amount = (actor.max_hp as f32 * self.percent).round() as u32;
        if ctx.heal(owner, amount, Some(owner)) > 0 {
            ctx.announce(owner, self.name());
        }
    }
}

pub struct ChargeTrickle {
    pub amount: u32,
}

impl PassiveRule for ChargeTrickle {
    fn name(&self) -> &'static str {
        "charge_trickle"
    }

    fn hooks(&self) -> PassiveHooks {
        PassiveHooks::TURN_START
    }

    fn on_turn_start(&self, owner: ActorId, ctx: &mut PassiveContext<'_>) {
        ctx.grant_charge(owner, self.amount);
    }
}

pub struct Enrage {
    pub magnitude: f32,
    pub turns: i32,
}

impl PassiveRule for Enrage {
    fn name(&self) -> &'static str {
        "enrage"
    }

    fn hooks(&self) -> PassiveHooks {
        PassiveHooks::CHARACTER_DEATH
    }

    fn on_character_death(&self, owner: ActorId, dead: ActorId, ctx: &mut PassiveContext<'_>) {
        let Some(actor) = ctx.actor(owner) else {
            return;
        };
        if owner == dead || !actor.is_alive() || !actor.allies.contains(&dead) {
            return;
        }
        let fury = StatusTemplate::new(
            "Fury",
            StatusKind::DamageMultiplier,
            EffectDuration::Turns(self.turns),
            self.magnitude,
        );
        if ctx.apply_status(owner, &fury, Some(owner)).is_some() {
            ctx.announce(owner, self.name());
        }
    }
}

pub struct Bulwark {
    pub category: Option<DamageCategory>,
    pub amount: f32,
}

impl PassiveRule for Bulwark {
    fn name(&self) -> &'static str {
        "bulwark"
    }

    fn hooks(&self) -> PassiveHooks {
        PassiveHooks::GAME_START
    }

    fn on_game_start(&self, owner: ActorId, ctx: &mut PassiveContext<'_>) {
        let mut template = StatusTemplate::new(
            "Bulwark",
            StatusKind::Resistance,
            EffectDuration::Permanent,
            self.amount,
        );
        if let Some(category) = self.category {
            template = template.with_category(category);
        }
        ctx.apply_status(owner, &template, Some(owner));
    }
}

pub struct Ward {
    pub category: DamageCategory,
    pub below: u32,
}

impl PassiveRule for Ward {
    fn name(&self) -> &'static str {
        "ward"
    }

    fn hooks(&self) -> PassiveHooks {
        PassiveHooks::DAMAGE_OVERRIDE
    }

    fn damage_override(
        &self,
        owner: ActorId,
        _caster: &Actor,
        target: &Actor,
        ability: &Ability,
    ) -> Option<Arc<dyn DamageScaling>> {
        let blocked = target.id == owner
            && ability.damage_category == self.category
            && ability.damage < self.below;
        blocked.then(|| Arc::new(Nullified) as Arc<dyn DamageScaling>)
    }
}

/// Scaling that reduces any hit to zero.
struct Nullified;

impl DamageScaling for Nullified {
    fn name(&self) -> &'static str {
        "nullified"
    }

    fn base_damage(&self, _caster: &Actor, _target: &Actor, _ability: &Ability) -> i32 {
        0
    }
}

pub struct Executioner {
    pub ratio: f32,
}

impl PassiveRule for Executioner {
    fn name(&self) -> &'static str {
        "executioner"
    }

    fn hooks(&self) -> PassiveHooks {
        PassiveHooks::DAMAGE_OVERRIDE
    }

    fn damage_override(
        &self,
        owner: ActorId,
        caster: &Actor,
        _target: &Actor,
        _ability: &Ability,
    ) -> Option<Arc<dyn DamageScaling>> {
        (caster.id == owner)
            .then(|| Arc::new(MissingHpScaling { ratio: self.ratio }) as Arc<dyn DamageScaling>)
    }
}

pub struct Lifesteal {
    pub ratio: f32,
}

impl PassiveRule for Lifesteal {
    fn name(&self) -> &'static str {
        "lifesteal"
    }

    fn hooks(&self) -> PassiveHooks {
        PassiveHooks::ABILITY_RESOLVED
    }

    fn on_ability_resolved(
        &self,
        owner: ActorId,
        outcome: &ResolutionOutcome,
        ctx: &mut PassiveContext<'_>,
    ) {
        let dealt: u32 = outcome.targets.iter().map(|t| t.damage).sum();
        let amount = (dealt as f32 * self.ratio).round() as u32;
        if amount > 0 && ctx.heal(owner, amount, Some(owner)) > 0 {
            ctx.announce(owner, self.name());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_core::{
        AbilityCategory, ArchetypeId, Battle, BattleConfig, BattleEvent, ScriptedRng,
        TargetingMode, TeamId, Topic,
    };

    const HOME: ActorId = ActorId(0);
    const AWAY: ActorId = ActorId(1);

    fn fighter(archetype: u16, team: TeamId, hp: u32, speed: f32, damage: u32) -> Actor {
        Actor::new(format!("f{archetype}"), ArchetypeId(archetype), team, hp)
            .with_speed(speed)
            .with_ability(
                Ability::new("Hit", AbilityCategory::Normal, TargetingMode::Enemy)
                    .with_damage(damage, DamageCategory::Physical),
            )
    }

    fn battle(actors: Vec<Actor>, registry: PassiveRegistry) -> Battle {
        Battle::builder(actors)
            .config(BattleConfig::default().without_attrition())
            .passives(registry)
            .rng(ScriptedRng::constant(0.5))
            .build()
            .unwrap()
    }

    fn registry(archetype: u16, spec: RuleSpec) -> PassiveRegistry {
        PassiveRegistry::new().with_rule(ArchetypeId(archetype), spec.build())
    }

    #[test]
    fn survive_fatal_hit_leaves_one_hp_once() {
        let mut battle = battle(
            vec![fighter(1, TeamId::HOME, 100, 20.0, 500), fighter(2, TeamId::AWAY, 50, 1.0, 1)],
            registry(2, RuleSpec::SurviveFatalHit),
        );
        battle.start_battle().unwrap();
        battle
            .use_ability(HOME, AbilityCategory::Normal, &[AWAY])
            .unwrap();
        let survivor = battle.actor(AWAY).unwrap();
        assert_eq!(survivor.hp, 1);
        assert!(survivor.used_one_time_passive);

        battle.skip_turn(AWAY).unwrap();
        battle
            .use_ability(HOME, AbilityCategory::Normal, &[AWAY])
            .unwrap();
        assert!(battle.actor(AWAY).unwrap().is_dead);
    }

    #[test]
    fn regeneration_heals_at_round_start() {
        let mut victim = fighter(2, TeamId::AWAY, 100, 1.0, 1);
        victim.hp = 50;
        let mut battle = battle(
            vec![fighter(1, TeamId::HOME, 100, 20.0, 1), victim],
            registry(2, RuleSpec::Regeneration { percent: 0.1 }),
        );
        battle.start_battle().unwrap();
        assert_eq!(battle.actor(AWAY).unwrap().hp, 60);
        assert!(battle.log().iter().any(|e| matches!(
            e,
            BattleEvent::PassiveTriggered { rule, .. } if rule == "regeneration"
        )));
    }

    #[test]
    fn charge_trickle_fires_on_own_turn_only() {
        let mut battle = battle(
            vec![fighter(1, TeamId::HOME, 100, 20.0, 1), fighter(2, TeamId::AWAY, 100, 1.0, 1)],
            registry(2, RuleSpec::ChargeTrickle { amount: 7 }),
        );
        battle.start_battle().unwrap();
        assert_eq!(battle.actor(AWAY).unwrap().charge, 0);
        battle
            .use_ability(HOME, AbilityCategory::Normal, &[AWAY])
            .unwrap();
        assert_eq!(battle.actor(AWAY).unwrap().charge, 7);
    }

    #[test]
    fn enrage_buffs_the_surviving_ally() {
        let actors = vec![
            fighter(1, TeamId::HOME, 100, 20.0, 30),
            fighter(2, TeamId::AWAY, 10, 1.0, 1),
            fighter(3, TeamId::AWAY, 100, 2.0, 1),
        ];
        let mut battle = battle(actors, registry(3, RuleSpec::Enrage { magnitude: 0.5, turns: 2 }));
        battle.start_battle().unwrap();
        battle
            .use_ability(HOME, AbilityCategory::Normal, &[AWAY])
            .unwrap();

        let ally = battle.actor(ActorId(2)).unwrap();
        assert!((ally.damage_multiplier() - 1.5).abs() < 1e-6);
    }

    #[test]
    fn bulwark_grants_permanent_resistance_at_game_start() {
        let mut battle = battle(
            vec![fighter(1, TeamId::HOME, 100, 20.0, 20), fighter(2, TeamId::AWAY, 100, 1.0, 1)],
            registry(
                2,
                RuleSpec::Bulwark {
                    category: Some(DamageCategory::Physical),
                    amount: 0.5,
                },
            ),
        );
        battle.start_battle().unwrap();
        battle
            .use_ability(HOME, AbilityCategory::Normal, &[AWAY])
            .unwrap();
        assert_eq!(battle.actor(AWAY).unwrap().hp, 90);
    }

    #[test]
    fn ward_blocks_weak_hits_of_its_category() {
        let mut battle = battle(
            vec![fighter(1, TeamId::HOME, 100, 20.0, 8), fighter(2, TeamId::AWAY, 100, 1.0, 1)],
            registry(
                2,
                RuleSpec::Ward {
                    category: DamageCategory::Physical,
                    below: 10,
                },
            ),
        );
        battle.start_battle().unwrap();
        let report = battle
            .use_ability(HOME, AbilityCategory::Normal, &[AWAY])
            .unwrap();
        assert_eq!(report.outcome.targets[0].damage, 0);
        assert_eq!(battle.actor(AWAY).unwrap().hp, 100);
    }

    #[test]
    fn executioner_scales_with_own_missing_hp() {
        let mut caster = fighter(1, TeamId::HOME, 100, 20.0, 10);
        caster.hp = 40;
        let mut battle = battle(
            vec![caster, fighter(2, TeamId::AWAY, 200, 1.0, 1)],
            registry(1, RuleSpec::Executioner { ratio: 0.5 }),
        );
        battle.start_battle().unwrap();
        battle
            .use_ability(HOME, AbilityCategory::Normal, &[AWAY])
            .unwrap();
        // 10 + 0.5 × 60
        assert_eq!(battle.actor(AWAY).unwrap().hp, 160);
    }

    #[test]
    fn lifesteal_heals_from_damage_dealt() {
        let mut caster = fighter(1, TeamId::HOME, 100, 20.0, 40);
        caster.hp = 50;
        let mut battle = battle(
            vec![caster, fighter(2, TeamId::AWAY, 200, 1.0, 1)],
            registry(1, RuleSpec::Lifesteal { ratio: 0.25 }),
        );
        battle.start_battle().unwrap();
        battle
            .use_ability(HOME, AbilityCategory::Normal, &[AWAY])
            .unwrap();
        assert_eq!(battle.actor(HOME).unwrap().hp, 60);
        assert_eq!(
            battle
                .log()
                .iter()
                .filter(|e| e.topic() == Topic::PassiveTriggered)
                .count(),
            1
        );
    }
}
