//! Archetype-keyed passive rule table.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{IncomingDamage, PassiveContext, PassiveHooks, PassiveRule};
use crate::combat::ResolutionOutcome;
use crate::state::{Ability, Actor, ActorId, ArchetypeId, DamageScaling};

/// Registry mapping archetypes to the rules they carry.
///
/// Rules within an archetype run in priority order (lower first), then in
/// registration order. Actors are visited in id order, so dispatch is
/// deterministic.
#[derive(Clone, Default)]
pub struct PassiveRegistry {
    rules: BTreeMap<ArchetypeId, Vec<Arc<dyn PassiveRule>>>,
}

impl PassiveRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, archetype: ArchetypeId, rule: Arc<dyn PassiveRule>) -> &mut Self {
        let rules = self.rules.entry(archetype).or_default();
        rules.push(rule);
        rules.sort_by_key(|r| r.priority());
        self
    }

    pub fn with_rule(mut self, archetype: ArchetypeId, rule: Arc<dyn PassiveRule>) -> Self {
        self.register(archetype, rule);
        self
    }

    /// Union of hooks declared by the archetype's rules.
    pub fn hooks_for(&self, archetype: ArchetypeId) -> PassiveHooks {
        self.rules
            .get(&archetype)
            .map(|rules| rules.iter().fold(PassiveHooks::empty(), |acc, r| acc | r.hooks()))
            .unwrap_or_default()
    }

    /// The {archetype → hooks} table, for inspection and tests.
    pub fn table(&self) -> impl Iterator<Item = (ArchetypeId, PassiveHooks)> + '_ {
        self.rules.keys().map(|&archetype| (archetype, self.hooks_for(archetype)))
    }

    pub fn rule_names(&self, archetype: ArchetypeId) -> Vec<&'static str> {
        self.rules
            .get(&archetype)
            .map(|rules| rules.iter().map(|r| r.name()).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn rules_with(
        &self,
        archetype: ArchetypeId,
        hook: PassiveHooks,
    ) -> impl Iterator<Item = &Arc<dyn PassiveRule>> {
        self.rules
            .get(&archetype)
            .into_iter()
            .flatten()
            .filter(move |r| r.hooks().contains(hook))
    }

    /// `(owner, archetype)` for living actors whose archetype declares `hook`.
    fn owners(&self, ctx: &PassiveContext<'_>, hook: PassiveHooks) -> Vec<(ActorId, ArchetypeId)> {
        ctx.state
            .actors()
            .iter()
            .filter(|a| a.is_alive() && self.hooks_for(a.archetype).contains(hook))
            .map(|a| (a.id, a.archetype))
            .collect()
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    pub fn run_game_start(&self, ctx: &mut PassiveContext<'_>) {
        for (owner, archetype) in self.owners(ctx, PassiveHooks::GAME_START) {
            for rule in self.rules_with(archetype, PassiveHooks::GAME_START) {
                rule.on_game_start(owner, ctx);
            }
        }
    }

    pub fn run_round_start(&self, round: u32, ctx: &mut PassiveContext<'_>) {
        for (owner, archetype) in self.owners(ctx, PassiveHooks::ROUND_START) {
            for rule in self.rules_with(archetype, PassiveHooks::ROUND_START) {
                if ctx.actor(owner).is_some_and(Actor::is_alive) {
                    rule.on_round_start(owner, round, ctx);
                }
            }
        }
    }

    pub fn run_turn_start(&self, owner: ActorId, ctx: &mut PassiveContext<'_>) {
        let Some(archetype) = ctx.actor(owner).filter(|a| a.is_alive()).map(|a| a.archetype) else {
            return;
        };
        for rule in self.rules_with(archetype, PassiveHooks::TURN_START) {
            rule.on_turn_start(owner, ctx);
        }
    }

    /// Notify every standing owner and the fallen actor itself.
    pub fn run_character_death(&self, dead: ActorId, ctx: &mut PassiveContext<'_>) {
        let mut owners = self.owners(ctx, PassiveHooks::CHARACTER_DEATH);
        if let Some(fallen) = ctx.actor(dead)
            && self.hooks_for(fallen.archetype).contains(PassiveHooks::CHARACTER_DEATH)
        {
            owners.push((fallen.id, fallen.archetype));
            owners.sort_by_key(|(id, _)| *id);
            owners.dedup_by_key(|(id, _)| *id);
        }
        for (owner, archetype) in owners {
            for rule in self.rules_with(archetype, PassiveHooks::CHARACTER_DEATH) {
                rule.on_character_death(owner, dead, ctx);
            }
        }
    }

    /// Let the target's rules rewrite damage about to hit it.
    pub fn run_incoming_damage(&self, hit: &mut IncomingDamage, ctx: &mut PassiveContext<'_>) {
        let Some(archetype) = ctx.actor(hit.target).filter(|a| a.is_alive()).map(|a| a.archetype)
        else {
            return;
        };
        for rule in self.rules_with(archetype, PassiveHooks::INCOMING_DAMAGE) {
            rule.on_incoming_damage(hit.target, hit, ctx);
        }
    }

    /// First override offered by the target's rules, then the caster's.
    pub fn damage_override(
        &self,
        caster: &Actor,
        target: &Actor,
        ability: &Ability,
    ) -> Option<(&'static str, Arc<dyn DamageScaling>)> {
        [target, caster].into_iter().find_map(|owner| {
            self.rules_with(owner.archetype, PassiveHooks::DAMAGE_OVERRIDE)
                .find_map(|rule| {
                    rule.damage_override(owner.id, caster, target, ability)
                        .map(|scaling| (rule.name(), scaling))
                })
        })
    }

    pub fn run_ability_resolved(&self, outcome: &ResolutionOutcome, ctx: &mut PassiveContext<'_>) {
        let Some(archetype) = ctx.actor(outcome.caster).map(|a| a.archetype) else {
            return;
        };
        for rule in self.rules_with(archetype, PassiveHooks::ABILITY_RESOLVED) {
            rule.on_ability_resolved(outcome.caster, outcome, ctx);
        }
    }
}

impl std::fmt::Debug for PassiveRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (archetype, rules) in &self.rules {
            let names: Vec<&str> = rules.iter().map(|r| r.name()).collect();
            map.entry(archetype, &names);
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::DamageCategory;
    use crate::config::BattleConfig;
    use crate::events::{Emitter, Topic};
    use crate::rng::ScriptedRng;
    use crate::state::{BattleState, TeamId};

    struct Regen;

    impl PassiveRule for Regen {
        fn name(&self) -> &'static str {
            "regen"
        }

        fn hooks(&self) -> PassiveHooks {
            PassiveHooks::ROUND_START
        }

        fn on_round_start(&self, owner: ActorId, _round: u32, ctx: &mut PassiveContext<'_>) {
            ctx.heal(owner, 5, Some(owner));
        }
    }

    struct Avenger;

    impl PassiveRule for Avenger {
        fn name(&self) -> &'static str {
            "avenger"
        }

        fn hooks(&self) -> PassiveHooks {
            PassiveHooks::CHARACTER_DEATH
        }

        fn on_character_death(&self, owner: ActorId, dead: ActorId, ctx: &mut PassiveContext<'_>) {
            let ally = ctx.actor(owner).is_some_and(|a| a.allies.contains(&dead));
            if ally {
                ctx.grant_charge(owner, 50);
                ctx.announce(owner, self.name());
            }
        }
    }

    fn state() -> BattleState {
        let mut a = Actor::new("a", ArchetypeId(1), TeamId::HOME, 100);
        a.hp = 50;
        BattleState::new(vec![
            a,
            Actor::new("b", ArchetypeId(2), TeamId::HOME, 100),
            Actor::new("c", ArchetypeId(3), TeamId::AWAY, 100),
        ])
        .unwrap()
    }

    #[test]
    fn only_declared_hooks_are_dispatched() {
        let registry = PassiveRegistry::new()
            .with_rule(ArchetypeId(1), Arc::new(Regen))
            .with_rule(ArchetypeId(2), Arc::new(Avenger));

        assert_eq!(registry.hooks_for(ArchetypeId(1)), PassiveHooks::ROUND_START);
        assert_eq!(registry.hooks_for(ArchetypeId(2)), PassiveHooks::CHARACTER_DEATH);
        assert_eq!(registry.hooks_for(ArchetypeId(9)), PassiveHooks::empty());

        let mut state = state();
        let mut events = Emitter::new();
        let mut rng = ScriptedRng::constant(0.0);
        let config = BattleConfig::default();
        let mut ctx = PassiveContext {
            state: &mut state,
            events: &mut events,
            rng: &mut rng,
            config: &config,
        };
        registry.run_round_start(1, &mut ctx);
        registry.run_turn_start(ActorId(0), &mut ctx);
        assert_eq!(state.actor(ActorId(0)).map(|a| a.hp), Some(55));
    }

    #[test]
    fn death_hook_reacts_to_ally_only() {
        let registry = PassiveRegistry::new().with_rule(ArchetypeId(2), Arc::new(Avenger));
        let mut state = state();
        let mut events = Emitter::new();
        let mut rng = ScriptedRng::constant(0.0);
        let config = BattleConfig::default();
        let mut ctx = PassiveContext {
            state: &mut state,
            events: &mut events,
            rng: &mut rng,
            config: &config,
        };

        ctx.deal_damage(ActorId(2), 500, DamageCategory::True, None);
        registry.run_character_death(ActorId(2), &mut ctx);
        assert_eq!(ctx.actor(ActorId(1)).map(|a| a.charge), Some(0));

        ctx.deal_damage(ActorId(0), 500, DamageCategory::True, None);
        registry.run_character_death(ActorId(0), &mut ctx);
        assert_eq!(ctx.actor(ActorId(1)).map(|a| a.charge), Some(50));
        assert!(events.iter().any(|e| e.topic() == Topic::PassiveTriggered));
    }
}
