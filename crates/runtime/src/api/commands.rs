//! ID-indexed command DTOs and their hydration against live state.
//!
//! Observers never hold actor handles. They send plain integer ids; the
//! host resolves them before anything reaches the battle. A command that
//! fails to hydrate is rejected without touching state.

use serde::{Deserialize, Serialize};

use arena_core::{AbilityCategory, ActorId, Battle};

use super::errors::{Result, RuntimeError};

/// Request to use one of the caster's abilities.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityCommand {
    pub caster_id: u32,
    pub ability_category: AbilityCategory,
    pub target_ids: Vec<u32>,
}

/// Request to end a turn without acting. `None` means the current actor.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipTurnCommand {
    pub character_id: Option<u32>,
}

/// An ability command with every id resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HydratedAbility {
    pub caster: ActorId,
    pub category: AbilityCategory,
    /// Resolved targets in request order; unresolved ids are dropped.
    pub targets: Vec<ActorId>,
}

impl AbilityCommand {
    pub fn new(caster: ActorId, category: AbilityCategory, targets: &[ActorId]) -> Self {
        Self {
            caster_id: caster.0,
            ability_category: category,
            target_ids: targets.iter().map(|id| id.0).collect(),
        }
    }

    pub fn hydrate(&self, battle: &Battle) -> Result<HydratedAbility> {
        let caster = ActorId(self.caster_id);
        let actor = battle
            .actor(caster)
            .ok_or(RuntimeError::UnresolvedCaster(self.caster_id))?;
        if actor.ability(self.ability_category).is_none() {
            return Err(RuntimeError::MissingAbility {
                caster: self.caster_id,
                category: self.ability_category,
            });
        }

        let targets: Vec<ActorId> = self
            .target_ids
            .iter()
            .map(|&id| ActorId(id))
            .filter(|&id| battle.actor(id).is_some())
            .collect();
        if targets.is_empty() {
            return Err(RuntimeError::UnresolvedTargets(self.target_ids.clone()));
        }

        Ok(HydratedAbility {
            caster,
            category: self.ability_category,
            targets,
        })
    }
}

impl SkipTurnCommand {
    pub fn current() -> Self {
        Self::default()
    }

    pub fn actor(actor: ActorId) -> Self {
        Self {
            character_id: Some(actor.0),
        }
    }

    pub fn hydrate(&self, battle: &Battle) -> Result<ActorId> {
        match self.character_id {
            Some(id) => battle
                .actor(ActorId(id))
                .map(|actor| actor.id)
                .ok_or(RuntimeError::UnresolvedActor(id)),
            None => battle.current_actor().ok_or(RuntimeError::NoCurrentActor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_core::{Ability, Actor, ArchetypeId, TargetingMode, TeamId};

    fn battle() -> Battle {
        let actor = |team| {
            Actor::new("A", ArchetypeId(1), team, 50).with_ability(Ability::new(
                "Jab",
                AbilityCategory::Normal,
                TargetingMode::Enemy,
            ))
        };
        Battle::builder(vec![actor(TeamId::HOME), actor(TeamId::AWAY)])
            .build()
            .unwrap()
    }

    #[test]
    fn hydration_drops_unknown_targets() {
        let command = AbilityCommand {
            caster_id: 0,
            ability_category: AbilityCategory::Normal,
            target_ids: vec![9, 1],
        };
        let hydrated = command.hydrate(&battle()).unwrap();
        assert_eq!(hydrated.caster, ActorId(0));
        assert_eq!(hydrated.targets, vec![ActorId(1)]);
    }

    #[test]
    fn hydration_rejects_bad_caster_ability_and_targets() {
        let battle = battle();
        let mut command = AbilityCommand::new(ActorId(7), AbilityCategory::Normal, &[ActorId(1)]);
        assert!(matches!(
            command.hydrate(&battle),
            Err(RuntimeError::UnresolvedCaster(7))
        ));

        command.caster_id = 0;
        command.ability_category = AbilityCategory::Signature;
        assert!(matches!(
            command.hydrate(&battle),
            Err(RuntimeError::MissingAbility { caster: 0, .. })
        ));

        command.ability_category = AbilityCategory::Normal;
        command.target_ids = vec![5, 6];
        assert!(matches!(
            command.hydrate(&battle),
            Err(RuntimeError::UnresolvedTargets(ids)) if ids == vec![5, 6]
        ));
    }

    #[test]
    fn empty_skip_means_current_actor() {
        let mut battle = battle();
        assert!(matches!(
            SkipTurnCommand::current().hydrate(&battle),
            Err(RuntimeError::NoCurrentActor)
        ));
        battle.start_battle().unwrap();
        let current = battle.current_actor().unwrap();
        assert_eq!(SkipTurnCommand::current().hydrate(&battle).unwrap(), current);
        assert!(matches!(
            SkipTurnCommand { character_id: Some(40) }.hydrate(&battle),
            Err(RuntimeError::UnresolvedActor(40))
        ));
    }
}
