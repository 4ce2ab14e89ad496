//! Authoritative battle state.
//!
//! This module owns the actor roster and turn bookkeeping. Runtime layers
//! clone or query this state but mutate it exclusively through the battle.
mod error;
pub mod types;

pub use error::StateError;
pub use types::{
    Abilities, Ability, AbilityCategory, AbilitySlots, Actor, ActorId, ArchetypeId,
    BaseStats, DamageScaling, DebuffCountScaling, EffectDuration, EffectId, MissingHpScaling,
    StatusEffect, StatusEffects, StatusKind, StatusTemplate, TargetingMode, TeamId,
    TurnInstruction, TurnPhase, TurnState,
};

use crate::config::BattleConfig;

/// Canonical state of one battle.
#[derive(Clone, Debug)]
pub struct BattleState {
    /// Indexed by [`ActorId::index`].
    actors: Vec<Actor>,
    pub turn: TurnState,
    /// Monotonic effect instance allocator. Never reused.
    next_effect_id: u64,
}

impl BattleState {
    /// Assembles a battle from actors in roster order.
    ///
    /// Ids are assigned densely from 0 and ally/enemy sets are populated
    /// here, once; neither changes for the rest of the battle.
    pub fn new(mut actors: Vec<Actor>) -> Result<Self, StateError> {
        if actors.is_empty() {
            return Err(StateError::NoActors);
        }
        for actor in &actors {
            if actor.team.index() >= BattleConfig::MAX_TEAMS {
                return Err(StateError::TeamOutOfRange {
                    name: actor.name.clone(),
                    team: actor.team,
                    max: BattleConfig::MAX_TEAMS,
                });
            }
            if actor.max_hp == 0 {
                return Err(StateError::ZeroMaxHp {
                    name: actor.name.clone(),
                });
            }
        }
        for team in [TeamId::HOME, TeamId::AWAY] {
            if !actors.iter().any(|a| a.team == team) {
                return Err(StateError::EmptyTeam { team });
            }
        }

        for (index, actor) in actors.iter_mut().enumerate() {
            actor.id = ActorId(index as u32);
            actor.hp = actor.hp.min(actor.max_hp);
        }
        let roster: Vec<(ActorId, TeamId)> = actors.iter().map(|a| (a.id, a.team)).collect();
        for actor in &mut actors {
            actor.allies = roster
                .iter()
                .filter(|(id, team)| *team == actor.team && *id != actor.id)
                .map(|(id, _)| *id)
                .collect();
            actor.enemies = roster
                .iter()
                .filter(|(_, team)| *team != actor.team)
                .map(|(id, _)| *id)
                .collect();
        }

        Ok(Self {
            actors,
            turn: TurnState::new(),
            next_effect_id: 1,
        })
    }

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(id.index())
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(id.index())
    }

    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    pub fn actors_mut(&mut self) -> impl Iterator<Item = &mut Actor> {
        self.actors.iter_mut()
    }

    pub fn actor_ids(&self) -> impl Iterator<Item = ActorId> + '_ {
        self.actors.iter().map(|a| a.id)
    }

    pub fn team(&self, team: TeamId) -> impl Iterator<Item = &Actor> {
        self.actors.iter().filter(move |a| a.team == team)
    }

    pub fn living(&self, team: TeamId) -> impl Iterator<Item = &Actor> {
        self.team(team).filter(|a| a.is_alive())
    }

    pub fn team_defeated(&self, team: TeamId) -> bool {
        self.team(team).all(|a| a.is_dead)
    }

    /// True once at least one side has been wiped out.
    pub fn is_decided(&self) -> bool {
        self.team_defeated(TeamId::HOME) || self.team_defeated(TeamId::AWAY)
    }

    /// The winning team of a decided battle.
    ///
    /// A simultaneous wipe goes to the side that did not act last, and has no
    /// winner when nobody has acted yet.
    pub fn winner(&self) -> Option<TeamId> {
        let home_down = self.team_defeated(TeamId::HOME);
        let away_down = self.team_defeated(TeamId::AWAY);
        match (home_down, away_down) {
            (true, false) => Some(TeamId::AWAY),
            (false, true) => Some(TeamId::HOME),
            (true, true) => self.turn.last_team.map(TeamId::opponent),
            (false, false) => None,
        }
    }

    pub fn current_actor(&self) -> Option<&Actor> {
        self.turn.current.and_then(|id| self.actor(id))
    }

    pub fn allocate_effect_id(&mut self) -> EffectId {
        let id = EffectId(self.next_effect_id);
        self.next_effect_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(name: &str, team: TeamId) -> Actor {
        Actor::new(name, ArchetypeId(0), team, 100)
    }

    #[test]
    fn assigns_dense_ids_and_relations_once() {
        let state = BattleState::new(vec![
            actor("a", TeamId::HOME),
            actor("b", TeamId::AWAY),
            actor("c", TeamId::HOME),
        ])
        .unwrap();

        let a = state.actor(ActorId(0)).unwrap();
        assert_eq!(a.allies, vec![ActorId(2)]);
        assert_eq!(a.enemies, vec![ActorId(1)]);
        let b = state.actor(ActorId(1)).unwrap();
        assert!(b.allies.is_empty());
        assert_eq!(b.enemies, vec![ActorId(0), ActorId(2)]);
    }

    #[test]
    fn double_wipe_goes_to_the_side_that_did_not_act_last() {
        let mut state =
            BattleState::new(vec![actor("a", TeamId::HOME), actor("b", TeamId::AWAY)]).unwrap();
        assert!(!state.is_decided());

        for actor in state.actors_mut() {
            actor.hp = 0;
            actor.is_dead = true;
        }
        assert!(state.is_decided());
        assert_eq!(state.winner(), None);

        state.turn.last_team = Some(TeamId::AWAY);
        assert_eq!(state.winner(), Some(TeamId::HOME));
    }

    #[test]
    fn rejects_one_sided_battles() {
        let err = BattleState::new(vec![actor("a", TeamId::HOME)]).unwrap_err();
        assert_eq!(err, StateError::EmptyTeam { team: TeamId::AWAY });
    }

    #[test]
    fn effect_ids_are_never_reused() {
        let mut state =
            BattleState::new(vec![actor("a", TeamId::HOME), actor("b", TeamId::AWAY)]).unwrap();
        let first = state.allocate_effect_id();
        let second = state.allocate_effect_id();
        assert_ne!(first, second);
    }
}
