//! Match setup: which archetypes fight on which side, under which rules.

use arena_core::{Actor, BattleConfig, PassiveRegistry, TeamId};

use crate::roster::{Roster, RosterError};
use crate::rules::build_registry;

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum MatchError {
    #[error(transparent)]
    Roster(#[from] RosterError),

    #[error("{0} has no members")]
    EmptyTeam(TeamId),
}

/// Team compositions by archetype key plus battle overrides.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchConfig {
    #[cfg_attr(feature = "serde", serde(default))]
    pub seed: u64,
    pub home: Vec<String>,
    pub away: Vec<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub battle: BattleConfig,
    /// Rounds after which a runner calls the battle a draw.
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_rounds: Option<u32>,
}

impl MatchConfig {
    pub fn new(home: Vec<String>, away: Vec<String>) -> Self {
        Self {
            home,
            away,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Spawn both teams (home first) and build the passive table for the roster.
    pub fn assemble(&self, roster: &Roster) -> Result<(Vec<Actor>, PassiveRegistry), MatchError> {
        roster.validate()?;
        let mut actors = Vec::with_capacity(self.home.len() + self.away.len());
        for (team, keys) in [(TeamId::HOME, &self.home), (TeamId::AWAY, &self.away)] {
            if keys.is_empty() {
                return Err(MatchError::EmptyTeam(team));
            }
            for key in keys {
                actors.push(roster.spawn(key, team)?);
            }
        }
        tracing::debug!(
            target: "arena::content",
            home = self.home.len(),
            away = self.away.len(),
            seed = self.seed,
            "match assembled"
        );
        Ok((actors, build_registry(roster)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::{ArchetypeRecord, MoveRecord, ResistanceRecord};
    use crate::rules::RuleSpec;

    fn roster() -> Roster {
        let record = |key: &str, id: u16, rules: Vec<RuleSpec>| ArchetypeRecord {
            key: key.into(),
            id,
            name: key.into(),
            hp: 100,
            speed: 10.0,
            charge_required: 100,
            resistances: ResistanceRecord::default(),
            accuracy: 1.0,
            dodge: 0.0,
            crit_rate: 0.0,
            passive: MoveRecord::named("P"),
            normal: MoveRecord::named("N"),
            skill: MoveRecord::named("S"),
            signature: MoveRecord::named("X"),
            rules,
        };
        Roster {
            archetypes: vec![
                record("knight", 1, vec![RuleSpec::SurviveFatalHit]),
                record("mage", 2, Vec::new()),
            ],
        }
    }

    #[test]
    fn assemble_orders_home_before_away() {
        let config = MatchConfig::new(
            vec!["knight".into(), "mage".into()],
            vec!["mage".into()],
        );
        let (actors, registry) = config.assemble(&roster()).unwrap();
        let teams: Vec<TeamId> = actors.iter().map(|a| a.team).collect();
        assert_eq!(teams, vec![TeamId::HOME, TeamId::HOME, TeamId::AWAY]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn assemble_rejects_empty_side_and_unknown_key() {
        let config = MatchConfig::new(vec!["knight".into()], Vec::new());
        assert_eq!(
            config.assemble(&roster()).unwrap_err(),
            MatchError::EmptyTeam(TeamId::AWAY)
        );

        let config = MatchConfig::new(vec!["ghost".into()], vec!["mage".into()]);
        assert_eq!(
            config.assemble(&roster()).unwrap_err(),
            MatchError::Roster(RosterError::UnknownArchetype("ghost".into()))
        );
    }
}
