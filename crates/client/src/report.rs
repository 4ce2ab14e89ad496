//! End-of-match summary built from the battle log.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use arena_core::{BattleEvent, TeamId};
use arena_runtime::BattleSnapshot;

/// How the run stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Victory { team: u8 },
    /// Both sides fell at once.
    MutualDefeat,
    /// The round cap was hit with both sides standing.
    Draw,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ActorTally {
    pub id: u32,
    pub name: String,
    pub team_id: u8,
    pub hp: u32,
    pub max_hp: u32,
    pub alive: bool,
    pub damage_dealt: u64,
    pub damage_taken: u64,
    pub healing_done: u64,
    pub kills: u32,
    pub abilities_used: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MatchReport {
    pub verdict: Verdict,
    pub rounds: u32,
    pub actors: Vec<ActorTally>,
    /// Fusion labels in the order they fired.
    pub fusions: Vec<String>,
    pub events: usize,
}

impl MatchReport {
    /// Tally `log` against the final `snapshot`.
    pub fn build(snapshot: &BattleSnapshot, log: &[BattleEvent], draw: bool) -> Self {
        let mut tallies: BTreeMap<u32, ActorTally> = snapshot
            .actors
            .iter()
            .map(|actor| {
                let tally = ActorTally {
                    id: actor.id,
                    name: actor.name.clone(),
                    team_id: actor.team_id,
                    hp: actor.hp,
                    max_hp: actor.max_hp,
                    alive: !actor.is_dead,
                    ..ActorTally::default()
                };
                (actor.id, tally)
            })
            .collect();
        let mut fusions = Vec::new();

        for event in log {
            match event {
                BattleEvent::DamageDealt {
                    source,
                    target,
                    amount,
                    ..
                } => {
                    if let Some(tally) = source.and_then(|id| tallies.get_mut(&id.0)) {
                        tally.damage_dealt += u64::from(*amount);
                    }
                    if let Some(tally) = tallies.get_mut(&target.0) {
                        tally.damage_taken += u64::from(*amount);
                    }
                }
                BattleEvent::Healed { source, amount, .. } => {
                    if let Some(tally) = source.and_then(|id| tallies.get_mut(&id.0)) {
                        tally.healing_done += u64::from(*amount);
                    }
                }
                BattleEvent::CharacterDied {
                    killer: Some(killer),
                    ..
                } => {
                    if let Some(tally) = tallies.get_mut(&killer.0) {
                        tally.kills += 1;
                    }
                }
                BattleEvent::AbilityResolved { caster, .. } => {
                    if let Some(tally) = tallies.get_mut(&caster.0) {
                        tally.abilities_used += 1;
                    }
                }
                BattleEvent::FusionTriggered { team, fusion } => {
                    fusions.push(format!("{} ({})", fusion.label(), team));
                }
                _ => {}
            }
        }

        let verdict = match snapshot.winner {
            Some(team) => Verdict::Victory { team },
            None if draw => Verdict::Draw,
            None => Verdict::MutualDefeat,
        };
        Self {
            verdict,
            rounds: snapshot.round,
            actors: tallies.into_values().collect(),
            fusions,
            events: log.len(),
        }
    }

    pub fn team(&self, team: TeamId) -> impl Iterator<Item = &ActorTally> {
        self.actors.iter().filter(move |a| a.team_id == team.0)
    }
}

impl fmt::Display for MatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.verdict {
            Verdict::Victory { team } => writeln!(f, "{} wins after {} rounds", TeamId(team), self.rounds)?,
            Verdict::MutualDefeat => writeln!(f, "mutual defeat after {} rounds", self.rounds)?,
            Verdict::Draw => writeln!(f, "draw after {} rounds", self.rounds)?,
        }
        for team in [TeamId::HOME, TeamId::AWAY] {
            writeln!(f, "{team}:")?;
            for a in self.team(team) {
                writeln!(
                    f,
                    "  {:<12} {:>4}/{:<4} {:<5} dealt {:>5}  taken {:>5}  healed {:>5}  kills {}",
                    a.name,
                    a.hp,
                    a.max_hp,
                    if a.alive { "" } else { "dead" },
                    a.damage_dealt,
                    a.damage_taken,
                    a.healing_done,
                    a.kills,
                )?;
            }
        }
        if !self.fusions.is_empty() {
            writeln!(f, "fusions: {}", self.fusions.join(", "))?;
        }
        write!(f, "{} events", self.events)
    }
}
