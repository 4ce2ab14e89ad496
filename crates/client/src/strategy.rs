//! Action selection for AI-controlled actors.
//!
//! Strategies read only the replicated [`BattleSnapshot`], the same view a
//! remote player would have, and answer with a wire-level command.

use arena_core::{AbilityCategory, ActorId, TargetingMode};
use arena_runtime::{AbilityCommand, AbilityView, ActorView, BattleSnapshot};

/// Picks what the current actor does on its turn.
///
/// Implementations must be deterministic for a given snapshot.
pub trait Strategy: Send + Sync {
    /// The command to submit, or `None` to pass the turn.
    fn choose(&self, snapshot: &BattleSnapshot, actor: &ActorView) -> Option<AbilityCommand>;

    /// Returns the strategy name for debugging and logging.
    fn name(&self) -> &'static str;
}

/// Health as a whole percentage of max.
pub fn health_percentage(actor: &ActorView) -> u32 {
    if actor.max_hp == 0 {
        return 0;
    }
    ((u64::from(actor.hp) * 100) / u64::from(actor.max_hp)) as u32
}

/// Uses the strongest usable ability, aimed where it hurts most.
///
/// **Behavior:**
/// - Tries Signature, then Skill, then Normal; the first usable one with a
///   valid target wins
/// - Hostile abilities go to the enemy with the lowest HP%
/// - Supportive abilities go to the weakest ally; revivers prefer the fallen
/// - Ties break on actor id order
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyStrategy;

impl GreedyStrategy {
    const PRIORITY: [AbilityCategory; 3] = [
        AbilityCategory::Signature,
        AbilityCategory::Skill,
        AbilityCategory::Normal,
    ];

    fn targets(snapshot: &BattleSnapshot, actor: &ActorView, ability: &AbilityView) -> Vec<u32> {
        let enemies = || {
            snapshot
                .actors
                .iter()
                .filter(|other| other.team_id != actor.team_id && !other.is_dead)
        };
        let allies = |include_self: bool| {
            snapshot.actors.iter().filter(move |other| {
                other.team_id == actor.team_id && (include_self || other.id != actor.id)
            })
        };

        let mut picked: Vec<&ActorView> = match ability.targeting {
            TargetingMode::SelfOnly => vec![actor],
            TargetingMode::Enemy | TargetingMode::All => weakest_first(enemies()),
            TargetingMode::Ally | TargetingMode::AllyOrSelf => {
                let include_self = ability.targeting == TargetingMode::AllyOrSelf;
                let fallen: Vec<_> = allies(include_self).filter(|a| a.is_dead).collect();
                if ability.revives && !fallen.is_empty() {
                    fallen
                } else {
                    weakest_first(allies(include_self).filter(|a| !a.is_dead))
                }
            }
        };
        if ability.max_targets > 0 {
            picked.truncate(usize::from(ability.max_targets));
        }
        picked.iter().map(|view| view.id).collect()
    }
}

fn weakest_first<'a>(actors: impl Iterator<Item = &'a ActorView>) -> Vec<&'a ActorView> {
    let mut actors: Vec<_> = actors.collect();
    actors.sort_by_key(|view| (health_percentage(view), view.id));
    actors
}

impl Strategy for GreedyStrategy {
    fn choose(&self, snapshot: &BattleSnapshot, actor: &ActorView) -> Option<AbilityCommand> {
        Self::PRIORITY.iter().find_map(|&category| {
            let ability = actor.ability(category).filter(|a| a.is_usable)?;
            let targets = Self::targets(snapshot, actor, ability);
            if targets.is_empty() {
                return None;
            }
            let targets: Vec<ActorId> = targets.into_iter().map(ActorId).collect();
            Some(AbilityCommand::new(ActorId(actor.id), category, &targets))
        })
    }

    fn name(&self) -> &'static str {
        "Greedy"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_core::TurnPhase;

    fn ability(category: AbilityCategory, targeting: TargetingMode, usable: bool) -> AbilityView {
        AbilityView {
            name: category.to_string(),
            category,
            targeting,
            max_targets: 1,
            revives: false,
            current_cooldown: if usable { 0 } else { 2 },
            base_cooldown: 2,
            is_usable: usable,
        }
    }

    fn view(id: u32, team_id: u8, hp: u32, abilities: Vec<AbilityView>) -> ActorView {
        ActorView {
            id,
            name: format!("actor-{id}"),
            team_id,
            hp,
            max_hp: 100,
            shield: 0,
            sig_charge: 0,
            sig_charge_required: 100,
            is_dead: hp == 0,
            is_stunned: false,
            status_effects: Vec::new(),
            abilities,
        }
    }

    fn snapshot(actors: Vec<ActorView>) -> BattleSnapshot {
        BattleSnapshot {
            sequence: 1,
            round: 1,
            phase: TurnPhase::AwaitingAction,
            current_actor: Some(0),
            current_team: Some(0),
            winner: None,
            turn_order: actors.iter().map(|a| a.id).collect(),
            actors,
            digest: String::new(),
        }
    }

    #[test]
    fn prefers_strongest_usable_ability_on_weakest_enemy() {
        let hero = view(
            0,
            0,
            100,
            vec![
                ability(AbilityCategory::Normal, TargetingMode::Enemy, true),
                ability(AbilityCategory::Skill, TargetingMode::Enemy, true),
                ability(AbilityCategory::Signature, TargetingMode::Enemy, false),
            ],
        );
        let state = snapshot(vec![
            hero.clone(),
            view(1, 1, 70, Vec::new()),
            view(2, 1, 0, Vec::new()),
            view(3, 1, 40, Vec::new()),
        ]);

        let command = GreedyStrategy.choose(&state, &hero).unwrap();
        assert_eq!(command.ability_category, AbilityCategory::Skill);
        assert_eq!(command.target_ids, vec![3]);
    }

    #[test]
    fn support_abilities_target_weakest_or_fallen_allies() {
        let mut revive = ability(AbilityCategory::Skill, TargetingMode::Ally, true);
        revive.revives = true;
        let healer = view(
            0,
            0,
            30,
            vec![
                ability(AbilityCategory::Normal, TargetingMode::AllyOrSelf, true),
                revive,
            ],
        );
        let mut state = snapshot(vec![
            healer.clone(),
            view(1, 0, 0, Vec::new()),
            view(2, 0, 60, Vec::new()),
            view(3, 1, 10, Vec::new()),
        ]);

        let command = GreedyStrategy.choose(&state, &healer).unwrap();
        assert_eq!(command.ability_category, AbilityCategory::Skill);
        assert_eq!(command.target_ids, vec![1]);

        // nobody to revive: the reviver falls back to the weakest living ally
        state.actors[1] = view(1, 0, 90, Vec::new());
        let command = GreedyStrategy.choose(&state, &healer).unwrap();
        assert_eq!(command.target_ids, vec![2]);
    }

    #[test]
    fn passes_when_nothing_is_usable() {
        let idle = view(
            0,
            0,
            100,
            vec![ability(AbilityCategory::Normal, TargetingMode::Enemy, false)],
        );
        let state = snapshot(vec![idle.clone(), view(1, 1, 50, Vec::new())]);
        assert!(GreedyStrategy.choose(&state, &idle).is_none());
    }
}
