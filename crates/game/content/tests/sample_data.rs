//! The shipped sample data must load and produce a playable battle.

use std::path::PathBuf;

use arena_content::ContentFactory;
use arena_core::{AbilityCategory, Battle, TurnStartOutcome};

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../../data")
}

#[test]
fn sample_match_assembles_into_a_battle() {
    let factory = ContentFactory::new(data_dir());
    let (config, actors, passives) = factory.assemble().unwrap();
    assert_eq!(actors.len(), config.home.len() + config.away.len());
    for actor in &actors {
        assert_eq!(actor.abilities.len(), 4, "{} lacks a move slot", actor.name);
        assert!(actor.ability(AbilityCategory::Passive).is_some());
    }
    assert!(!passives.is_empty());

    let mut battle = Battle::builder(actors)
        .config(config.battle.clone())
        .passives(passives)
        .seed(config.seed)
        .build()
        .unwrap();
    let first = battle.start_battle().unwrap();
    assert!(matches!(
        first,
        TurnStartOutcome::AwaitingAction { .. } | TurnStartOutcome::Stunned { .. }
    ));
    assert_eq!(battle.round(), 1);
}

#[test]
fn every_archetype_rule_is_registered() {
    let roster = ContentFactory::new(data_dir()).load_roster().unwrap();
    let passives = arena_content::build_registry(&roster);
    for record in &roster.archetypes {
        assert_eq!(
            passives.rule_names(record.archetype()).len(),
            record.rules.len(),
            "{}",
            record.key
        );
    }
}
