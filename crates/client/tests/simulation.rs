use std::path::PathBuf;

use arena_client::{Simulation, Strategy, Verdict};
use arena_content::{ContentFactory, MatchConfig};
use arena_core::{Battle, BattleEvent, TeamId};
use arena_runtime::{AbilityCommand, ActorView, BattleSnapshot, Host, RandRng};

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data")
}

fn hosted(config: &MatchConfig) -> Host {
    let factory = ContentFactory::new(data_dir());
    let roster = factory.load_roster().unwrap();
    let (actors, passives) = config.assemble(&roster).unwrap();
    let battle = Battle::builder(actors)
        .config(config.battle.clone())
        .passives(passives)
        .rng(RandRng::seeded(config.seed))
        .build()
        .unwrap();
    Host::builder(battle).spawn()
}

fn exhibition() -> MatchConfig {
    let mut config = ContentFactory::new(data_dir()).load_match().unwrap();
    config.battle.stun_skip_delay_ms = 0;
    config
}

struct Pacifist;

impl Strategy for Pacifist {
    fn choose(&self, _: &BattleSnapshot, _: &ActorView) -> Option<AbilityCommand> {
        None
    }

    fn name(&self) -> &'static str {
        "Pacifist"
    }
}

#[tokio::test]
async fn exhibition_match_runs_to_a_verdict() {
    let config = exhibition();
    let host = hosted(&config);
    let outcome = Simulation::builder(host.handle())
        .max_rounds(config.max_rounds)
        .build()
        .run()
        .await
        .unwrap();
    host.shutdown().await.unwrap();

    let report = &outcome.report;
    assert_eq!(report.events, outcome.log.len());
    assert!(matches!(outcome.log.first(), Some(BattleEvent::GameStarted { actors: 6 })));
    assert!(report.actors.iter().any(|a| a.abilities_used > 0));

    if let Verdict::Victory { team } = report.verdict {
        let loser = if team == TeamId::HOME.0 { TeamId::AWAY } else { TeamId::HOME };
        assert!(report.team(loser).all(|a| !a.alive));
        assert!(report.team(TeamId(team)).any(|a| a.alive));
        assert!(outcome.log.contains(&BattleEvent::GameEnded { winner: Some(TeamId(team)) }));
    }
}

#[tokio::test]
async fn same_seed_replays_the_same_battle() {
    let config = exhibition().with_seed(99);
    let mut logs = Vec::new();
    for _ in 0..2 {
        let host = hosted(&config);
        let outcome = Simulation::builder(host.handle())
            .max_rounds(Some(8))
            .build()
            .run()
            .await
            .unwrap();
        host.shutdown().await.unwrap();
        logs.push(outcome.log);
    }
    assert_eq!(logs[0], logs[1]);
}

#[tokio::test]
async fn passing_every_turn_hits_the_round_cap() {
    let config = exhibition();
    let host = hosted(&config);
    let outcome = Simulation::builder(host.handle())
        .strategy(Pacifist)
        .max_rounds(Some(2))
        .build()
        .run()
        .await
        .unwrap();
    host.shutdown().await.unwrap();

    assert_eq!(outcome.report.verdict, Verdict::Draw);
    assert_eq!(outcome.report.rounds, 2);
    assert!(outcome.report.actors.iter().all(|a| a.abilities_used == 0));
}
