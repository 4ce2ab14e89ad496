use std::time::Duration;

use tokio::sync::broadcast;

use arena_core::{
    Ability, AbilityCategory, Actor, ActorId, ArchetypeId, Battle, BattleConfig, BattleError,
    BattleEvent, DamageCategory, EffectDuration, ResolveError, ScriptedRng, SkipReason, StatusKind,
    StatusTemplate, TargetingMode, TeamId, TurnError, TurnStartOutcome,
};
use arena_runtime::replication::encode;
use arena_runtime::{
    AbilityCommand, ClientMessage, Host, HostConfig, HostHandle, HostMessage, ObserverMirror,
    Reply, RuntimeError, SkipTurnCommand,
};

const HERO: ActorId = ActorId(0);
const BRUTE: ActorId = ActorId(1);

fn battle(brute_hp: u32) -> Battle {
    let hero = Actor::new("Hero", ArchetypeId(1), TeamId::HOME, 100)
        .with_speed(20.0)
        .with_ability(
            Ability::new("Strike", AbilityCategory::Normal, TargetingMode::Enemy)
                .with_damage(25, DamageCategory::Physical),
        )
        .with_ability(
            Ability::new("Concuss", AbilityCategory::Skill, TargetingMode::Enemy)
                .with_damage(5, DamageCategory::Physical)
                .with_cooldown(3)
                .with_effect(
                    StatusTemplate::new("Dazed", StatusKind::Stun, EffectDuration::Turns(1), 0.0)
                        .debuff(),
                ),
        );
    let brute = Actor::new("Brute", ArchetypeId(2), TeamId::AWAY, brute_hp)
        .with_speed(5.0)
        .with_ability(
            Ability::new("Slam", AbilityCategory::Normal, TargetingMode::Enemy)
                .with_damage(10, DamageCategory::Physical),
        );
    Battle::builder(vec![hero, brute])
        .config(BattleConfig::default().without_attrition())
        .rng(ScriptedRng::constant(0.5))
        .build()
        .unwrap()
}

fn strike() -> AbilityCommand {
    AbilityCommand::new(HERO, AbilityCategory::Normal, &[BRUTE])
}

/// Drain everything currently queued on the receiver.
fn drain(rx: &mut broadcast::Receiver<HostMessage>) -> Vec<HostMessage> {
    let mut messages = Vec::new();
    while let Ok(message) = rx.try_recv() {
        messages.push(message);
    }
    messages
}

async fn wait_for<F>(rx: &mut broadcast::Receiver<HostMessage>, mut predicate: F) -> HostMessage
where
    F: FnMut(&HostMessage) -> bool,
{
    loop {
        let message = rx.recv().await.unwrap();
        if predicate(&message) {
            return message;
        }
    }
}

fn spawn(battle: Battle) -> (Host, HostHandle, broadcast::Receiver<HostMessage>) {
    let host = Host::builder(battle).spawn();
    let handle = host.handle();
    let rx = handle.subscribe();
    (host, handle, rx)
}

#[tokio::test]
async fn resolved_ability_replicates_events_and_snapshot() {
    let (host, handle, mut rx) = spawn(battle(200));
    let first = handle.start().await.unwrap();
    assert_eq!(first, TurnStartOutcome::AwaitingAction { actor: HERO });

    let report = handle.use_ability(strike()).await.unwrap();
    assert_eq!(report.outcome.targets[0].damage, 25);
    assert_eq!(report.next, TurnStartOutcome::AwaitingAction { actor: BRUTE });

    let mut mirror = ObserverMirror::new(Some(TeamId::AWAY));
    for message in drain(&mut rx) {
        mirror.receive(&encode(&message).unwrap());
    }
    assert!(mirror.stats().replays >= 1);
    assert_eq!(mirror.stats().dropped, 0);

    let mirrored = mirror.snapshot().unwrap();
    assert_eq!(mirrored.actor(BRUTE.0).unwrap().hp, 175);
    assert!(mirror.is_my_turn());
    assert_eq!(mirror.my_actor().unwrap().name, "Brute");

    let live = handle.snapshot().await.unwrap();
    assert_eq!(&live, mirrored);

    drop(handle);
    host.shutdown().await.unwrap();
}

#[tokio::test]
async fn unresolvable_command_is_rejected_without_state_change() {
    let (_host, handle, mut rx) = spawn(battle(200));
    handle.start().await.unwrap();
    drain(&mut rx);
    let before = handle.snapshot().await.unwrap();

    let bogus = AbilityCommand {
        caster_id: 42,
        ability_category: AbilityCategory::Normal,
        target_ids: vec![1],
    };
    let err = handle.use_ability(bogus).await.unwrap_err();
    assert!(matches!(err, RuntimeError::UnresolvedCaster(42)));

    let out_of_turn = AbilityCommand::new(BRUTE, AbilityCategory::Normal, &[HERO]);
    let err = handle.use_ability(out_of_turn).await.unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Battle(BattleError::Resolve(ResolveError::NotCastersTurn(_)))
    ));

    // an unknown caster never becomes valid; an out-of-turn caster may
    let messages = drain(&mut rx);
    let retryable: Vec<bool> = messages
        .iter()
        .filter_map(|m| match m {
            HostMessage::Rejected { retryable, .. } => Some(*retryable),
            _ => None,
        })
        .collect();
    assert_eq!(messages.len(), 2);
    assert_eq!(retryable, vec![false, true]);
    assert_eq!(handle.snapshot().await.unwrap(), before);
}

#[tokio::test(start_paused = true)]
async fn stunned_turn_is_skipped_after_delay() {
    let (_host, handle, mut rx) = spawn(battle(200));
    handle.start().await.unwrap();

    let concuss = AbilityCommand::new(HERO, AbilityCategory::Skill, &[BRUTE]);
    let report = handle.use_ability(concuss).await.unwrap();
    assert_eq!(
        report.next,
        TurnStartOutcome::Stunned {
            actor: BRUTE,
            delay_ms: BattleConfig::DEFAULT_STUN_SKIP_DELAY_MS,
        }
    );

    let started = tokio::time::Instant::now();
    wait_for(&mut rx, |message| {
        matches!(message, HostMessage::Snapshot(s) if s.round == 2 && s.current_actor == Some(HERO.0))
    })
    .await;
    assert!(started.elapsed() >= Duration::from_millis(BattleConfig::DEFAULT_STUN_SKIP_DELAY_MS));

    let log = handle.log().await.unwrap();
    assert!(log.contains(&BattleEvent::TurnSkipped {
        actor: BRUTE,
        reason: SkipReason::Stunned,
    }));
}

#[tokio::test]
async fn manual_skip_and_wire_submission() {
    let config = HostConfig {
        auto_skip_stunned: false,
        ..HostConfig::default()
    };
    let host = Host::builder(battle(200)).config(config).spawn();
    let handle = host.handle();
    handle.start().await.unwrap();

    let reply = handle
        .submit_bytes(&encode(&ClientMessage::SkipTurn(SkipTurnCommand::current())).unwrap())
        .await
        .unwrap();
    assert_eq!(
        reply,
        Reply::Turn(TurnStartOutcome::AwaitingAction { actor: BRUTE })
    );

    let err = handle.submit_bytes(&[9, 9]).await.unwrap_err();
    assert!(matches!(err, RuntimeError::Codec(_)));

    let reply = handle.submit(ClientMessage::RequestSnapshot).await.unwrap();
    let Reply::Snapshot(snapshot) = reply else {
        panic!("expected a snapshot reply");
    };
    assert_eq!(snapshot.current_actor, Some(BRUTE.0));
}

#[tokio::test]
async fn held_advance_waits_for_release() {
    let (host, handle, mut rx) = spawn(battle(200));
    handle.start().await.unwrap();
    assert!(handle.hold_advance().await.unwrap());
    assert!(!handle.hold_advance().await.unwrap());

    let report = handle.use_ability(strike()).await.unwrap();
    assert_eq!(report.next, TurnStartOutcome::Deferred);
    let held = handle.snapshot().await.unwrap();
    assert!(!held.is_turn_of(TeamId::AWAY));
    assert_eq!(held.actor(BRUTE.0).unwrap().hp, 175);
    drain(&mut rx);

    let released = handle.release_advance().await.unwrap();
    assert_eq!(released, Some(TurnStartOutcome::AwaitingAction { actor: BRUTE }));
    let messages = drain(&mut rx);
    assert!(messages.iter().any(
        |m| matches!(m, HostMessage::Snapshot(snapshot) if snapshot.is_turn_of(TeamId::AWAY))
    ));

    let err = handle.release_advance().await.unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Battle(BattleError::Turn(TurnError::NotLocked))
    ));

    drop(handle);
    host.shutdown().await.unwrap();
}

#[tokio::test]
async fn lethal_blow_ends_the_battle() {
    let (_host, handle, mut rx) = spawn(battle(20));
    handle.start().await.unwrap();
    let report = handle.use_ability(strike()).await.unwrap();
    assert_eq!(
        report.next,
        TurnStartOutcome::BattleOver {
            winner: Some(TeamId::HOME)
        }
    );

    let ended = wait_for(&mut rx, |m| matches!(m, HostMessage::BattleEnded { .. })).await;
    assert_eq!(ended, HostMessage::BattleEnded { winner: Some(0) });

    let err = handle.use_ability(strike()).await.unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Battle(BattleError::Resolve(ResolveError::BattleOver))
    ));
    assert!(handle.snapshot().await.unwrap().is_over());
}
