//! Drives a hosted battle to completion with AI-controlled seats.
//!
//! Each team gets its own [`ObserverMirror`] fed from the host's wire
//! bytes, so seats decide from exactly what a remote player would see.
//! A spectator mirror narrates replicated highlights into the log.

use anyhow::{Result, bail};
use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::{debug, info, warn};

use arena_core::{ActorId, BattleEvent, TeamId, Topic};
use arena_runtime::replication::encode;
use arena_runtime::{
    ActorView, BattleSnapshot, HostHandle, HostMessage, ObserverMirror, ReplicatedEvent,
    SkipTurnCommand,
};

use crate::report::MatchReport;
use crate::strategy::{GreedyStrategy, Strategy};

const NARRATED: [Topic; 4] = [
    Topic::CharacterDied,
    Topic::CharacterRevived,
    Topic::FusionTriggered,
    Topic::MomentumSwing,
];

/// A finished run: summary plus the authoritative event log.
#[derive(Debug, Serialize)]
pub struct Outcome {
    pub report: MatchReport,
    pub log: Vec<BattleEvent>,
}

pub struct Simulation<S = GreedyStrategy> {
    handle: HostHandle,
    inbox: broadcast::Receiver<HostMessage>,
    seats: Vec<ObserverMirror>,
    spectator: ObserverMirror,
    highlights: Vec<broadcast::Receiver<ReplicatedEvent>>,
    strategy: S,
    max_rounds: Option<u32>,
}

impl Simulation<GreedyStrategy> {
    pub fn builder(handle: HostHandle) -> SimulationBuilder<GreedyStrategy> {
        SimulationBuilder {
            handle,
            strategy: GreedyStrategy,
            max_rounds: None,
        }
    }
}

pub struct SimulationBuilder<S> {
    handle: HostHandle,
    strategy: S,
    max_rounds: Option<u32>,
}

impl<S: Strategy> SimulationBuilder<S> {
    pub fn strategy<T: Strategy>(self, strategy: T) -> SimulationBuilder<T> {
        SimulationBuilder {
            handle: self.handle,
            strategy,
            max_rounds: self.max_rounds,
        }
    }

    /// Call the battle a draw once this many rounds have been played.
    pub fn max_rounds(mut self, max_rounds: Option<u32>) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn build(self) -> Simulation<S> {
        let inbox = self.handle.subscribe();
        let mut spectator = ObserverMirror::new(None);
        let highlights = NARRATED
            .iter()
            .map(|&topic| spectator.subscribe(topic))
            .collect();
        Simulation {
            handle: self.handle,
            inbox,
            seats: vec![
                ObserverMirror::new(Some(TeamId::HOME)),
                ObserverMirror::new(Some(TeamId::AWAY)),
            ],
            spectator,
            highlights,
            strategy: self.strategy,
            max_rounds: self.max_rounds,
        }
    }
}

impl<S: Strategy> Simulation<S> {
    /// Start the battle and play until it ends or hits the round cap.
    pub async fn run(mut self) -> Result<Outcome> {
        info!(target: "arena::sim", strategy = self.strategy.name(), "starting battle");
        let first = self.handle.start().await?;
        debug!(target: "arena::sim", ?first, "battle started");

        loop {
            self.pump()?;
            let Some(snapshot) = self.spectator.snapshot().cloned() else {
                self.wait().await?;
                continue;
            };
            if snapshot.is_over() {
                return self.finish(&snapshot, false).await;
            }
            if let Some(cap) = self.max_rounds
                && snapshot.round > cap
            {
                info!(target: "arena::sim", cap, "round cap reached");
                return self.finish(&snapshot, true).await;
            }

            let Some(actor) = self.seats.iter().find_map(|seat| seat.my_actor()).cloned() else {
                self.wait().await?;
                continue;
            };
            if actor.is_stunned {
                // the host skips stunned turns on its own timer
                self.wait().await?;
                continue;
            }
            self.take_turn(&snapshot, &actor).await?;
        }
    }

    async fn take_turn(&mut self, snapshot: &BattleSnapshot, actor: &ActorView) -> Result<()> {
        let Some(command) = self.strategy.choose(snapshot, actor) else {
            debug!(target: "arena::sim", actor = %actor.name, "nothing usable, passing");
            self.handle
                .skip_turn(SkipTurnCommand::actor(ActorId(actor.id)))
                .await?;
            return Ok(());
        };

        let category = command.ability_category;
        match self.handle.use_ability(command).await {
            Ok(report) => {
                info!(
                    target: "arena::sim",
                    actor = %actor.name,
                    %category,
                    hits = report.outcome.targets.len(),
                    damage = report.outcome.targets.iter().map(|t| t.damage).sum::<u32>(),
                    "acted"
                );
            }
            Err(error) => {
                // a rejection changes nothing; pass so the battle keeps moving
                warn!(target: "arena::sim", actor = %actor.name, %error, "command rejected, passing");
                self.handle
                    .skip_turn(SkipTurnCommand::actor(ActorId(actor.id)))
                    .await?;
            }
        }
        Ok(())
    }

    /// Deliver everything already queued.
    fn pump(&mut self) -> Result<()> {
        loop {
            match self.inbox.try_recv() {
                Ok(message) => self.deliver(&message)?,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Lagged(missed)) => {
                    warn!(target: "arena::sim", missed, "host messages lagged");
                }
                Err(TryRecvError::Closed) => bail!("host closed its broadcast channel"),
            }
        }
        self.narrate();
        Ok(())
    }

    /// Block until the host says something.
    async fn wait(&mut self) -> Result<()> {
        match self.inbox.recv().await {
            Ok(message) => self.deliver(&message),
            Err(RecvError::Lagged(missed)) => {
                warn!(target: "arena::sim", missed, "host messages lagged");
                Ok(())
            }
            Err(RecvError::Closed) => bail!("host closed its broadcast channel"),
        }
    }

    fn deliver(&mut self, message: &HostMessage) -> Result<()> {
        let bytes = encode(message)?;
        for seat in &mut self.seats {
            seat.receive(&bytes);
        }
        self.spectator.receive(&bytes);
        Ok(())
    }

    fn narrate(&mut self) {
        let names = self.spectator.snapshot();
        let name = |id: Option<u32>| {
            id.and_then(|id| names.and_then(|s| s.actor(id)))
                .map_or_else(|| "someone".to_owned(), |a| a.name.clone())
        };
        for feed in &mut self.highlights {
            while let Ok(envelope) = feed.try_recv() {
                match envelope.topic() {
                    Some(Topic::CharacterDied) => {
                        info!(target: "arena::sim", "{} fell", name(envelope.target_id));
                    }
                    Some(Topic::CharacterRevived) => {
                        info!(target: "arena::sim", "{} was revived", name(envelope.target_id));
                    }
                    Some(Topic::FusionTriggered) => {
                        info!(target: "arena::sim", team = ?envelope.team_id, fusion = envelope.text.as_deref().unwrap_or_default(), "fusion");
                    }
                    Some(Topic::MomentumSwing) => {
                        info!(target: "arena::sim", team = ?envelope.team_id, "momentum swings");
                    }
                    _ => {}
                }
            }
        }
    }

    async fn finish(self, snapshot: &BattleSnapshot, draw: bool) -> Result<Outcome> {
        let log = self.handle.log().await?;
        let mut report = MatchReport::build(snapshot, &log, draw);
        if draw && let Some(cap) = self.max_rounds {
            report.rounds = cap;
        }
        info!(
            target: "arena::sim",
            verdict = ?report.verdict,
            rounds = report.rounds,
            events = log.len(),
            "battle finished"
        );
        Ok(Outcome { report, log })
    }
}
