//! Host worker that owns the authoritative [`arena_core::Battle`].
//!
//! Receives commands from [`HostHandle`](crate::HostHandle), runs them
//! against the battle, and broadcasts whitelisted events plus a fresh
//! snapshot after every state change. Stunned turns are skipped by the
//! worker itself once the configured presentation delay has elapsed.

use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, error, info, trace, warn};

use arena_core::{ActionReport, ActorId, Battle, BattleEvent, GameError, Topic, TurnStartOutcome};

use crate::api::{AbilityCommand, Result, RuntimeError, SkipTurnCommand};
use crate::replication::{BattleSnapshot, HostMessage, Replicator};

/// Commands that can be sent to the host worker.
pub enum Command {
    Start {
        reply: oneshot::Sender<Result<TurnStartOutcome>>,
    },
    UseAbility {
        command: AbilityCommand,
        reply: oneshot::Sender<Result<ActionReport>>,
    },
    SkipTurn {
        command: SkipTurnCommand,
        reply: oneshot::Sender<Result<TurnStartOutcome>>,
    },
    /// Hold turn advances until `ReleaseAdvance`; replies false if already held.
    HoldAdvance {
        reply: oneshot::Sender<bool>,
    },
    ReleaseAdvance {
        reply: oneshot::Sender<Result<Option<TurnStartOutcome>>>,
    },
    QuerySnapshot {
        reply: oneshot::Sender<Result<BattleSnapshot>>,
    },
    QueryLog {
        reply: oneshot::Sender<Vec<BattleEvent>>,
    },
}

/// A stunned turn waiting out its presentation delay.
#[derive(Clone, Copy, Debug)]
struct PendingSkip {
    actor: ActorId,
    at: Instant,
}

pub struct HostWorker {
    battle: Battle,
    command_rx: mpsc::Receiver<Command>,
    outbound: broadcast::Sender<HostMessage>,
    replicator: Replicator,
    auto_skip_stunned: bool,
    /// Sequence number of the last snapshot sent.
    sequence: u64,
    /// Battle log position already replicated.
    log_mark: usize,
    announced_end: bool,
    pending_skip: Option<PendingSkip>,
}

impl HostWorker {
    pub fn new(
        battle: Battle,
        command_rx: mpsc::Receiver<Command>,
        outbound: broadcast::Sender<HostMessage>,
        replicator: Replicator,
        auto_skip_stunned: bool,
    ) -> Self {
        info!(
            target: "runtime::host",
            actors = battle.state().actors().len(),
            "host worker initialized"
        );
        let log_mark = battle.log().len();
        Self {
            battle,
            command_rx,
            outbound,
            replicator,
            auto_skip_stunned,
            sequence: 0,
            log_mark,
            announced_end: false,
            pending_skip: None,
        }
    }

    /// Main worker loop. Ends once every command sender is dropped.
    pub async fn run(mut self) {
        loop {
            let deadline = self.pending_skip.map(|pending| pending.at);
            tokio::select! {
                command = self.command_rx.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.run_pending_skip();
                }
            }
        }
        debug!(target: "runtime::host", "command channel closed, host worker exiting");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Start { reply } => {
                let result = self.start();
                if reply.send(result).is_err() {
                    debug!(target: "runtime::host", "Start reply channel closed (caller dropped)");
                }
            }
            Command::UseAbility { command, reply } => {
                let result = self.use_ability(&command);
                if reply.send(result).is_err() {
                    debug!(target: "runtime::host", "UseAbility reply channel closed (caller dropped)");
                }
            }
            Command::SkipTurn { command, reply } => {
                let result = self.skip_turn(&command);
                if reply.send(result).is_err() {
                    debug!(target: "runtime::host", "SkipTurn reply channel closed (caller dropped)");
                }
            }
            Command::HoldAdvance { reply } => {
                let acquired = self.battle.lock_advance();
                debug!(target: "runtime::host", acquired, "advance lock requested");
                if reply.send(acquired).is_err() {
                    debug!(target: "runtime::host", "HoldAdvance reply channel closed (caller dropped)");
                }
            }
            Command::ReleaseAdvance { reply } => {
                let result = self.release_advance();
                if reply.send(result).is_err() {
                    debug!(target: "runtime::host", "ReleaseAdvance reply channel closed (caller dropped)");
                }
            }
            Command::QuerySnapshot { reply } => {
                let result = BattleSnapshot::capture(&self.battle, self.sequence).map_err(Into::into);
                if reply.send(result).is_err() {
                    debug!(target: "runtime::host", "QuerySnapshot reply channel closed (caller dropped)");
                }
            }
            Command::QueryLog { reply } => {
                if reply.send(self.battle.log().to_vec()).is_err() {
                    debug!(target: "runtime::host", "QueryLog reply channel closed (caller dropped)");
                }
            }
        }
    }

    fn start(&mut self) -> Result<TurnStartOutcome> {
        let outcome = self.battle.start_battle().map_err(RuntimeError::from);
        self.settle(outcome)
    }

    fn use_ability(&mut self, command: &AbilityCommand) -> Result<ActionReport> {
        let hydrated = match command.hydrate(&self.battle) {
            Ok(hydrated) => hydrated,
            Err(error) => return Err(self.reject(error)),
        };
        let result = self
            .battle
            .use_ability(hydrated.caster, hydrated.category, &hydrated.targets);
        match result {
            Ok(report) => {
                info!(
                    target: "runtime::host",
                    caster = %hydrated.caster,
                    category = %hydrated.category,
                    targets = report.outcome.targets.len(),
                    flags = ?report.outcome.flags,
                    "ability resolved"
                );
                self.publish_changes();
                self.follow(&report.next);
                Ok(report)
            }
            Err(error) => {
                self.publish_changes();
                Err(self.reject(error.into()))
            }
        }
    }

    fn skip_turn(&mut self, command: &SkipTurnCommand) -> Result<TurnStartOutcome> {
        let actor = match command.hydrate(&self.battle) {
            Ok(actor) => actor,
            Err(error) => return Err(self.reject(error)),
        };
        if self.pending_skip.is_some_and(|pending| pending.actor == actor) {
            self.pending_skip = None;
        }
        let outcome = self.battle.skip_turn(actor).map_err(RuntimeError::from);
        self.settle(outcome)
    }

    fn release_advance(&mut self) -> Result<Option<TurnStartOutcome>> {
        match self.battle.release_advance() {
            Ok(Some(outcome)) => {
                self.publish_changes();
                self.follow(&outcome);
                Ok(Some(outcome))
            }
            Ok(None) => Ok(None),
            Err(error) => {
                self.publish_changes();
                Err(self.reject(error.into()))
            }
        }
    }

    fn run_pending_skip(&mut self) {
        let Some(pending) = self.pending_skip.take() else {
            return;
        };
        debug!(target: "runtime::host", actor = %pending.actor, "auto-skipping stunned turn");
        match self.battle.skip_turn(pending.actor) {
            Ok(outcome) => {
                self.publish_changes();
                self.follow(&outcome);
            }
            Err(error) => {
                self.publish_changes();
                warn!(target: "runtime::host", %error, "stunned skip failed");
            }
        }
    }

    fn settle(&mut self, outcome: Result<TurnStartOutcome>) -> Result<TurnStartOutcome> {
        match outcome {
            Ok(outcome) => {
                self.publish_changes();
                self.follow(&outcome);
                Ok(outcome)
            }
            Err(error) => {
                // the call may have committed events before failing
                self.publish_changes();
                Err(self.reject(error))
            }
        }
    }

    /// Arm the stun timer when the battle now waits on a stunned actor.
    fn follow(&mut self, outcome: &TurnStartOutcome) {
        if let TurnStartOutcome::Stunned { actor, delay_ms } = *outcome
            && self.auto_skip_stunned
        {
            self.pending_skip = Some(PendingSkip {
                actor,
                at: Instant::now() + Duration::from_millis(delay_ms),
            });
        }
    }

    fn reject(&mut self, error: RuntimeError) -> RuntimeError {
        let severity = error.severity();
        if severity.is_internal() {
            error!(
                target: "runtime::host",
                code = error.error_code(),
                severity = severity.as_str(),
                %error,
                "command failed"
            );
        } else {
            warn!(
                target: "runtime::host",
                code = error.error_code(),
                severity = severity.as_str(),
                %error,
                "command rejected"
            );
        }
        self.broadcast(HostMessage::Rejected {
            code: error.error_code().to_owned(),
            reason: error.to_string(),
            retryable: severity.is_recoverable(),
        });
        error
    }

    /// Replicate new events, then send a fresh snapshot if anything changed.
    fn publish_changes(&mut self) {
        let fresh = self.battle.events_since(self.log_mark);
        let changed = fresh.iter().any(|event| event.topic() != Topic::ActionRejected);
        let envelopes: Vec<_> = fresh
            .iter()
            .filter_map(|event| self.replicator.capture(event))
            .collect();
        self.log_mark = self.battle.log().len();
        for envelope in envelopes {
            self.broadcast(HostMessage::Event(envelope));
        }
        if !changed {
            return;
        }

        self.sequence += 1;
        match BattleSnapshot::capture(&self.battle, self.sequence) {
            Ok(snapshot) => self.broadcast(HostMessage::Snapshot(snapshot)),
            Err(error) => warn!(target: "runtime::host", %error, "snapshot encoding failed"),
        }

        if self.battle.is_over() && !self.announced_end {
            self.announced_end = true;
            self.pending_skip = None;
            let winner = self.battle.winner();
            info!(target: "runtime::host", ?winner, round = self.battle.round(), "battle ended");
            self.broadcast(HostMessage::BattleEnded {
                winner: winner.map(|team| team.0),
            });
        }
    }

    fn broadcast(&self, message: HostMessage) {
        if self.outbound.send(message).is_err() {
            // No observers connected - this is normal, not an error
            trace!(target: "runtime::host", "no observers for host message");
        }
    }
}
