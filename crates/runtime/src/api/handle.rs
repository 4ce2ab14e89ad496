//! Cloneable façade for issuing commands to the host.
//!
//! [`HostHandle`] hides channel plumbing and offers async helpers for
//! driving the battle or streaming host messages.
use tokio::sync::{broadcast, mpsc, oneshot};

use arena_core::{ActionReport, BattleEvent, TurnStartOutcome};

use super::commands::{AbilityCommand, SkipTurnCommand};
use super::errors::{Result, RuntimeError};
use crate::replication::{BattleSnapshot, ClientMessage, HostMessage, decode};
use crate::workers::Command;

/// Client-facing handle to interact with the host.
#[derive(Clone)]
pub struct HostHandle {
    command_tx: mpsc::Sender<Command>,
    outbound: broadcast::Sender<HostMessage>,
}

/// What a wire command produced.
#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
    Action(ActionReport),
    Turn(TurnStartOutcome),
    Snapshot(BattleSnapshot),
}

impl HostHandle {
    pub(crate) fn new(
        command_tx: mpsc::Sender<Command>,
        outbound: broadcast::Sender<HostMessage>,
    ) -> Self {
        Self {
            command_tx,
            outbound,
        }
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(command(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Start the battle and begin the first turn.
    pub async fn start(&self) -> Result<TurnStartOutcome> {
        self.request(|reply| Command::Start { reply }).await?
    }

    /// Resolve an ability for the current actor and advance.
    pub async fn use_ability(&self, command: AbilityCommand) -> Result<ActionReport> {
        self.request(|reply| Command::UseAbility { command, reply })
            .await?
    }

    pub async fn skip_turn(&self, command: SkipTurnCommand) -> Result<TurnStartOutcome> {
        self.request(|reply| Command::SkipTurn { command, reply })
            .await?
    }

    /// Defer turn advances until [`release_advance`](Self::release_advance).
    ///
    /// Host-side only; remote clients cannot hold the battle. Returns false if
    /// the lock was already held.
    pub async fn hold_advance(&self) -> Result<bool> {
        self.request(|reply| Command::HoldAdvance { reply }).await
    }

    /// Release the advance lock and run the deferred advance, if any.
    pub async fn release_advance(&self) -> Result<Option<TurnStartOutcome>> {
        self.request(|reply| Command::ReleaseAdvance { reply }).await?
    }

    /// Current authoritative snapshot. Does not advance the sequence.
    pub async fn snapshot(&self) -> Result<BattleSnapshot> {
        self.request(|reply| Command::QuerySnapshot { reply }).await?
    }

    /// Every event committed so far.
    pub async fn log(&self) -> Result<Vec<BattleEvent>> {
        self.request(|reply| Command::QueryLog { reply }).await
    }

    /// Dispatch a decoded observer message.
    pub async fn submit(&self, message: ClientMessage) -> Result<Reply> {
        match message {
            ClientMessage::UseAbility(command) => self.use_ability(command).await.map(Reply::Action),
            ClientMessage::SkipTurn(command) => self.skip_turn(command).await.map(Reply::Turn),
            ClientMessage::RequestSnapshot => self.snapshot().await.map(Reply::Snapshot),
        }
    }

    /// Decode and dispatch raw observer bytes.
    pub async fn submit_bytes(&self, bytes: &[u8]) -> Result<Reply> {
        let message: ClientMessage = decode(bytes)?;
        self.submit(message).await
    }

    /// Subscribe to everything the host broadcasts.
    pub fn subscribe(&self) -> broadcast::Receiver<HostMessage> {
        self.outbound.subscribe()
    }
}
