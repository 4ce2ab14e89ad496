//! Non-authoritative mirror of a hosted battle.
//!
//! An [`ObserverMirror`] never simulates. It holds the latest verified
//! snapshot, answers "is it my turn" for its local team, and replays
//! whitelisted event envelopes onto a local topic bus for presentation.
//! Malformed or tampered messages are dropped one at a time; nothing the
//! host sends can stop the mirror's loop.

use std::collections::HashMap;

use tokio::sync::broadcast;
use tracing::{debug, trace, warn};

use arena_core::{ReplicationFilter, TeamId, Topic};

use crate::replication::{ActorView, BattleSnapshot, HostMessage, ReplicatedEvent, Replicator, decode};

/// Counters for what the mirror accepted and dropped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MirrorStats {
    pub snapshots: u64,
    pub replays: u64,
    pub dropped: u64,
}

/// Topic-keyed fan-out for replayed envelopes.
pub struct ReplayBus {
    capacity: usize,
    channels: HashMap<Topic, broadcast::Sender<ReplicatedEvent>>,
}

impl ReplayBus {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            channels: HashMap::new(),
        }
    }

    pub fn subscribe(&mut self, topic: Topic) -> broadcast::Receiver<ReplicatedEvent> {
        let capacity = self.capacity;
        self.channels
            .entry(topic)
            .or_insert_with(|| broadcast::channel(capacity).0)
            .subscribe()
    }

    pub fn publish(&self, topic: Topic, envelope: ReplicatedEvent) {
        if let Some(tx) = self.channels.get(&topic)
            && tx.send(envelope).is_err()
        {
            trace!(target: "runtime::observer", %topic, "no local subscribers");
        }
    }
}

pub struct ObserverMirror {
    team: Option<TeamId>,
    snapshot: Option<BattleSnapshot>,
    replicator: Replicator,
    replays: ReplayBus,
    winner: Option<Option<u8>>,
    last_rejection: Option<String>,
    stats: MirrorStats,
}

impl ObserverMirror {
    /// A mirror acting for `team`, or a pure spectator when `None`.
    pub fn new(team: Option<TeamId>) -> Self {
        Self {
            team,
            snapshot: None,
            replicator: Replicator::default(),
            replays: ReplayBus::with_capacity(64),
            winner: None,
            last_rejection: None,
            stats: MirrorStats::default(),
        }
    }

    pub fn with_filter(mut self, filter: ReplicationFilter) -> Self {
        self.replicator = Replicator::new(filter);
        self
    }

    /// Decode and apply raw host bytes. Returns whether anything was applied.
    pub fn receive(&mut self, bytes: &[u8]) -> bool {
        match decode::<HostMessage>(bytes) {
            Ok(message) => self.apply(message),
            Err(error) => {
                debug!(target: "runtime::observer", %error, "dropping undecodable host message");
                self.stats.dropped += 1;
                false
            }
        }
    }

    pub fn apply(&mut self, message: HostMessage) -> bool {
        match message {
            HostMessage::Snapshot(snapshot) => self.apply_snapshot(snapshot),
            HostMessage::Event(envelope) => self.replay(envelope),
            HostMessage::Rejected {
                code,
                reason,
                retryable,
            } => {
                debug!(target: "runtime::observer", %code, %reason, retryable, "host rejected a command");
                self.last_rejection = Some(reason);
                true
            }
            HostMessage::BattleEnded { winner } => {
                self.winner = Some(winner);
                true
            }
        }
    }

    fn apply_snapshot(&mut self, snapshot: BattleSnapshot) -> bool {
        if !snapshot.verify() {
            warn!(
                target: "runtime::observer",
                sequence = snapshot.sequence,
                "dropping snapshot with mismatched digest"
            );
            self.stats.dropped += 1;
            return false;
        }
        if let Some(current) = &self.snapshot
            && snapshot.sequence <= current.sequence
        {
            debug!(
                target: "runtime::observer",
                sequence = snapshot.sequence,
                held = current.sequence,
                "dropping stale snapshot"
            );
            self.stats.dropped += 1;
            return false;
        }
        self.snapshot = Some(snapshot);
        self.stats.snapshots += 1;
        true
    }

    fn replay(&mut self, envelope: ReplicatedEvent) -> bool {
        if envelope.is_replay() {
            debug!(target: "runtime::observer", event = %envelope.event_name, "dropping echoed replay");
            self.stats.dropped += 1;
            return false;
        }
        let Some(topic) = envelope.topic() else {
            debug!(target: "runtime::observer", event = %envelope.event_name, "dropping unknown event");
            self.stats.dropped += 1;
            return false;
        };
        if !self.replicator.filter().replicates(topic) {
            self.stats.dropped += 1;
            return false;
        }
        self.replays.publish(topic, envelope.as_replay());
        self.stats.replays += 1;
        true
    }

    /// Receive replays of `topic`. Replays are tagged and are never forwarded.
    pub fn subscribe(&mut self, topic: Topic) -> broadcast::Receiver<ReplicatedEvent> {
        self.replays.subscribe(topic)
    }

    /// What this mirror would relay onward for `envelope`.
    pub fn forward(&self, envelope: &ReplicatedEvent) -> Option<ReplicatedEvent> {
        self.replicator.forward(envelope)
    }

    pub fn snapshot(&self) -> Option<&BattleSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn team(&self) -> Option<TeamId> {
        self.team
    }

    /// True while the local team's current actor may act.
    pub fn is_my_turn(&self) -> bool {
        match (self.team, &self.snapshot) {
            (Some(team), Some(snapshot)) => snapshot.is_turn_of(team),
            _ => false,
        }
    }

    /// The local actor whose turn it is, if any.
    pub fn my_actor(&self) -> Option<&ActorView> {
        if !self.is_my_turn() {
            return None;
        }
        let snapshot = self.snapshot.as_ref()?;
        snapshot.actor(snapshot.current_actor?)
    }

    /// `Some(winner)` once the host announced the end.
    pub fn outcome(&self) -> Option<Option<u8>> {
        self.winner
    }

    pub fn last_rejection(&self) -> Option<&str> {
        self.last_rejection.as_deref()
    }

    pub fn stats(&self) -> MirrorStats {
        self.stats
    }
}
