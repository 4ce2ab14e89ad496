//! Authority/observer layer for hosted battles.
//!
//! This crate wraps an [`arena_core::Battle`] in an async authoritative
//! host and gives remote observers a read-only, digest-checked view of it.
//! Consumers embed [`Host`] to run a battle, drive it through
//! [`HostHandle`], and feed [`ObserverMirror`]s from the host's broadcast.
//!
//! Modules are organized by responsibility:
//! - [`host`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`replication`] provides snapshots, event envelopes, and the wire codec
//! - [`observer`] mirrors host state without simulating
//! - [`workers`] keeps the background task internal to the crate
pub mod api;
pub mod host;
pub mod observer;
pub mod replication;
pub mod rng;

mod workers;

pub use api::{
    AbilityCommand, HostHandle, HydratedAbility, Reply, Result, RuntimeError, SkipTurnCommand,
};
pub use host::{Host, HostBuilder, HostConfig};
pub use observer::{MirrorStats, ObserverMirror, ReplayBus};
pub use replication::{
    AbilityView, ActorView, BattleSnapshot, ClientMessage, CodecError, HostMessage, Origin,
    PayloadType, ReplicatedEvent, Replicator, StatusView,
};
pub use rng::RandRng;
