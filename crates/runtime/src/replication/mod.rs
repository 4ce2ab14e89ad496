//! Authority → observer state sync: snapshots, event envelopes, and the
//! wire codec they travel in.

pub mod codec;
pub mod envelope;
pub mod snapshot;

pub use codec::{ClientMessage, CodecError, HostMessage, decode, encode};
pub use envelope::{Origin, PayloadType, ReplicatedEvent, Replicator};
pub use snapshot::{AbilityView, ActorView, BattleSnapshot, StatusView};
