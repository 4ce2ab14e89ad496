//! Host ↔ observer wire messages and their bincode codec.

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use super::envelope::ReplicatedEvent;
use super::snapshot::BattleSnapshot;
use crate::api::{AbilityCommand, SkipTurnCommand};

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("bincode: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Authority → observer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum HostMessage {
    Snapshot(BattleSnapshot),
    Event(ReplicatedEvent),
    /// A command was refused. `retryable` is set when the same command may
    /// succeed later, e.g. once it is the caster's turn.
    Rejected {
        code: String,
        reason: String,
        retryable: bool,
    },
    BattleEnded { winner: Option<u8> },
}

/// Observer → authority.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ClientMessage {
    UseAbility(AbilityCommand),
    SkipTurn(SkipTurnCommand),
    RequestSnapshot,
}

pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>, CodecError> {
    Ok(bincode::serialize(message)?)
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    Ok(bincode::deserialize(bytes)?)
}
