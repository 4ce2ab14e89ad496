//! Unified error types surfaced by the runtime API.
//!
//! Wraps battle rejections, command hydration failures, worker channel
//! failures, and codec failures so clients can bubble them up with
//! consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use arena_core::{AbilityCategory, BattleError, ErrorSeverity, GameError, ResolveError, TurnError};

use crate::replication::CodecError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("caster id {0} does not resolve to an actor")]
    UnresolvedCaster(u32),

    #[error("actor id {0} does not resolve to an actor")]
    UnresolvedActor(u32),

    #[error("actor {caster} has no {category} ability")]
    MissingAbility {
        caster: u32,
        category: AbilityCategory,
    },

    #[error("none of the target ids {0:?} resolve to an actor")]
    UnresolvedTargets(Vec<u32>),

    #[error("no turn is open to skip")]
    NoCurrentActor,

    #[error(transparent)]
    Battle(#[from] BattleError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("host worker command channel closed")]
    CommandChannelClosed,

    #[error("host worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("host worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),
}

impl From<ResolveError> for RuntimeError {
    fn from(error: ResolveError) -> Self {
        Self::Battle(error.into())
    }
}

impl From<TurnError> for RuntimeError {
    fn from(error: TurnError) -> Self {
        Self::Battle(error.into())
    }
}

impl GameError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnresolvedCaster(_)
            | Self::UnresolvedActor(_)
            | Self::MissingAbility { .. }
            | Self::UnresolvedTargets(_)
            | Self::NoCurrentActor
            | Self::Codec(_) => ErrorSeverity::Validation,
            Self::Battle(inner) => inner.severity(),
            Self::CommandChannelClosed | Self::ReplyChannelClosed(_) | Self::WorkerJoin(_) => {
                ErrorSeverity::Internal
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnresolvedCaster(_) => "RUNTIME_UNRESOLVED_CASTER",
            Self::UnresolvedActor(_) => "RUNTIME_UNRESOLVED_ACTOR",
            Self::MissingAbility { .. } => "RUNTIME_MISSING_ABILITY",
            Self::UnresolvedTargets(_) => "RUNTIME_UNRESOLVED_TARGETS",
            Self::NoCurrentActor => "RUNTIME_NO_CURRENT_ACTOR",
            Self::Battle(inner) => inner.error_code(),
            Self::Codec(_) => "RUNTIME_CODEC",
            Self::CommandChannelClosed => "RUNTIME_COMMAND_CHANNEL_CLOSED",
            Self::ReplyChannelClosed(_) => "RUNTIME_REPLY_CHANNEL_CLOSED",
            Self::WorkerJoin(_) => "RUNTIME_WORKER_JOIN",
        }
    }
}
