//! Error types for the battle scheduler.

use crate::combat::ResolveError;
use crate::error::{ErrorSeverity, GameError};
use crate::state::ActorId;

/// Errors surfaced by turn-flow operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TurnError {
    #[error("the battle has not started")]
    BattleNotStarted,

    #[error("the battle has already started")]
    AlreadyStarted,

    #[error("the battle is over")]
    BattleOver,

    #[error("no living actors remain")]
    NoLivingActors,

    #[error("it is {expected}'s turn, not {actual}'s")]
    NotCurrentActor { expected: ActorId, actual: ActorId },

    #[error("a resolution plan is outstanding")]
    ResolutionInProgress,

    #[error("no turn is open")]
    NoOpenTurn,

    #[error("advance is not locked")]
    NotLocked,
}

impl GameError for TurnError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NoLivingActors => ErrorSeverity::Internal,
            Self::NotCurrentActor { .. } | Self::ResolutionInProgress | Self::NoOpenTurn => {
                ErrorSeverity::Recoverable
            }
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::BattleNotStarted => "TURN_NOT_STARTED",
            Self::AlreadyStarted => "TURN_ALREADY_STARTED",
            Self::BattleOver => "TURN_BATTLE_OVER",
            Self::NoLivingActors => "TURN_NO_LIVING_ACTORS",
            Self::NotCurrentActor { .. } => "TURN_NOT_CURRENT_ACTOR",
            Self::ResolutionInProgress => "TURN_RESOLUTION_IN_PROGRESS",
            Self::NoOpenTurn => "TURN_NO_OPEN_TURN",
            Self::NotLocked => "TURN_NOT_LOCKED",
        }
    }
}

/// Errors surfaced while executing an ability through the battle.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleError {
    #[error("ability rejected: {0}")]
    Resolve(#[from] ResolveError),

    #[error("turn flow failed: {0}")]
    Turn(#[from] TurnError),
}

impl GameError for BattleError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Resolve(e) => e.severity(),
            Self::Turn(e) => e.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Resolve(e) => e.error_code(),
            Self::Turn(e) => e.error_code(),
        }
    }
}
