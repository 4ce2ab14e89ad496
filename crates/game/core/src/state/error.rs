//! Battle assembly errors.

use crate::error::{ErrorSeverity, GameError};
use crate::state::TeamId;

/// Errors raised while assembling a [`BattleState`](super::BattleState).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StateError {
    /// No actors were supplied.
    #[error("battle has no actors")]
    NoActors,

    /// An actor names a team outside `0..MAX_TEAMS`.
    #[error("actor '{name}' is on {team}, but only {max} teams are supported")]
    TeamOutOfRange {
        name: String,
        team: TeamId,
        max: usize,
    },

    /// One side has no members.
    #[error("{team} has no members")]
    EmptyTeam { team: TeamId },

    /// Actor starts with zero max HP.
    #[error("actor '{name}' has zero max HP")]
    ZeroMaxHp { name: String },
}

impl GameError for StateError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        use StateError::*;
        match self {
            NoActors => "STATE_NO_ACTORS",
            TeamOutOfRange { .. } => "STATE_TEAM_OUT_OF_RANGE",
            EmptyTeam { .. } => "STATE_EMPTY_TEAM",
            ZeroMaxHp { .. } => "STATE_ZERO_MAX_HP",
        }
    }
}
