//! Ability resolution errors.

use crate::error::{ErrorSeverity, GameError};
use crate::state::{AbilityCategory, ActorId};

/// Reasons an ability use is rejected.
///
/// A rejection never mutates state. The battle reports it through a
/// diagnostic `ActionRejected` event and returns it to the caller.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResolveError {
    #[error("caster {0} does not exist")]
    UnknownCaster(ActorId),

    #[error("caster {caster} has no {category} ability")]
    AbilityNotFound {
        caster: ActorId,
        category: AbilityCategory,
    },

    #[error("ability not usable (cooldown {cooldown}, charge {charge}/{required})")]
    AbilityNotUsable {
        cooldown: u32,
        charge: u32,
        required: u32,
    },

    #[error("passive abilities cannot be activated")]
    PassiveNotActivatable,

    #[error("no valid targets")]
    NoValidTargets,

    #[error("caster {0} is dead")]
    CasterDead(ActorId),

    #[error("caster {0} is stunned")]
    CasterStunned(ActorId),

    #[error("it is not {0}'s turn")]
    NotCastersTurn(ActorId),

    #[error("another resolution is still in progress")]
    ResolutionInProgress,

    #[error("plan does not match the outstanding resolution")]
    StalePlan,

    #[error("the battle is over")]
    BattleOver,
}

impl GameError for ResolveError {
    fn severity(&self) -> ErrorSeverity {
        use ResolveError::*;
        match self {
            AbilityNotUsable { .. } | NotCastersTurn(_) | CasterStunned(_) | ResolutionInProgress => {
                ErrorSeverity::Recoverable
            }
            UnknownCaster(_) | AbilityNotFound { .. } | PassiveNotActivatable | NoValidTargets
            | CasterDead(_) | StalePlan | BattleOver => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        use ResolveError::*;
        match self {
            UnknownCaster(_) => "RESOLVE_UNKNOWN_CASTER",
            AbilityNotFound { .. } => "RESOLVE_ABILITY_NOT_FOUND",
            AbilityNotUsable { .. } => "RESOLVE_ABILITY_NOT_USABLE",
            PassiveNotActivatable => "RESOLVE_PASSIVE_NOT_ACTIVATABLE",
            NoValidTargets => "RESOLVE_NO_VALID_TARGETS",
            CasterDead(_) => "RESOLVE_CASTER_DEAD",
            CasterStunned(_) => "RESOLVE_CASTER_STUNNED",
            NotCastersTurn(_) => "RESOLVE_NOT_CASTERS_TURN",
            ResolutionInProgress => "RESOLVE_IN_PROGRESS",
            StalePlan => "RESOLVE_STALE_PLAN",
            BattleOver => "RESOLVE_BATTLE_OVER",
        }
    }
}

/// An operation was about to break a state invariant and was aborted.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InvariantViolation {
    #[error("negative damage {amount} against {target}")]
    NegativeDamage { target: ActorId, amount: i32 },

    #[error("actor {0} is missing")]
    MissingActor(ActorId),
}

impl GameError for InvariantViolation {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Internal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NegativeDamage { .. } => "INVARIANT_NEGATIVE_DAMAGE",
            Self::MissingActor(_) => "INVARIANT_MISSING_ACTOR",
        }
    }
}
