use super::{ActorId, TeamId};

/// Where the scheduler currently stands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum TurnPhase {
    /// Battle assembled, `start_battle` not yet called.
    #[default]
    NotStarted,
    /// The current actor may act.
    AwaitingAction,
    /// A resolution plan is outstanding.
    Resolving,
    /// The current turn ended and the next one has not begun.
    BetweenTurns,
    /// A team has been wiped out.
    Ended,
}

/// Round and turn bookkeeping.
///
/// `order` is derived: it is rebuilt from initiative rolls every round and
/// never treated as an independent source of truth.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnState {
    /// 1-based once the battle has started.
    pub round: u32,
    pub order: Vec<ActorId>,
    /// Index into `order` of the acting actor.
    pub cursor: usize,
    pub current: Option<ActorId>,
    /// Team of the most recent actor to open a turn; survives round resets.
    pub last_team: Option<TeamId>,
    pub phase: TurnPhase,
    pub winner: Option<TeamId>,
}

impl TurnState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, TurnPhase::Ended)
    }

    pub fn has_started(&self) -> bool {
        !matches!(self.phase, TurnPhase::NotStarted)
    }
}
