//! Typed battle events.
//!
//! Every state change the engine commits is described by exactly one
//! [`BattleEvent`]. Subscribers route on the payload-free [`Topic`]
//! discriminant and match on the event itself for the payload.

use crate::affinity::FusionKind;
use crate::combat::{DamageCategory, OutcomeFlags};
use crate::state::{AbilityCategory, ActorId, EffectId, StatusKind, TeamId};

/// Payload-free discriminant of [`BattleEvent`], used as the bus topic.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Topic {
    GameStarted,
    RoundStarted,
    TurnOrderComputed,
    TurnStarted,
    TurnSkipped,
    TurnEnded,
    DamageDealt,
    AttackMissed,
    CriticalHit,
    Healed,
    ShieldGained,
    ChargeChanged,
    StatusApplied,
    StatusRemoved,
    StatusExpired,
    CharacterDied,
    CharacterRevived,
    AbilityResolved,
    ActionRejected,
    PassiveTriggered,
    AffinityMarked,
    FusionScheduled,
    FusionTriggered,
    FusionUnleashed,
    MomentumSwing,
    GameEnded,
}

/// Why a turn was skipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum SkipReason {
    Stunned,
    Requested,
}

/// Something that happened during a battle.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleEvent {
    GameStarted {
        actors: u32,
    },
    RoundStarted {
        round: u32,
    },
    TurnOrderComputed {
        round: u32,
        order: Vec<ActorId>,
    },
    TurnStarted {
        actor: ActorId,
        team: TeamId,
        round: u32,
    },
    TurnSkipped {
        actor: ActorId,
        reason: SkipReason,
    },
    TurnEnded {
        actor: ActorId,
    },
    /// `amount` is the post-mitigation total before the shield split.
    DamageDealt {
        source: Option<ActorId>,
        target: ActorId,
        amount: u32,
        absorbed: u32,
        hp_loss: u32,
        category: DamageCategory,
    },
    AttackMissed {
        source: ActorId,
        target: ActorId,
    },
    CriticalHit {
        source: ActorId,
        target: ActorId,
        multiplier: f32,
    },
    Healed {
        source: Option<ActorId>,
        target: ActorId,
        amount: u32,
    },
    ShieldGained {
        source: Option<ActorId>,
        target: ActorId,
        amount: u32,
    },
    ChargeChanged {
        actor: ActorId,
        delta: i64,
        charge: u32,
    },
    StatusApplied {
        source: Option<ActorId>,
        target: ActorId,
        effect: EffectId,
        name: String,
        kind: StatusKind,
        is_debuff: bool,
    },
    StatusRemoved {
        target: ActorId,
        effect: EffectId,
        name: String,
    },
    StatusExpired {
        target: ActorId,
        effect: EffectId,
        name: String,
    },
    CharacterDied {
        actor: ActorId,
        killer: Option<ActorId>,
    },
    CharacterRevived {
        actor: ActorId,
        source: Option<ActorId>,
        hp: u32,
    },
    /// Aggregate summary of one ability use.
    AbilityResolved {
        caster: ActorId,
        team: TeamId,
        ability: String,
        category: AbilityCategory,
        damage_category: DamageCategory,
        targets: Vec<ActorId>,
        flags: OutcomeFlags,
        charge_gained: u32,
    },
    /// Diagnostic only; carries no state change.
    ActionRejected {
        caster: Option<ActorId>,
        reason: String,
    },
    PassiveTriggered {
        actor: ActorId,
        rule: String,
    },
    AffinityMarked {
        team: TeamId,
        category: DamageCategory,
        marks: u32,
        total: u32,
    },
    FusionScheduled {
        team: TeamId,
        fusion: FusionKind,
        fires_at_round: u32,
    },
    FusionTriggered {
        team: TeamId,
        fusion: FusionKind,
    },
    FusionUnleashed {
        team: TeamId,
        fusion: FusionKind,
    },
    MomentumSwing {
        favored: TeamId,
    },
    /// `winner` is `None` only when both sides fell before anyone acted.
    GameEnded {
        winner: Option<TeamId>,
    },
}

impl BattleEvent {
    pub fn topic(&self) -> Topic {
        match self {
            Self::GameStarted { .. } => Topic::GameStarted,
            Self::RoundStarted { .. } => Topic::RoundStarted,
            Self::TurnOrderComputed { .. } => Topic::TurnOrderComputed,
            Self::TurnStarted { .. } => Topic::TurnStarted,
            Self::TurnSkipped { .. } => Topic::TurnSkipped,
            Self::TurnEnded { .. } => Topic::TurnEnded,
            Self::DamageDealt { .. } => Topic::DamageDealt,
            Self::AttackMissed { .. } => Topic::AttackMissed,
            Self::CriticalHit { .. } => Topic::CriticalHit,
            Self::Healed { .. } => Topic::Healed,
            Self::ShieldGained { .. } => Topic::ShieldGained,
            Self::ChargeChanged { .. } => Topic::ChargeChanged,
            Self::StatusApplied { .. } => Topic::StatusApplied,
            Self::StatusRemoved { .. } => Topic::StatusRemoved,
            Self::StatusExpired { .. } => Topic::StatusExpired,
            Self::CharacterDied { .. } => Topic::CharacterDied,
            Self::CharacterRevived { .. } => Topic::CharacterRevived,
            Self::AbilityResolved { .. } => Topic::AbilityResolved,
            Self::ActionRejected { .. } => Topic::ActionRejected,
            Self::PassiveTriggered { .. } => Topic::PassiveTriggered,
            Self::AffinityMarked { .. } => Topic::AffinityMarked,
            Self::FusionScheduled { .. } => Topic::FusionScheduled,
            Self::FusionTriggered { .. } => Topic::FusionTriggered,
            Self::FusionUnleashed { .. } => Topic::FusionUnleashed,
            Self::MomentumSwing { .. } => Topic::MomentumSwing,
            Self::GameEnded { .. } => Topic::GameEnded,
        }
    }

    /// Actor the event is primarily about, if any.
    pub fn subject(&self) -> Option<ActorId> {
        match self {
            Self::TurnStarted { actor, .. }
            | Self::TurnSkipped { actor, .. }
            | Self::TurnEnded { actor }
            | Self::ChargeChanged { actor, .. }
            | Self::CharacterDied { actor, .. }
            | Self::CharacterRevived { actor, .. }
            | Self::PassiveTriggered { actor, .. } => Some(*actor),
            Self::DamageDealt { target, .. }
            | Self::AttackMissed { target, .. }
            | Self::CriticalHit { target, .. }
            | Self::Healed { target, .. }
            | Self::ShieldGained { target, .. }
            | Self::StatusApplied { target, .. }
            | Self::StatusRemoved { target, .. }
            | Self::StatusExpired { target, .. } => Some(*target),
            Self::AbilityResolved { caster, .. } => Some(*caster),
            Self::ActionRejected { caster, .. } => *caster,
            _ => None,
        }
    }
}
