//! Resolution plans and outcome summaries.

use bitflags::bitflags;

use crate::state::{AbilityCategory, ActorId, EffectId, TeamId};

bitflags! {
    /// Classification of what a resolution did, per target and in aggregate.
    ///
    /// The affinity meter grants bonus marks per flag present, so adding a
    /// flag changes mark income.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct OutcomeFlags: u16 {
        const DAMAGE = 1 << 0;
        const HEAL   = 1 << 1;
        const SHIELD = 1 << 2;
        const CRIT   = 1 << 3;
        const MISS   = 1 << 4;
        const STUN   = 1 << 5;
        const DOT    = 1 << 6;
        const BUFF   = 1 << 7;
        const DEBUFF = 1 << 8;
        const KILL   = 1 << 9;
    }
}

impl OutcomeFlags {
    /// Flags that earn bonus affinity marks. A miss earns nothing.
    pub fn bonus_count(self) -> u32 {
        (self - Self::MISS).bits().count_ones()
    }
}

/// Frozen hit result for one target.
///
/// Computed once in the planning phase; presentation and mechanics both read
/// this value and nothing re-rolls it.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HitRoll {
    pub target: ActorId,
    /// `None` when the action always lands (ally-directed or non-damaging).
    pub roll: Option<f32>,
    pub chance: f32,
    pub hit: bool,
}

impl HitRoll {
    pub fn automatic(target: ActorId) -> Self {
        Self {
            target,
            roll: None,
            chance: 1.0,
            hit: true,
        }
    }
}

/// First half of a two-phase resolution: validated input plus hit rolls.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResolutionPlan {
    pub caster: ActorId,
    pub team: TeamId,
    pub category: AbilityCategory,
    pub ability: String,
    pub hits: Vec<HitRoll>,
    pub round: u32,
}

impl ResolutionPlan {
    pub fn targets(&self) -> impl Iterator<Item = ActorId> + '_ {
        self.hits.iter().map(|h| h.target)
    }

    pub fn hit_count(&self) -> usize {
        self.hits.iter().filter(|h| h.hit).count()
    }
}

/// What one resolution did to one target.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetOutcome {
    pub target: ActorId,
    /// Post-mitigation damage before the shield split.
    pub damage: u32,
    pub healed: u32,
    pub shielded: u32,
    pub effects: Vec<EffectId>,
    pub flags: OutcomeFlags,
}

impl TargetOutcome {
    /// Positive effect value credited to the caster's charge ledger.
    pub fn effect_value(&self) -> u32 {
        self.damage + self.healed + self.shielded
    }
}

/// Aggregate result of a committed plan.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResolutionOutcome {
    pub caster: ActorId,
    pub category: AbilityCategory,
    pub targets: Vec<TargetOutcome>,
    pub flags: OutcomeFlags,
    pub charge_gained: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn miss_does_not_count_toward_bonus_marks() {
        let flags = OutcomeFlags::DAMAGE | OutcomeFlags::CRIT | OutcomeFlags::MISS;
        assert_eq!(flags.bonus_count(), 2);
        assert_eq!(OutcomeFlags::empty().bonus_count(), 0);
    }

    #[test]
    fn effect_value_sums_positive_payloads() {
        let outcome = TargetOutcome {
            target: ActorId(1),
            damage: 30,
            healed: 5,
            shielded: 10,
            ..TargetOutcome::default()
        };
        assert_eq!(outcome.effect_value(), 45);
    }
}
