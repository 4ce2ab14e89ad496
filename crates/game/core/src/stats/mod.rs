//! Dynamic stat folding.
//!
//! Live stats are never stored. Each query folds the actor's base value with
//! the sum of every active effect that modifies the stat, then clamps to the
//! stat's valid range:
//!
//! ```text
//! live = clamp(base + Σ modifier.magnitude, min, max)
//! ```
//!
//! Effects never write back into base values, so expiring an effect restores
//! the stat exactly.

use crate::combat::DamageCategory;
use crate::state::StatusEffects;

/// Stats that status effects can modify.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum StatKind {
    Accuracy,
    Dodge,
    Resistance,
    Speed,
    CritRate,
    CritDamage,
    DamageMultiplier,
}

impl StatKind {
    /// Valid range after folding.
    pub const fn bounds(self) -> (f32, f32) {
        match self {
            Self::Accuracy => (0.0, 2.0),
            Self::Dodge => (0.0, 1.0),
            Self::Resistance => (-1.0, 1.0),
            Self::Speed => (0.0, f32::MAX),
            Self::CritRate => (0.0, 1.0),
            Self::CritDamage => (1.0, f32::MAX),
            Self::DamageMultiplier => (0.0, f32::MAX),
        }
    }

    pub fn clamp(self, value: f32) -> f32 {
        let (min, max) = self.bounds();
        value.clamp(min, max)
    }
}

/// Fold a base value with the active modifiers for `stat`.
pub fn fold(
    stat: StatKind,
    base: f32,
    effects: &StatusEffects,
    category: Option<DamageCategory>,
) -> f32 {
    stat.clamp(base + effects.stat_total(stat, category))
}

/// Point-in-time copy of an actor's live combat stats.
///
/// Taken once per resolution so every target sees the same caster values.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatStats {
    pub accuracy: f32,
    pub dodge: f32,
    pub speed: f32,
    pub crit_rate: f32,
    pub crit_damage: f32,
    pub damage_multiplier: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{EffectDuration, EffectId, StatusEffect, StatusKind, StatusTemplate};

    fn effects_with(kind: StatusKind, magnitudes: &[f32]) -> StatusEffects {
        let mut effects = StatusEffects::new();
        for (i, magnitude) in magnitudes.iter().enumerate() {
            let template = StatusTemplate::new("mod", kind, EffectDuration::Turns(2), *magnitude);
            effects.push(StatusEffect::bind(&template, EffectId(i as u64), None));
        }
        effects
    }

    #[test]
    fn accuracy_is_clamped_to_zero_two() {
        let effects = effects_with(StatusKind::Accuracy, &[0.8, 0.8]);
        assert_eq!(fold(StatKind::Accuracy, 1.0, &effects, None), 2.0);

        let effects = effects_with(StatusKind::Accuracy, &[-3.0]);
        assert_eq!(fold(StatKind::Accuracy, 1.0, &effects, None), 0.0);
    }

    #[test]
    fn dodge_is_clamped_to_unit_range() {
        let effects = effects_with(StatusKind::Dodge, &[0.7, 0.6]);
        assert_eq!(fold(StatKind::Dodge, 0.1, &effects, None), 1.0);
    }

    #[test]
    fn resistance_is_clamped_to_signed_unit_range() {
        let effects = effects_with(StatusKind::Resistance, &[-0.9, -0.9]);
        assert_eq!(
            fold(StatKind::Resistance, 0.2, &effects, Some(DamageCategory::Fire)),
            -1.0
        );
    }

    #[test]
    fn unrelated_effects_do_not_contribute() {
        let effects = effects_with(StatusKind::Speed, &[5.0]);
        assert_eq!(fold(StatKind::CritRate, 0.1, &effects, None), 0.1);
    }
}
