//! Damage categories, mitigation, and shield absorption.

// ============================================================================
// Damage Category
// ============================================================================

/// Damage category for resistances and affinity tracking.
///
/// Each non-true category has its own resistance value on every actor and
/// its own affinity accumulator per team.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum DamageCategory {
    /// Blades, fists, projectiles.
    #[default]
    Physical,
    /// Burns and explosions.
    Fire,
    /// Ice and chill.
    Frost,
    /// Curses and drains.
    Shadow,
    /// Ignores all resistances.
    True,
}

impl DamageCategory {
    /// Categories that carry a resistance value and an affinity accumulator.
    pub const RESISTED: [Self; 4] = [Self::Physical, Self::Fire, Self::Frost, Self::Shadow];

    /// Index into per-category arrays, `None` for true damage.
    pub const fn accumulator_index(self) -> Option<usize> {
        match self {
            Self::Physical => Some(0),
            Self::Fire => Some(1),
            Self::Frost => Some(2),
            Self::Shadow => Some(3),
            Self::True => None,
        }
    }

    /// Inverse of [`Self::accumulator_index`].
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Physical),
            1 => Some(Self::Fire),
            2 => Some(Self::Frost),
            3 => Some(Self::Shadow),
            _ => None,
        }
    }

    pub const fn ignores_resistance(self) -> bool {
        matches!(self, Self::True)
    }
}

// ============================================================================
// Damage Calculation
// ============================================================================

/// Apply resistance to an incoming amount.
///
/// ```text
/// mitigated = category == True ? amount : round(amount × (1 − clamp(resistance, −1, 1)))
/// ```
///
/// Negative resistance amplifies damage (up to ×2 at −1).
pub fn mitigate(amount: u32, category: DamageCategory, resistance: f32) -> u32 {
    if category.ignores_resistance() {
        return amount;
    }
    let scale = 1.0 - resistance.clamp(-1.0, 1.0);
    (amount as f32 * scale).round().max(0.0) as u32
}

/// Scale a base amount by a multiplier, rounding to the nearest integer.
pub fn scale(amount: u32, multiplier: f32) -> u32 {
    (amount as f32 * multiplier.max(0.0)).round() as u32
}

/// How a mitigated hit is split between shield and HP.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShieldSplit {
    pub absorbed: u32,
    pub hp_loss: u32,
}

/// Shield absorbs first; only the remainder reaches HP.
pub fn split_shield(mitigated: u32, shield: u32) -> ShieldSplit {
    let absorbed = mitigated.min(shield);
    ShieldSplit {
        absorbed,
        hp_loss: mitigated - absorbed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn true_damage_ignores_resistance() {
        assert_eq!(mitigate(40, DamageCategory::True, 0.9), 40);
        assert_eq!(mitigate(40, DamageCategory::True, -1.0), 40);
    }

    #[test]
    fn resistance_scales_by_one_minus_resistance() {
        assert_eq!(mitigate(40, DamageCategory::Physical, 0.0), 40);
        assert_eq!(mitigate(40, DamageCategory::Fire, 0.25), 30);
        assert_eq!(mitigate(40, DamageCategory::Frost, -0.5), 60);
    }

    #[test]
    fn resistance_is_clamped_before_scaling() {
        assert_eq!(mitigate(40, DamageCategory::Shadow, 3.0), 0);
        assert_eq!(mitigate(40, DamageCategory::Shadow, -3.0), 80);
    }

    #[test]
    fn shield_absorbs_before_hp() {
        assert_eq!(
            split_shield(40, 50),
            ShieldSplit {
                absorbed: 40,
                hp_loss: 0
            }
        );
        assert_eq!(
            split_shield(40, 15),
            ShieldSplit {
                absorbed: 15,
                hp_loss: 25
            }
        );
    }

    #[test]
    fn category_index_round_trips() {
        for category in DamageCategory::RESISTED {
            let index = category.accumulator_index().unwrap();
            assert_eq!(DamageCategory::from_index(index), Some(category));
        }
        assert_eq!(DamageCategory::True.accumulator_index(), None);
    }
}
