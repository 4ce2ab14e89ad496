use crate::combat::DamageCategory;
use crate::state::AbilityCategory;

/// Battle configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BattleConfig {
    /// Sides of the initiative die rolled each round.
    pub initiative_die: u32,
    /// Speed contributes `speed / speed_divisor` to the initiative score.
    pub speed_divisor: f32,
    /// Presentation delay the caller waits before auto-skipping a stunned turn.
    pub stun_skip_delay_ms: u64,
    /// Round-based attrition schedule, ordered by `from_round`.
    pub attrition: Vec<AttritionTier>,
    /// Enables the affinity/fusion meta layer.
    pub affinity_enabled: bool,
    pub affinity: AffinityConfig,
}

impl BattleConfig {
    // ===== compile-time constants used as type parameters =====
    /// Every archetype has exactly four move slots.
    pub const MAX_ABILITIES: usize = 4;
    /// Team ids are `0..MAX_TEAMS`.
    pub const MAX_TEAMS: usize = 2;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_INITIATIVE_DIE: u32 = 20;
    pub const DEFAULT_SPEED_DIVISOR: f32 = 4.0;
    pub const DEFAULT_STUN_SKIP_DELAY_MS: u64 = 800;

    pub fn new() -> Self {
        Self {
            initiative_die: Self::DEFAULT_INITIATIVE_DIE,
            speed_divisor: Self::DEFAULT_SPEED_DIVISOR,
            stun_skip_delay_ms: Self::DEFAULT_STUN_SKIP_DELAY_MS,
            attrition: AttritionTier::default_schedule(),
            affinity_enabled: false,
            affinity: AffinityConfig::default(),
        }
    }

    pub fn with_affinity(mut self, enabled: bool) -> Self {
        self.affinity_enabled = enabled;
        self
    }

    pub fn without_attrition(mut self) -> Self {
        self.attrition.clear();
        self
    }

    /// Returns the attrition tier active for `round`, if any.
    pub fn attrition_for(&self, round: u32) -> Option<&AttritionTier> {
        self.attrition
            .iter()
            .filter(|tier| tier.from_round <= round)
            .max_by_key(|tier| tier.from_round)
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// What the attrition percentage is taken from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttritionBasis {
    CurrentHp,
    MaxHp,
}

/// One step of the round-based attrition schedule.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttritionTier {
    /// First round this tier applies to; applies until a later tier starts.
    pub from_round: u32,
    /// Fraction of the basis dealt as true damage, e.g. `0.05`.
    pub percent: f32,
    pub basis: AttritionBasis,
}

impl AttritionTier {
    /// Slow-burn schedule: nothing before round 10, then escalating.
    pub fn default_schedule() -> Vec<Self> {
        vec![
            Self {
                from_round: 10,
                percent: 0.05,
                basis: AttritionBasis::CurrentHp,
            },
            Self {
                from_round: 15,
                percent: 0.10,
                basis: AttritionBasis::MaxHp,
            },
            Self {
                from_round: 20,
                percent: 0.20,
                basis: AttritionBasis::MaxHp,
            },
        ]
    }
}

/// Tunables for the affinity/fusion meter and the tug-of-war meter.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AffinityConfig {
    /// Marks needed to lock one category accumulator.
    pub threshold: u32,
    pub normal_marks: u32,
    pub skill_marks: u32,
    pub signature_marks: u32,
    /// Extra marks per outcome flag present on the resolution.
    pub bonus_marks_per_flag: u32,
    /// Rolling window, in rounds, for dual/triple fusions.
    pub window_rounds: u32,
    /// Rounds between a trigger and its effect firing.
    pub fusion_delay_rounds: u32,
    /// Magnitude used by single-category fusion effects.
    pub single_power: f32,
    /// Multiplier applied to single effects when fired as part of a dual.
    pub dual_multiplier: f32,
    /// Fraction of MaxHP dealt as true damage by the triple fusion.
    pub cataclysm_percent: f32,
    pub tug: TugConfig,
}

impl AffinityConfig {
    /// Base marks granted for resolving an ability of `category`.
    pub fn base_marks(&self, category: AbilityCategory) -> u32 {
        match category {
            AbilityCategory::Passive => 0,
            AbilityCategory::Normal => self.normal_marks,
            AbilityCategory::Skill => self.skill_marks,
            AbilityCategory::Signature => self.signature_marks,
        }
    }

    /// Whether abilities of this damage category feed an accumulator.
    pub fn tracks(&self, category: DamageCategory) -> bool {
        category.accumulator_index().is_some()
    }
}

impl Default for AffinityConfig {
    fn default() -> Self {
        Self {
            threshold: 12,
            normal_marks: 1,
            skill_marks: 2,
            signature_marks: 4,
            bonus_marks_per_flag: 1,
            window_rounds: 3,
            fusion_delay_rounds: 1,
            single_power: 0.15,
            dual_multiplier: 1.5,
            cataclysm_percent: 0.15,
            tug: TugConfig::default(),
        }
    }
}

/// Tunables for the scalar tug-of-war meter.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TugConfig {
    pub cap: f32,
    /// Same-direction contributions shrink by `damping × |meter| / cap`.
    pub damping: f32,
    /// Multiplicative decay applied at each round end.
    pub decay: f32,
    pub damage_weight: f32,
    pub heal_weight: f32,
    pub shield_weight: f32,
    pub crit_weight: f32,
    pub status_weight: f32,
    /// Charge granted to every living member of the favored team on a swing.
    pub swing_charge: u32,
}

impl Default for TugConfig {
    fn default() -> Self {
        Self {
            cap: 100.0,
            damping: 0.5,
            decay: 0.9,
            damage_weight: 0.2,
            heal_weight: 0.15,
            shield_weight: 0.1,
            crit_weight: 3.0,
            status_weight: 2.0,
            swing_charge: 25,
        }
    }
}
