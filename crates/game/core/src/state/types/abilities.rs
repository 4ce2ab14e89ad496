//! Ability definitions for actors.
//!
//! Every archetype carries exactly four move slots: one passive, one normal,
//! one skill and one signature. The definition is immutable apart from the
//! cooldown counter; per-resolution damage overrides are passed into the
//! resolver rather than stored here.
//!
//! # Design
//!
//! - **Ability**: targeting rules, payload, cooldown and charge cost
//! - **DamageScaling**: strategy that recomputes base damage from caster and
//!   target state ("damage scales with X")
//! - **Abilities**: fixed-capacity slot list, looked up by category

use std::fmt;
use std::sync::Arc;

use arrayvec::ArrayVec;

use crate::combat::DamageCategory;
use crate::config::BattleConfig;
use crate::state::{Actor, ActorId, StatusTemplate};

// ============================================================================
// Categories and targeting
// ============================================================================

/// Move slot an ability occupies.
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
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum AbilityCategory {
    /// Always-on trait; never activated directly.
    Passive,
    Normal,
    Skill,
    /// Costs the full signature charge and resets it on use.
    Signature,
}

impl AbilityCategory {
    pub const fn is_activatable(self) -> bool {
        !matches!(self, Self::Passive)
    }

    pub const fn is_signature(self) -> bool {
        matches!(self, Self::Signature)
    }
}

/// Which actors an ability may target, relative to the caster.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TargetingMode {
    #[strum(serialize = "self")]
    #[cfg_attr(feature = "serde", serde(rename = "self"))]
    SelfOnly,
    /// Allies other than the caster.
    Ally,
    AllyOrSelf,
    Enemy,
    All,
}

impl TargetingMode {
    /// Whether `target` is a legal pick for `caster` under this mode.
    pub fn admits(self, caster: &Actor, target: &Actor) -> bool {
        let same_team = caster.team == target.team;
        let is_self = caster.id == target.id;
        match self {
            Self::SelfOnly => is_self,
            Self::Ally => same_team && !is_self,
            Self::AllyOrSelf => same_team,
            Self::Enemy => !same_team,
            Self::All => true,
        }
    }
}

// ============================================================================
// Damage scaling
// ============================================================================

/// Recomputes effective base damage for one (caster, target) pair.
///
/// Returned values are signed so a misbehaving rule surfaces as a
/// negative-damage invariant violation in the resolver instead of wrapping.
pub trait DamageScaling: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    fn base_damage(&self, caster: &Actor, target: &Actor, ability: &Ability) -> i32;
}

impl fmt::Debug for dyn DamageScaling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DamageScaling").field(&self.name()).finish()
    }
}

/// Scales damage with a fraction of the caster's missing HP.
#[derive(Clone, Copy, Debug)]
pub struct MissingHpScaling {
    pub ratio: f32,
}

impl DamageScaling for MissingHpScaling {
    fn name(&self) -> &'static str {
        "missing_hp"
    }

    fn base_damage(&self, caster: &Actor, _target: &Actor, ability: &Ability) -> i32 {
        let missing = caster.max_hp.saturating_sub(caster.hp);
        ability.damage as i32 + (missing as f32 * self.ratio).round() as i32
    }
}

/// Adds a flat bonus per debuff on the target.
#[derive(Clone, Copy, Debug)]
pub struct DebuffCountScaling {
    pub per_debuff: u32,
}

impl DamageScaling for DebuffCountScaling {
    fn name(&self) -> &'static str {
        "debuff_count"
    }

    fn base_damage(&self, _caster: &Actor, target: &Actor, ability: &Ability) -> i32 {
        let debuffs = target.statuses.iter().filter(|e| e.is_debuff()).count() as u32;
        (ability.damage + debuffs * self.per_debuff) as i32
    }
}

// ============================================================================
// Ability
// ============================================================================

/// One selectable action.
#[derive(Clone, Debug)]
pub struct Ability {
    pub name: String,
    pub description: String,
    pub category: AbilityCategory,
    pub targeting: TargetingMode,
    pub damage_category: DamageCategory,
    pub damage: u32,
    pub heal: u32,
    pub shield: u32,
    /// Upper bound on targets per use; `0` means unbounded.
    pub max_targets: u8,
    pub base_cooldown: u32,
    pub current_cooldown: u32,
    pub charge_requirement: u32,
    /// Applied on hit, in order, each with its own apply-chance roll.
    pub effects: Vec<StatusTemplate>,
    pub scaling: Option<Arc<dyn DamageScaling>>,
    /// May target dead allies and bring them back.
    pub revives: bool,
}

impl Ability {
    pub fn new(name: impl Into<String>, category: AbilityCategory, targeting: TargetingMode) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            category,
            targeting,
            damage_category: DamageCategory::default(),
            damage: 0,
            heal: 0,
            shield: 0,
            max_targets: 1,
            base_cooldown: 0,
            current_cooldown: 0,
            charge_requirement: 0,
            effects: Vec::new(),
            scaling: None,
            revives: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_damage(mut self, damage: u32, category: DamageCategory) -> Self {
        self.damage = damage;
        self.damage_category = category;
        self
    }

    pub fn with_heal(mut self, heal: u32) -> Self {
        self.heal = heal;
        self
    }

    pub fn with_shield(mut self, shield: u32) -> Self {
        self.shield = shield;
        self
    }

    pub fn with_max_targets(mut self, max_targets: u8) -> Self {
        self.max_targets = max_targets;
        self
    }

    pub fn with_cooldown(mut self, cooldown: u32) -> Self {
        self.base_cooldown = cooldown;
        self
    }

    pub fn with_charge_requirement(mut self, requirement: u32) -> Self {
        self.charge_requirement = requirement;
        self
    }

    pub fn with_effect(mut self, effect: StatusTemplate) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_scaling(mut self, scaling: Arc<dyn DamageScaling>) -> Self {
        self.scaling = Some(scaling);
        self
    }

    pub fn reviving(mut self) -> Self {
        self.revives = true;
        self
    }

    /// Usable iff off cooldown and the caster holds enough charge.
    pub fn is_usable(&self, caster_charge: u32) -> bool {
        self.category.is_activatable()
            && self.current_cooldown == 0
            && caster_charge >= self.charge_requirement
    }

    /// Deals damage, either flat or through a scaling strategy.
    pub fn is_damaging(&self) -> bool {
        self.damage > 0 || self.scaling.is_some()
    }

    /// Damage to an enemy is subject to a hit roll; everything else lands.
    pub fn requires_hit_roll(&self, caster: &Actor, target: &Actor) -> bool {
        self.is_damaging() && caster.team != target.team
    }

    pub fn start_cooldown(&mut self) {
        self.current_cooldown = self.base_cooldown;
    }

    pub fn tick_cooldown(&mut self) {
        self.current_cooldown = self.current_cooldown.saturating_sub(1);
    }

    /// Shift the current cooldown, flooring at zero.
    pub fn shift_cooldown(&mut self, delta: i32) {
        let shifted = self.current_cooldown as i64 + delta as i64;
        self.current_cooldown = shifted.max(0) as u32;
    }
}

/// Fixed-capacity move slots.
pub type Abilities = ArrayVec<Ability, { BattleConfig::MAX_ABILITIES }>;

/// Lookup helpers over an actor's move slots.
pub trait AbilitySlots {
    fn by_category(&self, category: AbilityCategory) -> Option<&Ability>;
    fn by_category_mut(&mut self, category: AbilityCategory) -> Option<&mut Ability>;
}

impl AbilitySlots for Abilities {
    fn by_category(&self, category: AbilityCategory) -> Option<&Ability> {
        self.iter().find(|a| a.category == category)
    }

    fn by_category_mut(&mut self, category: AbilityCategory) -> Option<&mut Ability> {
        self.iter_mut().find(|a| a.category == category)
    }
}
