//! Status effect system for actors.
//!
//! Status effects are timed modifiers or per-turn instructions attached to an
//! actor. Templates live on abilities; each application binds a template to a
//! fresh [`StatusEffect`] instance with its own [`EffectId`].
//!
//! # Turn-based Duration
//!
//! Durations count the owner's turn ends. An effect applied with
//! `Turns(d)` expires at the d-th turn end of its owner, after which it is
//! removed and reported exactly once.

use crate::combat::DamageCategory;
use crate::state::{AbilityCategory, ActorId, EffectId};
use crate::stats::StatKind;

/// Types of status effects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum StatusKind {
    // ========================================================================
    // Per-turn instructions (run at the owner's turn start)
    // ========================================================================
    /// Deals `magnitude` damage of the bound category each turn.
    DamageOverTime,

    /// Heals `magnitude` each turn.
    HealOverTime,

    /// Grants `magnitude` shield each turn.
    ShieldOverTime,

    /// Shifts the remaining duration of the owner's other debuffs by `magnitude`.
    DurationModifier,

    /// Shifts the current cooldown of the owner's abilities of the targeted
    /// category by `magnitude` each turn (negative speeds them up).
    CooldownModifier,

    // ========================================================================
    // Stat modifiers (folded by the dynamic stat getters)
    // ========================================================================
    Resistance,
    Accuracy,
    Dodge,
    Speed,
    CritRate,
    CritDamage,
    DamageMultiplier,

    // ========================================================================
    // Special
    // ========================================================================
    /// Owner's turns are skipped while active.
    Stun,

    /// Grants `magnitude` shield once, on application.
    Shield,

    /// Marker with no engine semantics; passive rules read it by tag.
    Custom,
}

impl StatusKind {
    /// True for effects that run an instruction at the owner's turn start.
    pub const fn is_per_turn_instruction(self) -> bool {
        matches!(
            self,
            Self::DamageOverTime | Self::HealOverTime | Self::ShieldOverTime | Self::DurationModifier
        )
    }

    /// The dynamic stat this effect modifies, if any.
    pub const fn stat(self) -> Option<StatKind> {
        match self {
            Self::Resistance => Some(StatKind::Resistance),
            Self::Accuracy => Some(StatKind::Accuracy),
            Self::Dodge => Some(StatKind::Dodge),
            Self::Speed => Some(StatKind::Speed),
            Self::CritRate => Some(StatKind::CritRate),
            Self::CritDamage => Some(StatKind::CritDamage),
            Self::DamageMultiplier => Some(StatKind::DamageMultiplier),
            _ => None,
        }
    }
}

/// Remaining lifetime of an effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectDuration {
    /// Owner turn ends left. Expired at `<= 0`.
    Turns(i32),
    /// Never ticks down; only explicit removal ends it.
    Permanent,
}

impl EffectDuration {
    pub const fn is_expired(self) -> bool {
        matches!(self, Self::Turns(n) if n <= 0)
    }

    pub const fn is_permanent(self) -> bool {
        matches!(self, Self::Permanent)
    }

    /// One turn-end tick.
    pub fn tick(&mut self) {
        if let Self::Turns(n) = self {
            *n -= 1;
        }
    }

    /// Shift a timed duration; permanent effects are unaffected.
    pub fn shift(&mut self, delta: i32) {
        if let Self::Turns(n) = self {
            *n += delta;
        }
    }

    /// Remaining turns for display; permanent maps to -1.
    pub const fn display_turns(self) -> i32 {
        match self {
            Self::Turns(n) => n,
            Self::Permanent => -1,
        }
    }
}

/// Immutable description of an effect, carried by abilities and rules.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusTemplate {
    pub name: String,
    pub kind: StatusKind,
    pub duration: EffectDuration,
    pub magnitude: f32,
    /// Damage category binding (DoT damage type, resistance category).
    /// `None` on a resistance modifier means "all categories".
    pub category: Option<DamageCategory>,
    pub is_debuff: bool,
    /// Probability in `[0, 1]` that one application lands.
    pub apply_chance: f32,
    /// Whether presentation layers should show this effect.
    pub displayed: bool,
    /// Ability category targeted by cooldown modifiers.
    pub ability_target: Option<AbilityCategory>,
    /// Free-form tag for `Custom` effects.
    pub tag: Option<String>,
}

impl StatusTemplate {
    pub fn new(
        name: impl Into<String>,
        kind: StatusKind,
        duration: EffectDuration,
        magnitude: f32,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            duration,
            magnitude,
            category: None,
            is_debuff: false,
            apply_chance: 1.0,
            displayed: true,
            ability_target: None,
            tag: None,
        }
    }

    pub fn debuff(mut self) -> Self {
        self.is_debuff = true;
        self
    }

    pub fn with_category(mut self, category: DamageCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_chance(mut self, chance: f32) -> Self {
        self.apply_chance = chance.clamp(0.0, 1.0);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    pub fn targeting(mut self, category: AbilityCategory) -> Self {
        self.ability_target = Some(category);
        self
    }

    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

/// A single applied status effect instance.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusEffect {
    pub id: EffectId,
    /// Attribution only; never used for lifetime decisions.
    pub source: Option<ActorId>,
    pub remaining: EffectDuration,
    pub template: StatusTemplate,
}

impl StatusEffect {
    /// Clone-and-bind a template into a fresh instance.
    pub fn bind(template: &StatusTemplate, id: EffectId, source: Option<ActorId>) -> Self {
        Self {
            id,
            source,
            remaining: template.duration,
            template: template.clone(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.template.name
    }

    #[inline]
    pub fn kind(&self) -> StatusKind {
        self.template.kind
    }

    #[inline]
    pub fn magnitude(&self) -> f32 {
        self.template.magnitude
    }

    #[inline]
    pub fn is_debuff(&self) -> bool {
        self.template.is_debuff
    }
}

/// Active status effects on an actor, in application order.
///
/// Instances never merge: applying the same template twice yields two
/// entries.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatusEffects {
    effects: Vec<StatusEffect>,
}

impl StatusEffects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, effect: StatusEffect) {
        self.effects.push(effect);
    }

    /// Removes an effect by instance id.
    pub fn remove(&mut self, id: EffectId) -> Option<StatusEffect> {
        let index = self.effects.iter().position(|e| e.id == id)?;
        Some(self.effects.remove(index))
    }

    pub fn get(&self, id: EffectId) -> Option<&StatusEffect> {
        self.effects.iter().find(|e| e.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut StatusEffect> {
        self.effects.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn has_kind(&self, kind: StatusKind) -> bool {
        self.effects.iter().any(|e| e.kind() == kind)
    }

    pub fn is_stunned(&self) -> bool {
        self.has_kind(StatusKind::Stun)
    }

    /// Sum of magnitudes of effects modifying `stat`, optionally narrowed to a
    /// damage category (effects without a category apply to every category).
    pub fn stat_total(&self, stat: StatKind, category: Option<DamageCategory>) -> f32 {
        self.effects
            .iter()
            .filter(|e| e.kind().stat() == Some(stat))
            .filter(|e| match (e.template.category, category) {
                (Some(bound), Some(wanted)) => bound == wanted,
                _ => true,
            })
            .map(StatusEffect::magnitude)
            .sum()
    }

    /// Ticks every timed effect once and removes the expired ones, returning
    /// them in application order.
    pub fn tick_and_expire(&mut self) -> Vec<StatusEffect> {
        for effect in &mut self.effects {
            effect.remaining.tick();
        }
        let (expired, active): (Vec<_>, Vec<_>) = self
            .effects
            .drain(..)
            .partition(|e| e.remaining.is_expired());
        self.effects = active;
        expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bind(template: &StatusTemplate, id: u64) -> StatusEffect {
        StatusEffect::bind(template, EffectId(id), None)
    }

    #[test]
    fn duration_expires_after_exact_number_of_ticks() {
        let template = StatusTemplate::new("Burn", StatusKind::DamageOverTime, EffectDuration::Turns(3), 5.0);
        let mut effects = StatusEffects::new();
        effects.push(bind(&template, 1));

        assert!(effects.tick_and_expire().is_empty());
        assert!(effects.tick_and_expire().is_empty());
        let expired = effects.tick_and_expire();
        assert_eq!(expired.len(), 1);
        assert!(effects.is_empty());
        assert!(effects.tick_and_expire().is_empty());
    }

    #[test]
    fn permanent_effects_never_expire() {
        let template = StatusTemplate::new("Bulwark", StatusKind::Resistance, EffectDuration::Permanent, 0.1);
        let mut effects = StatusEffects::new();
        effects.push(bind(&template, 1));
        for _ in 0..50 {
            assert!(effects.tick_and_expire().is_empty());
        }
        assert_eq!(effects.len(), 1);
    }

    #[test]
    fn same_template_applied_twice_yields_independent_instances() {
        let template = StatusTemplate::new("Chill", StatusKind::Speed, EffectDuration::Turns(2), -2.0).debuff();
        let mut effects = StatusEffects::new();
        effects.push(bind(&template, 1));
        effects.push(bind(&template, 2));
        assert_eq!(effects.len(), 2);
        assert_eq!(effects.stat_total(StatKind::Speed, None), -4.0);

        assert!(effects.remove(EffectId(1)).is_some());
        assert!(effects.get(EffectId(2)).is_some());
        assert_eq!(effects.stat_total(StatKind::Speed, None), -2.0);
    }

    #[test]
    fn stat_total_respects_category_binding() {
        let fire = StatusTemplate::new("Fireward", StatusKind::Resistance, EffectDuration::Turns(2), 0.3)
            .with_category(DamageCategory::Fire);
        let all = StatusTemplate::new("Stoneskin", StatusKind::Resistance, EffectDuration::Turns(2), 0.1);
        let mut effects = StatusEffects::new();
        effects.push(bind(&fire, 1));
        effects.push(bind(&all, 2));

        let fire_total = effects.stat_total(StatKind::Resistance, Some(DamageCategory::Fire));
        let frost_total = effects.stat_total(StatKind::Resistance, Some(DamageCategory::Frost));
        assert!((fire_total - 0.4).abs() < 1e-6);
        assert!((frost_total - 0.1).abs() < 1e-6);
    }
}
