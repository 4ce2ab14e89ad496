//! Character data records.
//!
//! One [`ArchetypeRecord`] per playable archetype: name, HP, speed, signature
//! charge requirement and exactly four move slots (passive, normal, skill,
//! signature). Records are plain data; [`ArchetypeRecord::to_actor`] turns
//! one into a battle-ready [`Actor`].

use std::sync::Arc;

use arena_core::state::{DebuffCountScaling, MissingHpScaling};
use arena_core::{
    Ability, AbilityCategory, Actor, ArchetypeId, BaseStats, DamageCategory, DamageScaling,
    EffectDuration, StatusKind, StatusTemplate, TargetingMode, TeamId,
};

use crate::rules::RuleSpec;

/// Errors raised while turning records into actors.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum RosterError {
    #[error("unknown archetype '{0}'")]
    UnknownArchetype(String),

    #[error("archetype '{key}' has zero hp")]
    ZeroHp { key: String },

    #[error("archetype id {id} is used by both '{first}' and '{second}'")]
    DuplicateId {
        id: ArchetypeId,
        first: String,
        second: String,
    },

    #[error("archetype key '{0}' appears twice")]
    DuplicateKey(String),
}

/// All archetypes available to a match.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Roster {
    pub archetypes: Vec<ArchetypeRecord>,
}

impl Roster {
    pub fn find(&self, key: &str) -> Option<&ArchetypeRecord> {
        self.archetypes.iter().find(|a| a.key == key)
    }

    /// Reject duplicate keys or ids and unplayable records.
    pub fn validate(&self) -> Result<(), RosterError> {
        for (index, record) in self.archetypes.iter().enumerate() {
            if record.hp == 0 {
                return Err(RosterError::ZeroHp {
                    key: record.key.clone(),
                });
            }
            for earlier in &self.archetypes[..index] {
                if earlier.key == record.key {
                    return Err(RosterError::DuplicateKey(record.key.clone()));
                }
                if earlier.id == record.id {
                    return Err(RosterError::DuplicateId {
                        id: ArchetypeId(record.id),
                        first: earlier.key.clone(),
                        second: record.key.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Build an actor for `team` from the archetype named `key`.
    pub fn spawn(&self, key: &str, team: TeamId) -> Result<Actor, RosterError> {
        let record = self
            .find(key)
            .ok_or_else(|| RosterError::UnknownArchetype(key.to_owned()))?;
        record.to_actor(team)
    }
}

/// Per-category resistances in `[-1, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ResistanceRecord {
    pub physical: f32,
    pub fire: f32,
    pub frost: f32,
    pub shadow: f32,
}

impl ResistanceRecord {
    fn as_array(self) -> [f32; 4] {
        [self.physical, self.fire, self.frost, self.shadow]
    }
}

/// Roster entry for one archetype.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArchetypeRecord {
    /// Stable lookup key used by match configs.
    pub key: String,
    pub id: u16,
    pub name: String,
    pub hp: u32,
    pub speed: f32,
    pub charge_required: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub resistances: ResistanceRecord,
    #[cfg_attr(feature = "serde", serde(default = "default_accuracy"))]
    pub accuracy: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub dodge: f32,
    #[cfg_attr(feature = "serde", serde(default = "default_crit_rate"))]
    pub crit_rate: f32,
    pub passive: MoveRecord,
    pub normal: MoveRecord,
    pub skill: MoveRecord,
    pub signature: MoveRecord,
    /// Passive rules carried by this archetype.
    #[cfg_attr(feature = "serde", serde(default))]
    pub rules: Vec<RuleSpec>,
}

#[cfg(feature = "serde")]
fn default_accuracy() -> f32 {
    BaseStats::default().accuracy
}

#[cfg(feature = "serde")]
fn default_crit_rate() -> f32 {
    BaseStats::default().crit_rate
}

impl ArchetypeRecord {
    pub fn archetype(&self) -> ArchetypeId {
        ArchetypeId(self.id)
    }

    pub fn to_actor(&self, team: TeamId) -> Result<Actor, RosterError> {
        if self.hp == 0 {
            return Err(RosterError::ZeroHp {
                key: self.key.clone(),
            });
        }
        let base = BaseStats {
            speed: self.speed,
            accuracy: self.accuracy,
            dodge: self.dodge,
            crit_rate: self.crit_rate,
            resistances: self.resistances.as_array(),
            ..BaseStats::default()
        };
        let slots = [
            (AbilityCategory::Passive, &self.passive),
            (AbilityCategory::Normal, &self.normal),
            (AbilityCategory::Skill, &self.skill),
            (AbilityCategory::Signature, &self.signature),
        ];

        let mut actor = Actor::new(self.name.clone(), self.archetype(), team, self.hp)
            .with_base(base)
            .with_charge_required(self.charge_required);
        for (category, record) in slots {
            let requirement = if category.is_signature() {
                self.charge_required
            } else {
                0
            };
            actor = actor.with_ability(record.to_ability(category, requirement));
        }
        Ok(actor)
    }
}

/// One move slot.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveRecord {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub cooldown: u32,
    #[cfg_attr(feature = "serde", serde(default = "default_targeting"))]
    pub targeting: TargetingMode,
    #[cfg_attr(feature = "serde", serde(default))]
    pub damage: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub damage_category: DamageCategory,
    #[cfg_attr(feature = "serde", serde(default))]
    pub heal: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub shield: u32,
    #[cfg_attr(feature = "serde", serde(default = "default_max_targets"))]
    pub max_targets: u8,
    #[cfg_attr(feature = "serde", serde(default))]
    pub revives: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub scaling: Option<ScalingSpec>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub effects: Vec<EffectRecord>,
}

#[cfg(feature = "serde")]
fn default_targeting() -> TargetingMode {
    TargetingMode::Enemy
}

#[cfg(feature = "serde")]
fn default_max_targets() -> u8 {
    1
}

impl MoveRecord {
    /// A move with only a name; every payload empty.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            cooldown: 0,
            targeting: TargetingMode::Enemy,
            damage: 0,
            damage_category: DamageCategory::Physical,
            heal: 0,
            shield: 0,
            max_targets: 1,
            revives: false,
            scaling: None,
            effects: Vec::new(),
        }
    }

    pub fn to_ability(&self, category: AbilityCategory, charge_requirement: u32) -> Ability {
        let mut ability = Ability::new(self.name.clone(), category, self.targeting)
            .with_description(self.description.clone())
            .with_damage(self.damage, self.damage_category)
            .with_heal(self.heal)
            .with_shield(self.shield)
            .with_max_targets(self.max_targets)
            .with_cooldown(self.cooldown)
            .with_charge_requirement(charge_requirement);
        if self.revives {
            ability = ability.reviving();
        }
        if let Some(scaling) = &self.scaling {
            ability = ability.with_scaling(scaling.build());
        }
        for effect in &self.effects {
            ability = ability.with_effect(effect.to_template());
        }
        ability
    }
}

/// Damage strategies available to data files.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScalingSpec {
    /// Base damage plus `ratio` of the target's missing HP.
    MissingHp { ratio: f32 },
    /// Base damage plus `per_debuff` per debuff on the target.
    DebuffCount { per_debuff: u32 },
}

impl ScalingSpec {
    pub fn build(self) -> Arc<dyn DamageScaling> {
        match self {
            Self::MissingHp { ratio } => Arc::new(MissingHpScaling { ratio }),
            Self::DebuffCount { per_debuff } => Arc::new(DebuffCountScaling { per_debuff }),
        }
    }
}

/// A status effect applied on hit. Omitted fields take template defaults.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectRecord {
    pub name: String,
    pub kind: StatusKind,
    /// `None` means permanent.
    #[cfg_attr(feature = "serde", serde(default))]
    pub turns: Option<i32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub magnitude: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub category: Option<DamageCategory>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub debuff: bool,
    #[cfg_attr(feature = "serde", serde(default = "default_chance"))]
    pub chance: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub hidden: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub ability_target: Option<AbilityCategory>,
}

#[cfg(feature = "serde")]
fn default_chance() -> f32 {
    1.0
}

impl EffectRecord {
    pub fn to_template(&self) -> StatusTemplate {
        let duration = self
            .turns
            .map_or(EffectDuration::Permanent, EffectDuration::Turns);
        let mut template = StatusTemplate::new(self.name.clone(), self.kind, duration, self.magnitude)
            .with_chance(self.chance);
        if self.debuff {
            template = template.debuff();
        }
        if let Some(category) = self.category {
            template = template.with_category(category);
        }
        if self.hidden {
            template = template.hidden();
        }
        if let Some(target) = self.ability_target {
            template = template.targeting(target);
        }
        template
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(key: &str, id: u16) -> ArchetypeRecord {
        let mut normal = MoveRecord::named("Jab");
        normal.damage = 12;
        let mut signature = MoveRecord::named("Finisher");
        signature.damage = 60;
        signature.effects.push(EffectRecord {
            name: "Bleed".into(),
            kind: StatusKind::DamageOverTime,
            turns: Some(2),
            magnitude: 5.0,
            category: Some(DamageCategory::Physical),
            debuff: true,
            chance: 1.0,
            hidden: false,
            ability_target: None,
        });
        ArchetypeRecord {
            key: key.into(),
            id,
            name: key.to_uppercase(),
            hp: 200,
            speed: 11.0,
            charge_required: 80,
            resistances: ResistanceRecord {
                fire: 0.25,
                ..ResistanceRecord::default()
            },
            accuracy: 1.0,
            dodge: 0.1,
            crit_rate: 0.05,
            passive: MoveRecord::named("Grit"),
            normal,
            skill: MoveRecord::named("Guard"),
            signature,
            rules: Vec::new(),
        }
    }

    #[test]
    fn actor_gets_four_slots_and_signature_requirement() {
        let actor = record("brawler", 3).to_actor(TeamId::AWAY).unwrap();
        assert_eq!(actor.abilities.len(), 4);
        assert_eq!(actor.archetype, ArchetypeId(3));
        assert_eq!(actor.charge_required, 80);
        assert_eq!(actor.resistance(DamageCategory::Fire), 0.25);

        let signature = actor.ability(AbilityCategory::Signature).unwrap();
        assert_eq!(signature.charge_requirement, 80);
        assert_eq!(signature.effects[0].duration, EffectDuration::Turns(2));
        assert!(signature.effects[0].is_debuff);
        assert_eq!(
            actor.ability(AbilityCategory::Normal).unwrap().charge_requirement,
            0
        );
    }

    #[test]
    fn validate_rejects_duplicates() {
        let roster = Roster {
            archetypes: vec![record("a", 1), record("b", 1)],
        };
        assert!(matches!(
            roster.validate(),
            Err(RosterError::DuplicateId { .. })
        ));

        let roster = Roster {
            archetypes: vec![record("a", 1), record("a", 2)],
        };
        assert_eq!(roster.validate(), Err(RosterError::DuplicateKey("a".into())));
    }

    #[test]
    fn spawn_reports_unknown_keys() {
        let roster = Roster {
            archetypes: vec![record("a", 1)],
        };
        assert!(roster.spawn("a", TeamId::HOME).is_ok());
        assert_eq!(
            roster.spawn("zz", TeamId::HOME).unwrap_err(),
            RosterError::UnknownArchetype("zz".into())
        );
    }
}
