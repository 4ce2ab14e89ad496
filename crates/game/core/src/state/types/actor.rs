//! Actor state and its mutation surface.
//!
//! Every mutation that changes observable combat state goes through a method
//! on [`Actor`] that emits the matching [`BattleEvent`]. Passive rules and the
//! resolver use the same methods, so their effects are observable through the
//! same topics.
//!
//! # Invariants
//!
//! - `hp <= max_hp`
//! - `is_dead` iff the actor reached 0 HP and has not been revived
//! - dead actors accept no new damage, healing, shields or effects; only
//!   [`Actor::revive`] brings them back

use crate::combat::{self, DamageCategory, InvariantViolation};
use crate::events::{BattleEvent, Emitter};
use crate::state::{
    Abilities, AbilityCategory, AbilitySlots, Ability, ActorId, ArchetypeId, EffectId,
    StatusEffect, StatusEffects, StatusKind, TeamId,
};
use crate::stats::{self, CombatStats, StatKind};

/// Base scalars every actor starts from.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BaseStats {
    pub speed: f32,
    pub accuracy: f32,
    pub dodge: f32,
    pub crit_rate: f32,
    pub crit_damage: f32,
    pub damage_multiplier: f32,
    /// One value per resisted category, indexed by
    /// [`DamageCategory::accumulator_index`].
    pub resistances: [f32; 4],
}

impl Default for BaseStats {
    fn default() -> Self {
        Self {
            speed: 10.0,
            accuracy: 1.0,
            dodge: 0.0,
            crit_rate: 0.05,
            crit_damage: 1.5,
            damage_multiplier: 1.0,
            resistances: [0.0; 4],
        }
    }
}

/// A battling character.
#[derive(Clone, Debug)]
pub struct Actor {
    pub id: ActorId,
    pub name: String,
    pub archetype: ArchetypeId,
    pub team: TeamId,

    pub hp: u32,
    pub max_hp: u32,
    /// Flat absorption pool, drained before HP.
    pub shield: u32,
    pub charge: u32,
    pub charge_required: u32,
    pub base: BaseStats,

    pub statuses: StatusEffects,
    pub abilities: Abilities,

    /// Populated once when the battle is assembled.
    pub allies: Vec<ActorId>,
    pub enemies: Vec<ActorId>,

    pub has_acted: bool,
    pub used_one_time_passive: bool,
    pub is_dead: bool,
}

impl Actor {
    pub fn new(name: impl Into<String>, archetype: ArchetypeId, team: TeamId, max_hp: u32) -> Self {
        Self {
            id: ActorId::default(),
            name: name.into(),
            archetype,
            team,
            hp: max_hp,
            max_hp,
            shield: 0,
            charge: 0,
            charge_required: 100,
            base: BaseStats::default(),
            statuses: StatusEffects::new(),
            abilities: Abilities::new(),
            allies: Vec::new(),
            enemies: Vec::new(),
            has_acted: false,
            used_one_time_passive: false,
            is_dead: false,
        }
    }

    pub fn with_base(mut self, base: BaseStats) -> Self {
        self.base = base;
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.base.speed = speed;
        self
    }

    pub fn with_charge_required(mut self, required: u32) -> Self {
        self.charge_required = required;
        self
    }

    pub fn with_resistance(mut self, category: DamageCategory, value: f32) -> Self {
        if let Some(index) = category.accumulator_index() {
            self.base.resistances[index] = value;
        }
        self
    }

    /// Adds a move slot. Slots beyond capacity are dropped with a warning.
    pub fn with_ability(mut self, ability: Ability) -> Self {
        if let Err(overflow) = self.abilities.try_push(ability) {
            tracing::warn!(
                target: "arena::combat",
                actor = %self.name,
                ability = %overflow.element().name,
                "move slots full, ability dropped"
            );
        }
        self
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[inline]
    pub fn is_alive(&self) -> bool {
        !self.is_dead
    }

    pub fn is_stunned(&self) -> bool {
        self.statuses.is_stunned()
    }

    pub fn ability(&self, category: AbilityCategory) -> Option<&Ability> {
        self.abilities.by_category(category)
    }

    pub fn ability_mut(&mut self, category: AbilityCategory) -> Option<&mut Ability> {
        self.abilities.by_category_mut(category)
    }

    pub fn accuracy(&self) -> f32 {
        stats::fold(StatKind::Accuracy, self.base.accuracy, &self.statuses, None)
    }

    pub fn dodge(&self) -> f32 {
        stats::fold(StatKind::Dodge, self.base.dodge, &self.statuses, None)
    }

    /// Live resistance against `category`. True damage always reads 0.
    pub fn resistance(&self, category: DamageCategory) -> f32 {
        match category.accumulator_index() {
            Some(index) => stats::fold(
                StatKind::Resistance,
                self.base.resistances[index],
                &self.statuses,
                Some(category),
            ),
            None => 0.0,
        }
    }

    pub fn speed(&self) -> f32 {
        stats::fold(StatKind::Speed, self.base.speed, &self.statuses, None)
    }

    pub fn crit_rate(&self) -> f32 {
        stats::fold(StatKind::CritRate, self.base.crit_rate, &self.statuses, None)
    }

    pub fn crit_damage(&self) -> f32 {
        stats::fold(StatKind::CritDamage, self.base.crit_damage, &self.statuses, None)
    }

    pub fn damage_multiplier(&self) -> f32 {
        stats::fold(
            StatKind::DamageMultiplier,
            self.base.damage_multiplier,
            &self.statuses,
            None,
        )
    }

    pub fn combat_stats(&self) -> CombatStats {
        CombatStats {
            accuracy: self.accuracy(),
            dodge: self.dodge(),
            speed: self.speed(),
            crit_rate: self.crit_rate(),
            crit_damage: self.crit_damage(),
            damage_multiplier: self.damage_multiplier(),
        }
    }

    // ========================================================================
    // Mutation surface
    // ========================================================================

    /// Apply incoming damage.
    ///
    /// Resistance is applied first (skipped for true damage), then the shield
    /// absorbs as much as it can and the remainder reduces HP. Returns the
    /// mitigated total before the shield split.
    pub fn take_damage(
        &mut self,
        amount: i32,
        category: DamageCategory,
        source: Option<ActorId>,
        events: &mut Emitter,
    ) -> Result<u32, InvariantViolation> {
        if amount < 0 {
            tracing::warn!(
                target: "arena::combat",
                target_actor = %self.id,
                amount,
                "negative damage rejected"
            );
            return Err(InvariantViolation::NegativeDamage {
                target: self.id,
                amount,
            });
        }
        if self.is_dead {
            return Ok(0);
        }

        let mitigated = combat::mitigate(amount as u32, category, self.resistance(category));
        let split = combat::split_shield(mitigated, self.shield);
        self.shield -= split.absorbed;
        self.hp = self.hp.saturating_sub(split.hp_loss);

        events.emit(BattleEvent::DamageDealt {
            source,
            target: self.id,
            amount: mitigated,
            absorbed: split.absorbed,
            hp_loss: split.hp_loss,
            category,
        });

        if self.hp == 0 {
            self.is_dead = true;
            events.emit(BattleEvent::CharacterDied {
                actor: self.id,
                killer: source,
            });
        }
        Ok(mitigated)
    }

    /// Heal up to `max_hp`. Returns the HP actually restored.
    pub fn heal(&mut self, amount: u32, source: Option<ActorId>, events: &mut Emitter) -> u32 {
        if self.is_dead || amount == 0 {
            return 0;
        }
        let healed = amount.min(self.max_hp - self.hp);
        self.hp += healed;
        events.emit(BattleEvent::Healed {
            source,
            target: self.id,
            amount: healed,
        });
        healed
    }

    pub fn add_shield(&mut self, amount: u32, source: Option<ActorId>, events: &mut Emitter) -> u32 {
        if self.is_dead || amount == 0 {
            return 0;
        }
        self.shield = self.shield.saturating_add(amount);
        events.emit(BattleEvent::ShieldGained {
            source,
            target: self.id,
            amount,
        });
        amount
    }

    pub fn increase_charge(&mut self, amount: u32, events: &mut Emitter) {
        if amount == 0 {
            return;
        }
        self.charge = self.charge.saturating_add(amount);
        events.emit(BattleEvent::ChargeChanged {
            actor: self.id,
            delta: amount as i64,
            charge: self.charge,
        });
    }

    /// Lower charge, flooring at zero.
    pub fn reduce_charge(&mut self, amount: u32, events: &mut Emitter) {
        let reduced = amount.min(self.charge);
        if reduced == 0 {
            return;
        }
        self.charge -= reduced;
        events.emit(BattleEvent::ChargeChanged {
            actor: self.id,
            delta: -(reduced as i64),
            charge: self.charge,
        });
    }

    /// Attach a bound effect. Shield effects grant their shield immediately.
    ///
    /// Returns false when the actor is dead and the effect was dropped.
    pub fn add_status_effect(&mut self, effect: StatusEffect, events: &mut Emitter) -> bool {
        if self.is_dead {
            return false;
        }
        events.emit(BattleEvent::StatusApplied {
            source: effect.source,
            target: self.id,
            effect: effect.id,
            name: effect.name().to_owned(),
            kind: effect.kind(),
            is_debuff: effect.is_debuff(),
        });
        if effect.kind() == StatusKind::Shield {
            let amount = effect.magnitude().max(0.0).round() as u32;
            self.add_shield(amount, effect.source, events);
        }
        self.statuses.push(effect);
        true
    }

    pub fn remove_status_effect(&mut self, id: EffectId, events: &mut Emitter) -> Option<StatusEffect> {
        let removed = self.statuses.remove(id)?;
        events.emit(BattleEvent::StatusRemoved {
            target: self.id,
            effect: removed.id,
            name: removed.name().to_owned(),
        });
        Some(removed)
    }

    /// Turn-end tick: every timed effect loses one turn and the expired ones
    /// are removed, each reported once.
    pub fn expire_effects(&mut self, events: &mut Emitter) -> usize {
        let expired = self.statuses.tick_and_expire();
        for effect in &expired {
            events.emit(BattleEvent::StatusExpired {
                target: self.id,
                effect: effect.id,
                name: effect.name().to_owned(),
            });
        }
        expired.len()
    }

    /// Bring a dead actor back with `hp` (clamped to `1..=max_hp`).
    pub fn revive(&mut self, hp: u32, source: Option<ActorId>, events: &mut Emitter) -> bool {
        if !self.is_dead {
            return false;
        }
        self.is_dead = false;
        self.hp = hp.clamp(1, self.max_hp.max(1));
        self.shield = 0;
        events.emit(BattleEvent::CharacterRevived {
            actor: self.id,
            source,
            hp: self.hp,
        });
        true
    }

    // ========================================================================
    // Per-turn instructions
    // ========================================================================

    /// Snapshot of the per-turn instructions due at this actor's turn start,
    /// in effect list order.
    pub fn turn_instructions(&self) -> Vec<TurnInstruction> {
        self.statuses
            .iter()
            .filter(|e| e.kind().is_per_turn_instruction())
            .map(|e| {
                let magnitude = e.magnitude();
                match e.kind() {
                    StatusKind::DamageOverTime => TurnInstruction::Damage {
                        effect: e.id,
                        amount: magnitude.round() as i32,
                        category: e.template.category.unwrap_or(DamageCategory::True),
                        source: e.source,
                    },
                    StatusKind::HealOverTime => TurnInstruction::Heal {
                        effect: e.id,
                        amount: magnitude.max(0.0).round() as u32,
                        source: e.source,
                    },
                    StatusKind::ShieldOverTime => TurnInstruction::Shield {
                        effect: e.id,
                        amount: magnitude.max(0.0).round() as u32,
                        source: e.source,
                    },
                    _ => TurnInstruction::ShiftDurations {
                        effect: e.id,
                        delta: magnitude.round() as i32,
                    },
                }
            })
            .collect()
    }

    /// Shift the remaining duration of every timed debuff except `except`.
    pub fn shift_debuff_durations(&mut self, except: EffectId, delta: i32) {
        for effect in self.statuses.iter_mut() {
            if effect.id != except && effect.is_debuff() {
                effect.remaining.shift(delta);
            }
        }
    }

    /// Apply cooldown-modifier effects to the abilities they target.
    ///
    /// An effect without an ability target applies to every activatable slot.
    pub fn apply_cooldown_modifiers(&mut self) {
        let modifiers: Vec<(Option<AbilityCategory>, i32)> = self
            .statuses
            .iter()
            .filter(|e| e.kind() == StatusKind::CooldownModifier)
            .map(|e| (e.template.ability_target, e.magnitude().round() as i32))
            .collect();

        for (target, delta) in modifiers {
            for ability in self.abilities.iter_mut() {
                let matches = match target {
                    Some(category) => ability.category == category,
                    None => ability.category.is_activatable(),
                };
                if matches {
                    ability.shift_cooldown(delta);
                }
            }
        }
    }

    /// Round-start bookkeeping for this actor.
    pub fn begin_round(&mut self) {
        for ability in self.abilities.iter_mut() {
            ability.tick_cooldown();
        }
        self.has_acted = false;
    }
}

/// One per-turn action taken by an effect at its owner's turn start.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TurnInstruction {
    Damage {
        effect: EffectId,
        amount: i32,
        category: DamageCategory,
        source: Option<ActorId>,
    },
    Heal {
        effect: EffectId,
        amount: u32,
        source: Option<ActorId>,
    },
    Shield {
        effect: EffectId,
        amount: u32,
        source: Option<ActorId>,
    },
    ShiftDurations {
        effect: EffectId,
        delta: i32,
    },
}
