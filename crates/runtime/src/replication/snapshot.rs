//! Wire-format state snapshots.
//!
//! A [`BattleSnapshot`] is a display-ready copy of authoritative state,
//! keyed by plain integer ids. Every snapshot carries a SHA-256 digest over
//! its canonical bincode encoding; observers recompute it and drop
//! mismatches, so a mirrored view never drifts from what the host sent.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use arena_core::{
    Ability, AbilityCategory, Actor, Battle, StatusEffect, StatusKind, TargetingMode, TeamId,
    TurnPhase,
};

use super::codec::CodecError;

/// Authoritative state at one point of a battle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BattleSnapshot {
    /// Monotonic per host; observers ignore anything not newer than what they hold.
    pub sequence: u64,
    pub round: u32,
    pub phase: TurnPhase,
    pub current_actor: Option<u32>,
    pub current_team: Option<u8>,
    pub winner: Option<u8>,
    pub actors: Vec<ActorView>,
    pub turn_order: Vec<u32>,
    /// Hex SHA-256 of the snapshot encoded with an empty digest.
    pub digest: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActorView {
    pub id: u32,
    pub name: String,
    pub team_id: u8,
    pub hp: u32,
    pub max_hp: u32,
    pub shield: u32,
    pub sig_charge: u32,
    pub sig_charge_required: u32,
    pub is_dead: bool,
    pub is_stunned: bool,
    pub status_effects: Vec<StatusView>,
    pub abilities: Vec<AbilityView>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatusView {
    pub kind: StatusKind,
    pub name: String,
    pub source_name: Option<String>,
    /// `-1` for permanent effects.
    pub remaining_turns: i32,
    pub magnitude: f32,
    /// Free-form tag of a `Custom` effect.
    pub tag: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AbilityView {
    pub name: String,
    pub category: AbilityCategory,
    pub targeting: TargetingMode,
    /// `0` means unbounded.
    pub max_targets: u8,
    pub revives: bool,
    pub current_cooldown: u32,
    pub base_cooldown: u32,
    pub is_usable: bool,
}

impl BattleSnapshot {
    /// Capture `battle` and seal the result.
    pub fn capture(battle: &Battle, sequence: u64) -> Result<Self, CodecError> {
        let state = battle.state();
        let current = battle.current_actor();
        let actors = state
            .actors()
            .iter()
            .map(|actor| ActorView::capture(actor, battle))
            .collect();

        let mut snapshot = Self {
            sequence,
            round: battle.round(),
            phase: battle.phase(),
            current_actor: current.map(|id| id.0),
            current_team: current
                .and_then(|id| battle.actor(id))
                .map(|actor| actor.team.0),
            winner: battle.winner().map(|team| team.0),
            actors,
            turn_order: battle.turn_order().iter().map(|id| id.0).collect(),
            digest: String::new(),
        };
        snapshot.digest = snapshot.compute_digest()?;
        Ok(snapshot)
    }

    pub fn compute_digest(&self) -> Result<String, CodecError> {
        let unsealed = Self {
            digest: String::new(),
            ..self.clone()
        };
        let bytes = bincode::serialize(&unsealed)?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }

    /// True if the carried digest matches the content.
    pub fn verify(&self) -> bool {
        self.compute_digest()
            .is_ok_and(|digest| digest == self.digest)
    }

    pub fn actor(&self, id: u32) -> Option<&ActorView> {
        self.actors.iter().find(|actor| actor.id == id)
    }

    pub fn is_over(&self) -> bool {
        self.phase == TurnPhase::Ended
    }

    /// True while `team`'s current actor may act.
    pub fn is_turn_of(&self, team: TeamId) -> bool {
        self.phase == TurnPhase::AwaitingAction && self.current_team == Some(team.0)
    }

    /// Pretty JSON for debug dumps.
    pub fn to_json_pretty(&self) -> Result<String, CodecError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl ActorView {
    fn capture(actor: &Actor, battle: &Battle) -> Self {
        Self {
            id: actor.id.0,
            name: actor.name.clone(),
            team_id: actor.team.0,
            hp: actor.hp,
            max_hp: actor.max_hp,
            shield: actor.shield,
            sig_charge: actor.charge,
            sig_charge_required: actor.charge_required,
            is_dead: actor.is_dead,
            is_stunned: actor.is_stunned(),
            status_effects: actor
                .statuses
                .iter()
                .filter(|effect| effect.template.displayed)
                .map(|effect| StatusView::capture(effect, battle))
                .collect(),
            abilities: actor
                .abilities
                .iter()
                .map(|ability| AbilityView::capture(ability, actor.charge))
                .collect(),
        }
    }

    pub fn ability(&self, category: AbilityCategory) -> Option<&AbilityView> {
        self.abilities.iter().find(|a| a.category == category)
    }
}

impl StatusView {
    fn capture(effect: &StatusEffect, battle: &Battle) -> Self {
        Self {
            kind: effect.kind(),
            name: effect.name().to_owned(),
            source_name: effect
                .source
                .and_then(|id| battle.actor(id))
                .map(|source| source.name.clone()),
            remaining_turns: effect.remaining.display_turns(),
            magnitude: effect.magnitude(),
            tag: effect.template.tag.clone(),
        }
    }
}

impl AbilityView {
    fn capture(ability: &Ability, caster_charge: u32) -> Self {
        Self {
            name: ability.name.clone(),
            category: ability.category,
            targeting: ability.targeting,
            max_targets: ability.max_targets,
            revives: ability.revives,
            current_cooldown: ability.current_cooldown,
            base_cooldown: ability.base_cooldown,
            is_usable: ability.is_usable(caster_charge),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_core::{
        ActorId, ArchetypeId, DamageCategory, EffectDuration, ScriptedRng, StatusTemplate,
    };

    fn battle() -> Battle {
        let striker = Actor::new("Striker", ArchetypeId(1), TeamId::HOME, 100)
            .with_speed(20.0)
            .with_ability(
                Ability::new("Poison Dart", AbilityCategory::Normal, TargetingMode::Enemy)
                    .with_damage(10, DamageCategory::Physical)
                    .with_cooldown(1)
                    .with_effect(
                        StatusTemplate::new(
                            "Venom",
                            StatusKind::DamageOverTime,
                            EffectDuration::Turns(2),
                            4.0,
                        )
                        .debuff(),
                    )
                    .with_effect(
                        StatusTemplate::new(
                            "Marked",
                            StatusKind::Custom,
                            EffectDuration::Turns(2),
                            0.0,
                        )
                        .tagged("marked"),
                    ),
            );
        let dummy = Actor::new("Dummy", ArchetypeId(2), TeamId::AWAY, 80).with_ability(
            Ability::new("Poke", AbilityCategory::Normal, TargetingMode::Enemy)
                .with_damage(1, DamageCategory::Physical),
        );
        Battle::builder(vec![striker, dummy])
            .rng(ScriptedRng::constant(0.5))
            .build()
            .unwrap()
    }

    #[test]
    fn capture_reflects_live_actor_values() {
        let mut battle = battle();
        battle.start_battle().unwrap();
        battle
            .use_ability(ActorId(0), AbilityCategory::Normal, &[ActorId(1)])
            .unwrap();

        let snapshot = BattleSnapshot::capture(&battle, 3).unwrap();
        assert_eq!(snapshot.sequence, 3);
        assert_eq!(snapshot.round, 1);
        assert_eq!(snapshot.current_actor, Some(1));
        assert_eq!(snapshot.current_team, Some(TeamId::AWAY.0));

        let dummy = snapshot.actor(1).unwrap();
        let live = battle.actor(ActorId(1)).unwrap();
        assert_eq!(dummy.hp, live.hp);
        assert_eq!(dummy.status_effects.len(), 2);
        assert_eq!(dummy.status_effects[0].source_name.as_deref(), Some("Striker"));
        assert_eq!(dummy.status_effects[0].magnitude, 4.0);
        assert_eq!(dummy.status_effects[0].tag, None);
        assert_eq!(dummy.status_effects[1].kind, StatusKind::Custom);
        assert_eq!(dummy.status_effects[1].tag.as_deref(), Some("marked"));

        let striker = snapshot.actor(0).unwrap();
        assert_eq!(striker.sig_charge, live_charge(&battle, 0));
        let dart = striker.ability(AbilityCategory::Normal).unwrap();
        assert_eq!(dart.current_cooldown, 1);
        assert!(!dart.is_usable);
    }

    fn live_charge(battle: &Battle, id: u32) -> u32 {
        battle.actor(ActorId(id)).map_or(0, |a| a.charge)
    }

    #[test]
    fn digest_detects_tampering() {
        let mut battle = battle();
        battle.start_battle().unwrap();
        let mut snapshot = BattleSnapshot::capture(&battle, 1).unwrap();
        assert!(snapshot.verify());
        assert_eq!(snapshot.digest.len(), 64);

        snapshot.actors[1].hp = 1;
        assert!(!snapshot.verify());
    }

    #[test]
    fn turn_gate_follows_phase_and_team() {
        let mut battle = battle();
        let before = BattleSnapshot::capture(&battle, 0).unwrap();
        assert!(!before.is_turn_of(TeamId::HOME));

        battle.start_battle().unwrap();
        let snapshot = BattleSnapshot::capture(&battle, 1).unwrap();
        assert!(snapshot.is_turn_of(TeamId::HOME));
        assert!(!snapshot.is_turn_of(TeamId::AWAY));
        assert!(snapshot.to_json_pretty().unwrap().contains("\"Striker\""));
    }
}
