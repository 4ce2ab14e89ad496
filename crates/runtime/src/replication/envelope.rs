//! Flattened event envelope for replaying whitelisted topics on observers.
//!
//! Observers get enough to animate and log an event, never a handle that
//! could mutate state. Every envelope records where it came from: the
//! authority, or a local replay of an authority envelope. Replays are never
//! forwarded again, so an observer wired back into a relay cannot echo.

use serde::{Deserialize, Serialize};

use arena_core::{AbilityCategory, ActorId, BattleEvent, ReplicationFilter, Topic};

/// Which optional fields of a [`ReplicatedEvent`] are meaningful.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PayloadType {
    None,
    TargetOnly,
    SourceTargetAmount,
    Text,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Origin {
    Authority,
    Replay,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReplicatedEvent {
    /// Snake-case topic name.
    pub event_name: String,
    pub payload_type: PayloadType,
    pub source_id: Option<u32>,
    pub target_id: Option<u32>,
    pub amount: i64,
    pub ability_category: Option<AbilityCategory>,
    pub text: Option<String>,
    pub team_id: Option<u8>,
    pub origin: Origin,
}

impl ReplicatedEvent {
    fn new(topic: Topic, payload_type: PayloadType) -> Self {
        Self {
            event_name: topic.to_string(),
            payload_type,
            source_id: None,
            target_id: None,
            amount: 0,
            ability_category: None,
            text: None,
            team_id: None,
            origin: Origin::Authority,
        }
    }

    fn between(mut self, source: Option<ActorId>, target: ActorId, amount: i64) -> Self {
        self.source_id = source.map(|id| id.0);
        self.target_id = Some(target.0);
        self.amount = amount;
        self
    }

    fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Flatten a battle event. Every event has an envelope form; whether it
    /// is sent is the [`Replicator`]'s call.
    pub fn from_event(event: &BattleEvent) -> Self {
        use PayloadType as P;

        let topic = event.topic();
        match event {
            BattleEvent::DamageDealt {
                source,
                target,
                amount,
                category,
                ..
            } => Self::new(topic, P::SourceTargetAmount)
                .between(*source, *target, i64::from(*amount))
                .text(category.to_string()),
            BattleEvent::AttackMissed { source, target } => {
                Self::new(topic, P::SourceTargetAmount).between(Some(*source), *target, 0)
            }
            BattleEvent::CriticalHit {
                source,
                target,
                multiplier,
            } => Self::new(topic, P::SourceTargetAmount).between(
                Some(*source),
                *target,
                (multiplier * 100.0).round() as i64,
            ),
            BattleEvent::Healed {
                source,
                target,
                amount,
            }
            | BattleEvent::ShieldGained {
                source,
                target,
                amount,
            } => Self::new(topic, P::SourceTargetAmount)
                .between(*source, *target, i64::from(*amount)),
            BattleEvent::StatusApplied {
                source,
                target,
                name,
                ..
            } => Self::new(topic, P::Text).between(*source, *target, 0).text(name),
            BattleEvent::StatusRemoved { target, name, .. }
            | BattleEvent::StatusExpired { target, name, .. } => {
                Self::new(topic, P::Text).between(None, *target, 0).text(name)
            }
            BattleEvent::CharacterDied { actor, killer } => {
                Self::new(topic, P::TargetOnly).between(*killer, *actor, 0)
            }
            BattleEvent::CharacterRevived { actor, source, hp } => {
                Self::new(topic, P::SourceTargetAmount).between(*source, *actor, i64::from(*hp))
            }
            BattleEvent::AbilityResolved {
                caster,
                team,
                ability,
                category,
                targets,
                ..
            } => {
                let mut envelope = Self::new(topic, P::Text).text(ability);
                envelope.source_id = Some(caster.0);
                envelope.target_id = targets.first().map(|id| id.0);
                envelope.amount = targets.len() as i64;
                envelope.ability_category = Some(*category);
                envelope.team_id = Some(team.0);
                envelope
            }
            BattleEvent::PassiveTriggered { actor, rule } => {
                Self::new(topic, P::Text).between(None, *actor, 0).text(rule)
            }
            BattleEvent::FusionTriggered { team, fusion }
            | BattleEvent::FusionUnleashed { team, fusion } => {
                let mut envelope = Self::new(topic, P::Text).text(fusion.label());
                envelope.team_id = Some(team.0);
                envelope
            }
            BattleEvent::MomentumSwing { favored: team } => {
                let mut envelope = Self::new(topic, P::None);
                envelope.team_id = Some(team.0);
                envelope
            }
            BattleEvent::GameEnded { winner } => {
                let mut envelope = Self::new(topic, P::None);
                envelope.team_id = winner.map(|team| team.0);
                envelope
            }
            other => {
                let mut envelope = Self::new(topic, P::None);
                envelope.target_id = other.subject().map(|id| id.0);
                envelope
            }
        }
    }

    /// Topic named by `event_name`, if it is one this build knows.
    pub fn topic(&self) -> Option<Topic> {
        self.event_name.parse().ok()
    }

    pub fn is_replay(&self) -> bool {
        self.origin == Origin::Replay
    }

    /// Copy of this envelope marked as a local replay.
    pub fn as_replay(&self) -> Self {
        Self {
            origin: Origin::Replay,
            ..self.clone()
        }
    }
}

/// Decides which events cross the authority/observer boundary.
#[derive(Clone, Debug, Default)]
pub struct Replicator {
    filter: ReplicationFilter,
}

impl Replicator {
    pub fn new(filter: ReplicationFilter) -> Self {
        Self { filter }
    }

    pub fn filter(&self) -> &ReplicationFilter {
        &self.filter
    }

    /// Envelope for an authority-side event, if its topic is whitelisted.
    pub fn capture(&self, event: &BattleEvent) -> Option<ReplicatedEvent> {
        self.filter
            .admits(event)
            .then(|| ReplicatedEvent::from_event(event))
    }

    /// Envelope to pass along, or `None` for replays and non-whitelisted topics.
    pub fn forward(&self, envelope: &ReplicatedEvent) -> Option<ReplicatedEvent> {
        if envelope.is_replay() {
            return None;
        }
        let topic = envelope.topic()?;
        self.filter.replicates(topic).then(|| envelope.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_core::{DamageCategory, FusionKind, SkipReason, TeamId};

    fn damage() -> BattleEvent {
        BattleEvent::DamageDealt {
            source: Some(ActorId(1)),
            target: ActorId(4),
            amount: 37,
            absorbed: 7,
            hp_loss: 30,
            category: DamageCategory::Frost,
        }
    }

    #[test]
    fn damage_flattens_to_source_target_amount() {
        let envelope = ReplicatedEvent::from_event(&damage());
        assert_eq!(envelope.event_name, "damage_dealt");
        assert_eq!(envelope.payload_type, PayloadType::SourceTargetAmount);
        assert_eq!(envelope.source_id, Some(1));
        assert_eq!(envelope.target_id, Some(4));
        assert_eq!(envelope.amount, 37);
        assert_eq!(envelope.text.as_deref(), Some("frost"));
        assert_eq!(envelope.topic(), Some(Topic::DamageDealt));
    }

    #[test]
    fn fusion_carries_team_and_label() {
        let envelope = ReplicatedEvent::from_event(&BattleEvent::FusionUnleashed {
            team: TeamId::AWAY,
            fusion: FusionKind::Cataclysm,
        });
        assert_eq!(envelope.payload_type, PayloadType::Text);
        assert_eq!(envelope.team_id, Some(1));
        assert_eq!(envelope.text.as_deref(), Some("cataclysm"));
    }

    #[test]
    fn replicator_applies_whitelist() {
        let replicator = Replicator::default();
        assert!(replicator.capture(&damage()).is_some());
        assert!(
            replicator
                .capture(&BattleEvent::TurnSkipped {
                    actor: ActorId(0),
                    reason: SkipReason::Requested,
                })
                .is_none()
        );
    }

    #[test]
    fn replays_are_never_forwarded() {
        let replicator = Replicator::default();
        let original = replicator.capture(&damage()).unwrap();
        assert!(replicator.forward(&original).is_some());

        let replay = original.as_replay();
        assert!(replay.is_replay());
        assert_eq!(replicator.forward(&replay), None);
    }

    #[test]
    fn unknown_event_names_are_not_forwarded() {
        let mut envelope = ReplicatedEvent::from_event(&damage());
        envelope.event_name = "teleported".into();
        assert_eq!(envelope.topic(), None);
        assert_eq!(Replicator::default().forward(&envelope), None);
    }
}
