//! Whitelist of topics the authority forwards to observers.

use super::event::{BattleEvent, Topic};

/// Fixed set of replicated topics.
///
/// Observers replaying a forwarded event must not forward it again; the
/// runtime enforces that by tagging replayed events at the envelope level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplicationFilter {
    topics: Vec<Topic>,
}

impl ReplicationFilter {
    pub const DEFAULT_TOPICS: [Topic; 11] = [
        Topic::DamageDealt,
        Topic::AttackMissed,
        Topic::Healed,
        Topic::ShieldGained,
        Topic::StatusApplied,
        Topic::CriticalHit,
        Topic::CharacterDied,
        Topic::CharacterRevived,
        Topic::FusionTriggered,
        Topic::FusionUnleashed,
        Topic::MomentumSwing,
    ];

    pub fn new(topics: impl IntoIterator<Item = Topic>) -> Self {
        let mut topics: Vec<Topic> = topics.into_iter().collect();
        topics.sort();
        topics.dedup();
        Self { topics }
    }

    pub fn replicates(&self, topic: Topic) -> bool {
        self.topics.binary_search(&topic).is_ok()
    }

    pub fn admits(&self, event: &BattleEvent) -> bool {
        self.replicates(event.topic())
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }
}

impl Default for ReplicationFilter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TOPICS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ActorId;

    #[test]
    fn default_whitelist_covers_combat_feedback_only() {
        let filter = ReplicationFilter::default();
        assert!(filter.replicates(Topic::DamageDealt));
        assert!(filter.replicates(Topic::CharacterRevived));
        assert!(filter.replicates(Topic::FusionTriggered));
        assert!(!filter.replicates(Topic::TurnStarted));
        assert!(!filter.replicates(Topic::ActionRejected));
        assert!(filter.admits(&BattleEvent::AttackMissed {
            source: ActorId(0),
            target: ActorId(1),
        }));
    }
}
