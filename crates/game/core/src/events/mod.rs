//! Battle events and the synchronous publish/subscribe bus.
//!
//! Mutations append events to an [`Emitter`] owned by the battle. The battle
//! drains the emitter after each step, lets the passive and affinity layers
//! react, records the events in its log and publishes them on the
//! [`EventBus`].

mod bus;
mod event;
mod filter;

pub use bus::{EventBus, Publisher, SubscriptionId};
pub use event::{BattleEvent, SkipReason, Topic};
pub use filter::ReplicationFilter;

/// Ordered queue of events produced by state mutations.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Emitter {
    events: Vec<BattleEvent>,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Event at `index`, if already emitted.
    pub fn get(&self, index: usize) -> Option<&BattleEvent> {
        self.events.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BattleEvent> {
        self.events.iter()
    }

    pub fn drain(&mut self) -> Vec<BattleEvent> {
        std::mem::take(&mut self.events)
    }
}
