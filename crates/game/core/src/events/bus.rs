//! Topic-based synchronous event bus.

use std::collections::{HashMap, VecDeque};

use super::event::{BattleEvent, Topic};

/// Subscription handle returned by [`EventBus::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Follow-up sink handed to handlers; events pushed here are delivered after
/// the current event finishes dispatching.
#[derive(Debug, Default)]
pub struct Publisher {
    queue: VecDeque<BattleEvent>,
}

impl Publisher {
    pub fn publish(&mut self, event: BattleEvent) {
        self.queue.push_back(event);
    }
}

type Handler = Box<dyn FnMut(&BattleEvent, &mut Publisher) + Send>;

struct Subscription {
    id: SubscriptionId,
    handler: Handler,
}

/// Topic-based event bus.
///
/// Allows consumers to subscribe to specific topics and only receive events
/// they care about. Dispatch is synchronous and in subscription order.
/// Handlers may publish further events; those are queued and delivered
/// breadth-first once the current dispatch completes, so a handler never
/// re-enters the bus.
#[derive(Default)]
pub struct EventBus {
    topics: HashMap<Topic, Vec<Subscription>>,
    wildcard: Vec<Subscription>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to a specific topic.
    pub fn subscribe<F>(&mut self, topic: Topic, handler: F) -> SubscriptionId
    where
        F: FnMut(&BattleEvent, &mut Publisher) + Send + 'static,
    {
        let id = self.allocate_id();
        self.topics.entry(topic).or_default().push(Subscription {
            id,
            handler: Box::new(handler),
        });
        id
    }

    /// Subscribe to every topic.
    pub fn subscribe_all<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&BattleEvent, &mut Publisher) + Send + 'static,
    {
        let id = self.allocate_id();
        self.wildcard.push(Subscription {
            id,
            handler: Box::new(handler),
        });
        id
    }

    /// Remove a subscription. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriber_count();
        for subscriptions in self.topics.values_mut() {
            subscriptions.retain(|s| s.id != id);
        }
        self.wildcard.retain(|s| s.id != id);
        self.subscriber_count() != before
    }

    /// Publish an event and everything its handlers publish in turn.
    ///
    /// Publishing on a topic without subscribers is a no-op.
    pub fn publish(&mut self, event: BattleEvent) {
        let mut publisher = Publisher::default();
        publisher.publish(event);

        while let Some(event) = publisher.queue.pop_front() {
            let topic = event.topic();
            if let Some(subscriptions) = self.topics.get_mut(&topic) {
                for subscription in subscriptions.iter_mut() {
                    (subscription.handler)(&event, &mut publisher);
                }
            } else {
                tracing::trace!(target: "arena::events", %topic, "no subscribers");
            }
            for subscription in self.wildcard.iter_mut() {
                (subscription.handler)(&event, &mut publisher);
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.topics.values().map(Vec::len).sum::<usize>() + self.wildcard.len()
    }

    fn allocate_id(&mut self) -> SubscriptionId {
        self.next_id += 1;
        SubscriptionId(self.next_id)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("topics", &self.topics.len())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
