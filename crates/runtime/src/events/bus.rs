//! Topic-based event bus implementation.
//!
//! This is separate from the subscription hub's per-client state fan-out: it
//! carries process-wide telemetry and connection lifecycle events for
//! in-process observers (metrics exporters, admin consoles) that want a
//! broadcast feed without going through a client subscription.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};

use arena_core::{ActorId, TelemetryEvent};

/// Topics for event routing.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum Topic {
    /// Structured events emitted by the simulation core during a tick.
    Telemetry,
    /// Subscription lifecycle: join, subscribe, disconnect.
    Connection,
}

/// Lifecycle events the hub raises as players join, subscribe, and drop.
#[derive(Debug, Clone)]
pub enum ConnectionEvent {
    Joined(ActorId),
    Subscribed(ActorId),
    Disconnected(ActorId),
}

/// Event wrapper that carries the topic and typed event.
#[derive(Debug, Clone)]
pub enum Event {
    Telemetry(TelemetryEvent),
    Connection(ConnectionEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Telemetry(_) => Topic::Telemetry,
            Event::Connection(_) => Topic::Connection,
        }
    }
}

/// Topic-based event bus.
///
/// Allows consumers to subscribe to specific topics and only receive events
/// they care about.
pub struct EventBus {
    channels: Arc<RwLock<HashMap<Topic, broadcast::Sender<Event>>>>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic.
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Creates a new event bus with specified capacity per topic.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut channels = HashMap::new();
        channels.insert(Topic::Telemetry, broadcast::channel(capacity).0);
        channels.insert(Topic::Connection, broadcast::channel(capacity).0);
        Self { channels: Arc::new(RwLock::new(channels)) }
    }

    /// Publishes an event to its corresponding topic.
    pub fn publish(&self, event: Event) {
        let topic = event.topic();

        // Use try_read to avoid blocking in async context. If we can't get
        // the lock, just skip: these events are best-effort.
        match self.channels.try_read() {
            Ok(channels) => {
                if let Some(tx) = channels.get(&topic)
                    && tx.send(event).is_err()
                {
                    tracing::trace!("no subscribers for topic {:?}", topic);
                }
            }
            Err(_) => {
                tracing::debug!("failed to acquire event bus lock for topic {:?}", topic);
            }
        }
    }

    /// Subscribes to a specific topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        let channels = self.channels.try_read().expect("failed to acquire read lock on event channels");
        channels.get(&topic).expect("topic channel not initialized").subscribe()
    }

    /// Subscribes to multiple topics at once.
    pub fn subscribe_multiple(&self, topics: &[Topic]) -> HashMap<Topic, broadcast::Receiver<Event>> {
        let channels = self.channels.try_read().expect("failed to acquire read lock on event channels");
        topics
            .iter()
            .map(|&topic| {
                let rx = channels.get(&topic).expect("topic channel not initialized").subscribe();
                (topic, rx)
            })
            .collect()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self { channels: Arc::clone(&self.channels) }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_delivers_to_subscriber() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe(Topic::Connection);
        bus.publish(Event::Connection(ConnectionEvent::Joined(ActorId::new(1))));
        let event = rx.recv().await.unwrap();
        assert!(matches!(event, Event::Connection(ConnectionEvent::Joined(_))));
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::new();
        bus.publish(Event::Connection(ConnectionEvent::Disconnected(ActorId::new(1))));
    }
}
