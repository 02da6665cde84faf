//! In-process broadcast bus for domain events.

use tokio::sync::broadcast;
use tracing::trace;

use super::DomainEvent;

/// Fan-out publisher for [`DomainEvent`]s.
///
/// Publishing never blocks and never fails: with no subscribers the
/// event is dropped, and slow subscribers observe `Lagged`.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    /// Create a bus whose subscribers buffer up to `capacity` events.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event to every current subscriber.
    pub fn publish(&self, event: DomainEvent) {
        if self.sender.send(event).is_err() {
            trace!("Domain event dropped, no subscribers");
        }
    }

    /// Subscribe to events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
