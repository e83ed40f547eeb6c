use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::types::EventEnvelope;

const DEFAULT_CAPACITY: usize = 1000;

/// Fan-out of events to every current subscriber.
///
/// Publishing never blocks. A subscriber that falls more than `capacity`
/// events behind sees `RecvError::Lagged` and skips ahead; subscribers only
/// see events published after they subscribed.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
    event_count: Arc<AtomicUsize>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            event_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Returns the number of subscribers that received the event; 0 means it was dropped.
    pub fn publish(&self, envelope: EventEnvelope) -> usize {
        self.event_count.fetch_add(1, Ordering::Relaxed);
        self.sender.send(envelope).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Total events published, delivered or not.
    pub fn event_count(&self) -> usize {
        self.event_count.load(Ordering::Relaxed)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .field("event_count", &self.event_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Event, ExecutionUpdate};
    use agentflow_core::ExecutionStatus;
    use tokio::sync::broadcast::error::RecvError;
    use uuid::Uuid;

    fn update_event() -> Event {
        Event::ExecutionUpdate(ExecutionUpdate::new(
            Uuid::new_v4(),
            ExecutionStatus::Planning,
        ))
    }

    #[tokio::test]
    async fn test_publish_subscribe() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        let envelope = EventEnvelope::new(update_event());
        assert_eq!(bus.publish(envelope.clone()), 1);

        let received = rx.recv().await.unwrap();
        assert_eq!(received.id, envelope.id);
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let bus = EventBus::new();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        let envelope = EventEnvelope::new(update_event());
        let envelope_id = envelope.id;
        assert_eq!(bus.publish(envelope), 2);

        assert_eq!(rx1.recv().await.unwrap().id, envelope_id);
        assert_eq!(rx2.recv().await.unwrap().id, envelope_id);
    }

    #[tokio::test]
    async fn test_no_subscribers() {
        let bus = EventBus::new();
        assert_eq!(bus.publish(EventEnvelope::new(update_event())), 0);
        assert_eq!(bus.event_count(), 1);
    }

    #[tokio::test]
    async fn test_late_subscriber_gets_no_replay() {
        let bus = EventBus::new();
        bus.publish(EventEnvelope::new(update_event()));

        let mut rx = bus.subscribe();
        let later = EventEnvelope::new(update_event());
        bus.publish(later.clone());

        assert_eq!(rx.recv().await.unwrap().id, later.id);
    }

    #[tokio::test]
    async fn test_slow_subscriber_lags_without_blocking_publisher() {
        let bus = EventBus::with_capacity(2);
        let mut rx = bus.subscribe();

        for _ in 0..5 {
            bus.publish(EventEnvelope::new(update_event()));
        }

        assert!(matches!(rx.recv().await, Err(RecvError::Lagged(3))));
        assert!(rx.recv().await.is_ok());
    }

    #[test]
    fn test_clone_shares_channel() {
        let bus1 = EventBus::new();
        let bus2 = bus1.clone();

        let _rx = bus2.subscribe();
        assert_eq!(bus1.subscriber_count(), 1);
        assert_eq!(bus2.subscriber_count(), 1);
    }
}
