use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use events::{Event, EventBus, EventEnvelope};

/// Publishes events stamped with a monotonically increasing sequence number.
///
/// Clones share the counter, so every event leaving one orchestrator carries
/// a distinct, ordered sequence.
#[derive(Clone)]
pub struct OrderedEventEmitter {
    bus: EventBus,
    sequence: Arc<AtomicU64>,
}

impl OrderedEventEmitter {
    pub fn new(bus: EventBus) -> Self {
        Self {
            bus,
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Never blocks; the event is dropped when nobody is subscribed.
    pub fn emit(&self, event: Event) {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let delivered = self
            .bus
            .publish(EventEnvelope::new(event).with_sequence(sequence));
        tracing::trace!(sequence, delivered, "Event published");
    }

    pub fn current_sequence(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentflow_core::ExecutionStatus;
    use events::ExecutionUpdate;
    use uuid::Uuid;

    fn planning() -> Event {
        Event::ExecutionUpdate(ExecutionUpdate::new(
            Uuid::new_v4(),
            ExecutionStatus::Planning,
        ))
    }

    #[tokio::test]
    async fn test_sequence_increments() {
        let emitter = OrderedEventEmitter::new(EventBus::new());
        let mut rx = emitter.bus().subscribe();

        emitter.emit(planning());
        emitter.emit(planning());

        assert_eq!(emitter.current_sequence(), 2);
        assert_eq!(rx.recv().await.unwrap().sequence, 1);
        assert_eq!(rx.recv().await.unwrap().sequence, 2);
    }

    #[test]
    fn test_clone_shares_sequence() {
        let emitter1 = OrderedEventEmitter::new(EventBus::new());
        let emitter2 = emitter1.clone();

        emitter1.emit(planning());
        emitter2.emit(planning());

        assert_eq!(emitter1.current_sequence(), 2);
        assert_eq!(emitter2.current_sequence(), 2);
    }
}
