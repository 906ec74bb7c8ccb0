use std::sync::RwLock;

use tokio::sync::broadcast;
use tracing::debug;

use synapsd_types::DocumentId;

/// In-process notifications emitted by the engine.
///
/// Best-effort, at-most-once fan-out to live subscribers; no persistence
/// or replay.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineEvent {
    /// A document was inserted and indexed.
    Insert { id: DocumentId },
    /// A document was replaced in place.
    Update { id: DocumentId },
    /// A document was unindexed from the given label subsets.
    Remove {
        id: DocumentId,
        contexts: Vec<String>,
        features: Vec<String>,
    },
    /// A document was hard-deleted: metadata, checksums, and all bitmap
    /// memberships.
    Delete { id: DocumentId },
}

/// A broadcast receiver for engine events. Dropping it unsubscribes.
pub type EventStream = broadcast::Receiver<EngineEvent>;

/// Fan-out router delivering events to subscribers.
///
/// Subscribers whose receivers have all been dropped are pruned on the
/// next emit.
pub struct EventRouter {
    subscribers: RwLock<Vec<broadcast::Sender<EngineEvent>>>,
    channel_capacity: usize,
}

impl EventRouter {
    /// Create a router whose per-subscriber channels buffer `capacity`
    /// events.
    pub fn new(channel_capacity: usize) -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
            channel_capacity,
        }
    }

    /// Register a new subscriber.
    pub fn subscribe(&self) -> EventStream {
        let (tx, rx) = broadcast::channel(self.channel_capacity);
        self.subscribers
            .write()
            .expect("router lock poisoned")
            .push(tx);
        rx
    }

    /// Deliver an event to all live subscribers, pruning stale ones.
    pub fn emit(&self, event: EngineEvent) {
        let mut subs = self.subscribers.write().expect("router lock poisoned");
        // send() fails only when every receiver is gone.
        subs.retain(|tx| tx.send(event.clone()).is_ok());
        debug!(?event, subscribers = subs.len(), "event emitted");
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .expect("router lock poisoned")
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscriber_receives_events_in_order() {
        let router = EventRouter::new(16);
        let mut stream = router.subscribe();

        router.emit(EngineEvent::Insert { id: 131_073 });
        router.emit(EngineEvent::Update { id: 131_073 });

        assert_eq!(
            stream.try_recv().unwrap(),
            EngineEvent::Insert { id: 131_073 }
        );
        assert_eq!(
            stream.try_recv().unwrap(),
            EngineEvent::Update { id: 131_073 }
        );
        assert!(stream.try_recv().is_err());
    }

    #[test]
    fn dropped_subscriber_is_pruned() {
        let router = EventRouter::new(16);
        let stream = router.subscribe();
        assert_eq!(router.subscriber_count(), 1);

        drop(stream);
        router.emit(EngineEvent::Delete { id: 131_073 });
        assert_eq!(router.subscriber_count(), 0);
    }

    #[test]
    fn fan_out_reaches_all_subscribers() {
        let router = EventRouter::new(16);
        let mut a = router.subscribe();
        let mut b = router.subscribe();

        let event = EngineEvent::Remove {
            id: 131_073,
            contexts: vec!["work".into()],
            features: vec![],
        };
        router.emit(event.clone());

        assert_eq!(a.try_recv().unwrap(), event);
        assert_eq!(b.try_recv().unwrap(), event);
    }
}
