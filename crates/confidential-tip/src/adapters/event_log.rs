//! # Event Log Adapter
//!
//! In-memory [`EventPublisher`] that keeps every published event.

use crate::events::LedgerEvent;
use crate::ports::outbound::EventPublisher;
use async_trait::async_trait;
use parking_lot::RwLock;

/// Append-only event log.
#[derive(Debug, Default)]
pub struct InMemoryEventLog {
    events: RwLock<Vec<LedgerEvent>>,
}

impl InMemoryEventLog {
    /// Empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all events in publication order.
    #[must_use]
    pub fn events(&self) -> Vec<LedgerEvent> {
        self.events.read().clone()
    }

    /// Events published under `topic`.
    #[must_use]
    pub fn by_topic(&self, topic: &str) -> Vec<LedgerEvent> {
        self.events
            .read()
            .iter()
            .filter(|event| event.topic() == topic)
            .cloned()
            .collect()
    }

    /// Number of events published.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// True if nothing was published.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventLog {
    async fn publish(&self, event: LedgerEvent) {
        self.events.write().push(event);
    }
}
