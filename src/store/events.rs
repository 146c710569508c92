//! Store change notifications.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::queries::QueryKey;

/// Capacity of the change channel. Slow subscribers see `Lagged` and should
/// re-read whatever they display.
pub const EVENT_CAPACITY: usize = 256;

/// Emitted after every cache write or invalidation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "key", rename_all = "snake_case")]
pub enum StoreEvent {
    Updated(String),
    Invalidated(String),
    Cleared,
}

impl StoreEvent {
    pub fn updated(key: &QueryKey) -> Self {
        Self::Updated(key.to_string())
    }

    pub fn invalidated(key: &QueryKey) -> Self {
        Self::Invalidated(key.to_string())
    }
}

#[derive(Debug)]
pub(crate) struct EventBus {
    tx: broadcast::Sender<StoreEvent>,
}

impl EventBus {
    pub(crate) fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self { tx }
    }

    pub(crate) fn emit(&self, event: StoreEvent) {
        // No subscribers is not an error.
        let _ = self.tx.send(event);
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.tx.subscribe()
    }
}
