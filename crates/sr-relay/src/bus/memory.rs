//! # Memory Bus
//!
//! In-process fan-out over a tokio broadcast channel. Used by `sr relay`
//! and by tests; nothing leaves the process.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::broadcast;

use super::{BusKind, MessageBus};
use crate::error::RelayError;

pub struct MemoryBus {
    id: String,
    tx: broadcast::Sender<Vec<u8>>,
    published: AtomicU64,
}

impl MemoryBus {
    /// `capacity` is the per-subscriber backlog; at least 1.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            id: format!("memory-{}", uuid::Uuid::new_v4().as_simple()),
            tx,
            published: AtomicU64::new(0),
        }
    }

    /// Payloads accepted so far.
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}

#[async_trait::async_trait]
impl MessageBus for MemoryBus {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> BusKind {
        BusKind::Memory
    }

    async fn publish(&self, payload: Vec<u8>) -> Result<(), RelayError> {
        self.published.fetch_add(1, Ordering::Relaxed);
        if self.tx.send(payload).is_err() {
            tracing::debug!(bus = %self.id, "published with no subscribers");
        }
        Ok(())
    }

    async fn subscribe(&self) -> Result<broadcast::Receiver<Vec<u8>>, RelayError> {
        Ok(self.tx.subscribe())
    }
}
