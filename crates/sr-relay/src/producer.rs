//! # Producer
//!
//! Publishes payloads on a [`MessageBus`] and remembers what it sent in
//! its own seen-before ring, so the same payload is not published twice
//! while it is still in the ring.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;

use sr_ring::RingBuffer;

use crate::bus::MessageBus;
use crate::error::RelayError;

/// Counters for one producer.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ProducerStats {
    pub identity: String,
    pub sent: u64,
    pub suppressed: u64,
    pub errors: u64,
}

pub struct Producer {
    identity: String,
    bus: Arc<dyn MessageBus>,
    sent_ring: RingBuffer,
    sent: AtomicU64,
    suppressed: AtomicU64,
    errors: AtomicU64,
}

impl Producer {
    pub fn new(identity: String, bus: Arc<dyn MessageBus>, sent_ring: RingBuffer) -> Self {
        Self {
            identity,
            bus,
            sent_ring,
            sent: AtomicU64::new(0),
            suppressed: AtomicU64::new(0),
            errors: AtomicU64::new(0),
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Publish `payload` unless it was already sent.
    ///
    /// Returns `Ok(true)` if published, `Ok(false)` if suppressed as a
    /// repeat. The payload is remembered only after the bus accepted it,
    /// so a failed publish can be retried.
    pub async fn emit(&self, payload: &[u8]) -> Result<bool, RelayError> {
        if self.sent_ring.contains(payload) {
            self.suppressed.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(
                producer = %self.identity,
                bytes = payload.len(),
                "suppressed repeat payload"
            );
            return Ok(false);
        }

        if let Err(e) = self.bus.publish(payload.to_vec()).await {
            self.errors.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(producer = %self.identity, error = %e, "publish failed");
            return Err(e);
        }

        self.sent_ring.insert(payload);
        self.sent.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            producer = %self.identity,
            bus = self.bus.id(),
            bytes = payload.len(),
            "sent payload"
        );
        Ok(true)
    }

    /// Payload most recently sent, if any.
    pub fn last_sent(&self) -> Option<Vec<u8>> {
        self.sent_ring.most_recent()
    }

    /// Forget every sent payload, e.g. after a reconnect.
    pub fn forget(&self) {
        self.sent_ring.reset();
    }

    pub fn stats(&self) -> ProducerStats {
        ProducerStats {
            identity: self.identity.clone(),
            sent: self.sent.load(Ordering::Relaxed),
            suppressed: self.suppressed.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}
