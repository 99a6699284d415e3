//! # Consumer
//!
//! Receives payloads from a bus subscription and hands each one to a
//! handler at most once while it is still remembered by the consumer's
//! seen-before ring. Duplicates, whether redelivered or published by a
//! second producer, are counted and dropped.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::broadcast;

use sr_ring::RingBuffer;

/// Counters for one consumer.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ConsumerStats {
    pub received: u64,
    pub handled: u64,
    pub duplicates: u64,
    /// Payloads the bus dropped because this consumer fell behind.
    pub lagged: u64,
}

pub struct Consumer {
    handled_ring: RingBuffer,
    received: AtomicU64,
    handled: AtomicU64,
    duplicates: AtomicU64,
    lagged: AtomicU64,
}

impl Consumer {
    pub fn new(handled_ring: RingBuffer) -> Self {
        Self {
            handled_ring,
            received: AtomicU64::new(0),
            handled: AtomicU64::new(0),
            duplicates: AtomicU64::new(0),
            lagged: AtomicU64::new(0),
        }
    }

    /// Decide whether `payload` should be handled.
    ///
    /// Returns `true` for a payload not seen before (it is remembered from
    /// now on), `false` for a duplicate.
    pub fn accept(&self, payload: &[u8]) -> bool {
        self.received.fetch_add(1, Ordering::Relaxed);
        if self.handled_ring.seen(payload) {
            self.duplicates.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(bytes = payload.len(), "dropped duplicate payload");
            false
        } else {
            self.handled.fetch_add(1, Ordering::Relaxed);
            true
        }
    }

    /// Drain `rx`, calling `handler` for every fresh payload.
    ///
    /// Stops once `limit` payloads have been received (if set) or when the
    /// channel closes, and returns the counters at that point. Payloads
    /// lost to lag count toward `limit`; they will never arrive.
    pub async fn run<F>(
        &self,
        mut rx: broadcast::Receiver<Vec<u8>>,
        limit: Option<u64>,
        mut handler: F,
    ) -> ConsumerStats
    where
        F: FnMut(&[u8]),
    {
        let mut received = 0u64;
        loop {
            if limit.is_some_and(|l| received >= l) {
                break;
            }
            match rx.recv().await {
                Ok(payload) => {
                    received += 1;
                    if self.accept(&payload) {
                        handler(&payload);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    received += n;
                    self.lagged.fetch_add(n, Ordering::Relaxed);
                    tracing::warn!("Consumer lagged by {} payloads", n);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        self.stats()
    }

    /// Most recently handled payload, if any.
    pub fn last_handled(&self) -> Option<Vec<u8>> {
        self.handled_ring.most_recent()
    }

    /// Forget every handled payload, e.g. after a resync.
    pub fn forget(&self) {
        self.handled_ring.reset();
    }

    pub fn stats(&self) -> ConsumerStats {
        ConsumerStats {
            received: self.received.load(Ordering::Relaxed),
            handled: self.handled.load(Ordering::Relaxed),
            duplicates: self.duplicates.load(Ordering::Relaxed),
            lagged: self.lagged.load(Ordering::Relaxed),
        }
    }
}
