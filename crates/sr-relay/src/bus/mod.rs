//! # Message Bus
//!
//! The transport payloads travel over between producers and consumers.
//! The relay never looks inside a payload; a bus only has to fan raw bytes
//! out to every current subscriber.

pub mod memory;
#[cfg(feature = "nats")]
pub mod nats;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::config::BusConfig;
use crate::error::RelayError;

/// Which transport a [`BusConfig`] selects.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BusKind {
    #[default]
    Memory,
    Nats,
}

impl std::fmt::Display for BusKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Nats => write!(f, "nats"),
        }
    }
}

/// A fan-out transport for opaque byte payloads.
#[async_trait::async_trait]
pub trait MessageBus: Send + Sync {
    /// Unique identifier for this bus instance.
    fn id(&self) -> &str;

    fn kind(&self) -> BusKind;

    /// Hand `payload` to the transport. Succeeds even when nobody is
    /// subscribed, like a fanout exchange with no bound queues.
    async fn publish(&self, payload: Vec<u8>) -> Result<(), RelayError>;

    /// Start receiving payloads published from now on.
    async fn subscribe(&self) -> Result<broadcast::Receiver<Vec<u8>>, RelayError>;

    /// Wait until everything published so far has left the process.
    async fn flush(&self) -> Result<(), RelayError> {
        Ok(())
    }
}

/// Build the bus selected by `config`.
pub async fn connect(config: &BusConfig) -> Result<Arc<dyn MessageBus>, RelayError> {
    let bus: Arc<dyn MessageBus> = match config.kind {
        BusKind::Memory => Arc::new(memory::MemoryBus::new(config.channel_capacity)),
        #[cfg(feature = "nats")]
        BusKind::Nats => Arc::new(nats::NatsBus::connect(config).await?),
        #[cfg(not(feature = "nats"))]
        BusKind::Nats => return Err(RelayError::Unsupported("nats")),
    };
    tracing::info!(bus = bus.id(), kind = %bus.kind(), "message bus ready");
    Ok(bus)
}
