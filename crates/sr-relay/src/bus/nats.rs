//! # NATS Bus (optional - requires `--features nats`)
//!
//! Publishes payloads on one NATS subject and forwards everything received
//! on it into a broadcast channel per subscriber.

use bytes::Bytes;
use futures_util::StreamExt;
use tokio::sync::broadcast;

use super::{BusKind, MessageBus};
use crate::config::BusConfig;
use crate::error::RelayError;

pub struct NatsBus {
    id: String,
    subject: String,
    channel_capacity: usize,
    client: async_nats::Client,
}

impl NatsBus {
    pub async fn connect(config: &BusConfig) -> Result<Self, RelayError> {
        tracing::info!(
            url = %config.url,
            subject = %config.subject,
            "connecting to NATS"
        );
        let client = async_nats::connect(config.url.as_str())
            .await
            .map_err(|e| RelayError::Bus(format!("connect to {}: {}", config.url, e)))?;

        Ok(Self {
            id: format!("nats-{}", uuid::Uuid::new_v4().as_simple()),
            subject: config.subject.clone(),
            channel_capacity: config.channel_capacity.max(1),
            client,
        })
    }
}

#[async_trait::async_trait]
impl MessageBus for NatsBus {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> BusKind {
        BusKind::Nats
    }

    async fn publish(&self, payload: Vec<u8>) -> Result<(), RelayError> {
        self.client
            .publish(self.subject.clone(), Bytes::from(payload))
            .await
            .map_err(|e| RelayError::Bus(format!("publish to {}: {}", self.subject, e)))
    }

    async fn subscribe(&self) -> Result<broadcast::Receiver<Vec<u8>>, RelayError> {
        let mut subscription = self
            .client
            .subscribe(self.subject.clone())
            .await
            .map_err(|e| RelayError::Bus(format!("subscribe to {}: {}", self.subject, e)))?;

        let (tx, rx) = broadcast::channel(self.channel_capacity);
        let subject = self.subject.clone();

        tokio::spawn(async move {
            while let Some(message) = subscription.next().await {
                if tx.send(message.payload.to_vec()).is_err() {
                    // Every receiver is gone.
                    break;
                }
            }
            tracing::debug!(%subject, "NATS subscription closed");
        });

        Ok(rx)
    }

    async fn flush(&self) -> Result<(), RelayError> {
        self.client
            .flush()
            .await
            .map_err(|e| RelayError::Bus(format!("flush: {}", e)))
    }
}
