//! # Relay Configuration
//!
//! Loaded from a TOML file (`seenring.toml` by default). Every key has a
//! default, so a missing file or a partial one is fine. A file that exists
//! but does not parse is an error.
//!
//! ```toml
//! [ring]
//! capacity = 1000
//! mode = "recent"          # or "oldest"
//!
//! [bus]
//! kind = "memory"          # or "nats"
//! url = "nats://localhost:4222"
//! subject = "seenring.events"
//! channel_capacity = 4096
//!
//! [producer]
//! node = "edge-01"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use sr_core::Mode;
use sr_ring::RingBuffer;

use crate::bus::BusKind;
use crate::error::RelayError;

/// Default config file name.
pub const DEFAULT_CONFIG_FILE: &str = "seenring.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default)]
    pub ring: RingConfig,
    #[serde(default)]
    pub bus: BusConfig,
    #[serde(default)]
    pub producer: ProducerConfig,
}

/// Shape of every seen-before ring the relay creates.
///
/// Values are kept raw (signed capacity, textual mode) and only validated
/// by [`RingConfig::build`], so a bad value surfaces as a ring error
/// instead of being clamped during deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RingConfig {
    #[serde(default = "default_capacity")]
    pub capacity: i64,
    #[serde(default = "default_mode")]
    pub mode: String,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            mode: default_mode(),
        }
    }
}

impl RingConfig {
    /// Validated scan mode.
    pub fn mode(&self) -> Result<Mode, RelayError> {
        Ok(self.mode.parse::<Mode>()?)
    }

    /// Build a fresh, empty ring with these settings.
    pub fn build(&self) -> Result<RingBuffer, RelayError> {
        Ok(RingBuffer::new(self.capacity, self.mode()?)?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusConfig {
    #[serde(default)]
    pub kind: BusKind,
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_subject")]
    pub subject: String,
    /// Depth of the in-process broadcast channel; a subscriber that falls
    /// further behind than this loses payloads.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            kind: BusKind::default(),
            url: default_url(),
            subject: default_subject(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProducerConfig {
    /// Node name mixed into the producer identity. Falls back to
    /// `$HOSTNAME`.
    #[serde(default)]
    pub node: Option<String>,
}

fn default_capacity() -> i64 {
    1000
}
fn default_mode() -> String {
    Mode::default().name().to_string()
}
fn default_url() -> String {
    "nats://localhost:4222".to_string()
}
fn default_subject() -> String {
    "seenring.events".to_string()
}
fn default_channel_capacity() -> usize {
    4096
}

impl RelayConfig {
    /// Load from `path`, or return defaults if the file does not exist.
    pub fn load(path: &Path) -> Result<Self, RelayError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Parse a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, RelayError> {
        Ok(toml::from_str(content)?)
    }
}
