//! Error type for the relay crate.

use sr_core::RingError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    /// The configured ring could not be built.
    #[error("Ring error: {0}")]
    Ring(#[from] RingError),

    /// The config file exists but is not valid TOML for this schema.
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// Reading the config file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The bus refused a connect, publish or subscribe.
    #[error("Bus error: {0}")]
    Bus(String),

    /// The requested bus was not compiled in.
    #[error("{0} support not compiled. Rebuild with --features {0}")]
    Unsupported(&'static str),
}
