//! # sr-relay - seenring on the wire
//!
//! Puts a seen-before ring on each side of a message bus:
//!
//! - a [`Producer`](producer::Producer) refuses to publish a payload it has
//!   already sent,
//! - a [`Consumer`](consumer::Consumer) drops payloads it has already
//!   handled, whoever published them.
//!
//! The bus is anything implementing [`MessageBus`](bus::MessageBus): an
//! in-process broadcast channel, or NATS with `--features nats`.

pub mod bus;
pub mod config;
pub mod consumer;
pub mod error;
pub mod identity;
pub mod producer;

pub use error::RelayError;
