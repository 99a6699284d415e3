//! # sr-ring - the seen-before ring of seenring
//!
//! A bounded, concurrency-safe history of recently observed byte records.
//! Producers `insert` what they have handled; consumers ask `contains`
//! before acting and drop what the ring has already seen.

pub mod cursor;
pub mod ring;

pub use ring::RingBuffer;
pub use sr_core::{Mode, RingError};
