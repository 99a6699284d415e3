//! # sr-core - shared vocabulary of seenring
//!
//! Defines the scan [`Mode`] of a seen-before ring and the [`RingError`]
//! returned when a ring is asked for with a capacity or mode it cannot have.
//!
//! The ring itself lives in `sr-ring`; everything that touches a ring
//! (relay, CLI, proofs) speaks in these types.

use core::fmt;
use core::str::FromStr;

use thiserror::Error;

/// Traversal order used by the membership test.
///
/// The mode never changes how records are stored, only which slot a
/// lookup inspects first. Both modes return the same answer.
///
/// # Tags
///
/// | Tag | Mode             | Name       |
/// |-----|------------------|------------|
/// | 0   | `ScanFromRecent` | `"recent"` |
/// | 1   | `ScanFromOldest` | `"oldest"` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Mode {
    /// Most recently written slot first, oldest last.
    #[default]
    ScanFromRecent = 0,

    /// Oldest surviving slot first, most recent last.
    ScanFromOldest = 1,
}

impl Mode {
    /// Raw tag of this mode.
    #[inline]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Short name used in configuration files and on the command line.
    pub const fn name(self) -> &'static str {
        match self {
            Self::ScanFromRecent => "recent",
            Self::ScanFromOldest => "oldest",
        }
    }
}

impl TryFrom<u8> for Mode {
    type Error = RingError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(Self::ScanFromRecent),
            1 => Ok(Self::ScanFromOldest),
            other => Err(RingError::InvalidMode(other.to_string())),
        }
    }
}

impl FromStr for Mode {
    type Err = RingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "recent" | "scan_from_recent" => Ok(Self::ScanFromRecent),
            "oldest" | "scan_from_oldest" => Ok(Self::ScanFromOldest),
            _ => Err(RingError::InvalidMode(s.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors raised while constructing a ring. Every other ring operation is
/// total.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RingError {
    /// Capacity below one, or too large to address on this platform.
    #[error("invalid capacity {0}: a ring needs at least one slot")]
    InvalidCapacity(i64),

    /// Mode tag or name that is not `recent` (0) or `oldest` (1).
    #[error("invalid scan mode {0:?}: expected \"recent\" (0) or \"oldest\" (1)")]
    InvalidMode(String),
}
