//! # Cursor - Write Position Tracker
//!
//! Tracks the `head` of a seen-before ring: the slot the next insertion
//! will overwrite. Unlike a producer/consumer queue there is no tail; once
//! the ring is full every insertion silently evicts the slot at `head`.
//!
//! The cursor also owns the two slot orders used for lookups, so all index
//! arithmetic (and its wrap-around) lives in one place. The invariants are
//! checked with Kani in `sr-verify` and below.

/// Ring cursor tracking the next slot to overwrite.
///
/// # Invariant
///
/// `head < capacity` at all times. The slot at `head - 1` (wrapping) is the
/// most recently written one; walking backwards from there visits slots from
/// newest to oldest.
#[derive(Debug, Clone)]
pub struct Cursor {
    /// Next slot to write into.
    head: usize,

    /// Total number of slots in the ring.
    capacity: usize,
}

impl Cursor {
    /// Create a cursor for a ring with `capacity` slots, positioned at slot 0.
    ///
    /// # Panics
    /// Panics if `capacity == 0`. `RingBuffer` validates before calling this.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "Ring must have at least 1 slot");
        Self { head: 0, capacity }
    }

    /// Returns the current head (next write) position.
    #[inline]
    pub fn head(&self) -> usize {
        self.head
    }

    /// Returns the ring capacity (total slots).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Claim the slot at `head` for writing and advance past it.
    ///
    /// Returns the claimed slot index. Never fails: a full ring simply
    /// overwrites.
    #[inline]
    pub fn advance(&mut self) -> usize {
        let slot = self.head;
        self.head = self.next_pos(self.head);
        slot
    }

    /// Slot written by the most recent [`advance`](Self::advance).
    ///
    /// Wraps to `capacity - 1` when `head == 0`. Whether that slot has
    /// actually been written is for the caller to decide.
    #[inline]
    pub fn most_recent(&self) -> usize {
        if self.head == 0 {
            self.capacity - 1
        } else {
            self.head - 1
        }
    }

    /// Move the head back to slot 0.
    #[inline]
    pub fn reset(&mut self) {
        self.head = 0;
    }

    /// Slot indices from most recent to oldest:
    /// `head-1 ..= 0`, then `capacity-1 ..= head`.
    #[inline]
    pub fn newest_first(&self) -> impl Iterator<Item = usize> {
        (0..self.head).rev().chain((self.head..self.capacity).rev())
    }

    /// Slot indices from oldest to most recent:
    /// `head .. capacity`, then `0 .. head`.
    #[inline]
    pub fn oldest_first(&self) -> impl Iterator<Item = usize> {
        (self.head..self.capacity).chain(0..self.head)
    }

    /// Compute the next position with wrap-around.
    #[inline]
    fn next_pos(&self, pos: usize) -> usize {
        (pos + 1) % self.capacity
    }
}

// =============================================================================
// Kani Proofs: Cursor Invariants
// =============================================================================

#[cfg(kani)]
mod proofs {
    use super::*;

    /// **Proof: Head never leaves the ring**
    #[kani::proof]
    #[kani::unwind(6)]
    fn verify_head_stays_in_bounds() {
        let capacity: usize = kani::any();
        kani::assume(capacity >= 1 && capacity <= 4);
        let mut cursor = Cursor::new(capacity);

        let advances: usize = kani::any();
        kani::assume(advances <= 5);

        for _ in 0..advances {
            let slot = cursor.advance();
            assert!(slot < capacity);
        }

        assert!(cursor.head() < cursor.capacity());
    }

    /// **Proof: most_recent names the slot the last advance claimed**
    #[kani::proof]
    #[kani::unwind(6)]
    fn verify_most_recent_matches_last_claim() {
        let capacity: usize = kani::any();
        kani::assume(capacity >= 1 && capacity <= 4);
        let mut cursor = Cursor::new(capacity);

        let advances: usize = kani::any();
        kani::assume(advances >= 1 && advances <= 5);

        let mut last = 0;
        for _ in 0..advances {
            last = cursor.advance();
        }

        assert_eq!(cursor.most_recent(), last);
    }
}
