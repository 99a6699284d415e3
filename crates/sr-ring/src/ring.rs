//! # Ring - Bounded Seen-Before Buffer
//!
//! A fixed number of slots, each either empty or holding one byte record.
//! Insertion overwrites the slot at the cursor and advances it, so once the
//! ring is full the oldest record is forgotten first.
//!
//! One `parking_lot::RwLock` guards slots and cursor together: writers
//! (`insert`, `seen`, `reset`) are exclusive, readers run in parallel and
//! always see slots and cursor from the same write. Readers hand out owned
//! copies, never references into the ring.

use parking_lot::RwLock;

use sr_core::{Mode, RingError};

use crate::cursor::Cursor;

/// A fixed-capacity, thread-safe history of recently seen byte records.
///
/// Share it behind an `Arc`; every method takes `&self`.
///
/// ```
/// use sr_core::Mode;
/// use sr_ring::RingBuffer;
///
/// let ring = RingBuffer::new(4, Mode::ScanFromRecent).unwrap();
/// for r in ["a", "b", "c", "d", "e"] {
///     ring.insert(r.as_bytes());
/// }
/// assert!(!ring.contains(b"a"));
/// assert!(ring.contains(b"b"));
/// assert_eq!(ring.most_recent().as_deref(), Some(&b"e"[..]));
/// assert_eq!(ring.oldest().as_deref(), Some(&b"b"[..]));
/// ```
#[derive(Debug)]
pub struct RingBuffer {
    /// Lookup order and slot count are fixed at construction, so they
    /// live outside the lock.
    mode: Mode,
    capacity: usize,

    inner: RwLock<Slots>,
}

/// Lock-protected state. Slots and cursor must only change together.
#[derive(Debug)]
struct Slots {
    /// `None` marks a slot never written since construction or reset.
    records: Vec<Option<Vec<u8>>>,
    cursor: Cursor,
}

impl RingBuffer {
    /// Create an empty ring with `capacity` slots.
    ///
    /// Fails with [`RingError::InvalidCapacity`] when `capacity < 1`, does
    /// not fit in `usize`, or needs more slots than can be allocated. The
    /// capacity is never clamped.
    pub fn new(capacity: i64, mode: Mode) -> Result<Self, RingError> {
        let slots = usize::try_from(capacity)
            .ok()
            .filter(|&n| n >= 1)
            .ok_or(RingError::InvalidCapacity(capacity))?;

        let mut records = Vec::new();
        if let Err(e) = records.try_reserve_exact(slots) {
            tracing::warn!(capacity, error = %e, "cannot allocate seen-before ring");
            return Err(RingError::InvalidCapacity(capacity));
        }
        records.resize(slots, None);

        tracing::debug!(capacity = slots, %mode, "creating seen-before ring");

        Ok(Self {
            mode,
            capacity: slots,
            inner: RwLock::new(Slots {
                records,
                cursor: Cursor::new(slots),
            }),
        })
    }

    /// Create a ring from a raw mode tag (`0` recent, `1` oldest).
    ///
    /// Capacity is checked before the tag.
    pub fn from_tag(capacity: i64, tag: u8) -> Result<Self, RingError> {
        if capacity < 1 {
            return Err(RingError::InvalidCapacity(capacity));
        }
        Self::new(capacity, Mode::try_from(tag)?)
    }

    /// Remember `record`, overwriting the oldest slot once the ring is full.
    ///
    /// Zero-length records are stored like any other and are distinct from
    /// an empty slot.
    pub fn insert(&self, record: &[u8]) {
        self.inner.write().put(record.to_vec());
    }

    /// Returns `true` if some slot holds exactly `record`.
    ///
    /// The scan order follows the ring's [`Mode`]; the answer does not.
    pub fn contains(&self, record: &[u8]) -> bool {
        self.inner.read().find(self.mode, record)
    }

    /// Test and remember in one exclusive step.
    ///
    /// Returns `true` if `record` was already present (nothing is written).
    /// Otherwise inserts it and returns `false`. Unlike `contains` followed
    /// by `insert`, two callers racing on the same record cannot both see
    /// `false`.
    pub fn seen(&self, record: &[u8]) -> bool {
        let mut slots = self.inner.write();
        if slots.find(self.mode, record) {
            return true;
        }
        slots.put(record.to_vec());
        false
    }

    /// Copy of the record written by the latest insertion, or `None` if no
    /// insertion happened since construction or the last reset.
    pub fn most_recent(&self) -> Option<Vec<u8>> {
        let slots = self.inner.read();
        slots.records[slots.cursor.most_recent()].clone()
    }

    /// Copy of the oldest record still held, or `None` if the ring is empty.
    ///
    /// Before the first wrap this is the first record inserted; afterwards
    /// it is the record at the cursor, next in line to be overwritten.
    pub fn oldest(&self) -> Option<Vec<u8>> {
        let slots = self.inner.read();
        slots
            .cursor
            .oldest_first()
            .find_map(|i| slots.records[i].clone())
    }

    /// Forget every record and move the cursor back to slot 0.
    pub fn reset(&self) {
        let mut slots = self.inner.write();
        slots.records.iter_mut().for_each(|r| *r = None);
        slots.cursor.reset();
        tracing::debug!(capacity = slots.records.len(), "seen-before ring reset");
    }

    /// All records still held, oldest first.
    pub fn snapshot(&self) -> Vec<Vec<u8>> {
        let slots = self.inner.read();
        slots
            .cursor
            .oldest_first()
            .filter_map(|i| slots.records[i].clone())
            .collect()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .records
            .iter()
            .filter(|r| r.is_some())
            .count()
    }

    /// Returns `true` if no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.inner.read().records.iter().all(Option::is_none)
    }

    /// Number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Lookup order chosen at construction.
    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }
}

impl Slots {
    fn put(&mut self, record: Vec<u8>) {
        let slot = self.cursor.advance();
        self.records[slot] = Some(record);
    }

    fn find(&self, mode: Mode, record: &[u8]) -> bool {
        match mode {
            Mode::ScanFromRecent => self.scan(self.cursor.newest_first(), record),
            Mode::ScanFromOldest => self.scan(self.cursor.oldest_first(), record),
        }
    }

    #[inline]
    fn scan(&self, mut order: impl Iterator<Item = usize>, record: &[u8]) -> bool {
        order.any(|i| self.records[i].as_deref() == Some(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::seq::SliceRandom;
    use rand::Rng;
    use std::sync::Arc;
    use std::thread;

    const MODES: [Mode; 2] = [Mode::ScanFromRecent, Mode::ScanFromOldest];

    fn key(i: u32) -> [u8; 4] {
        i.to_le_bytes()
    }

    #[test]
    fn test_rejects_non_positive_capacity() {
        assert_eq!(
            RingBuffer::new(0, Mode::ScanFromRecent).unwrap_err(),
            RingError::InvalidCapacity(0)
        );
        assert_eq!(
            RingBuffer::new(-1, Mode::ScanFromOldest).unwrap_err(),
            RingError::InvalidCapacity(-1)
        );
    }

    #[test]
    fn test_rejects_unallocatable_capacity() {
        for mode in MODES {
            assert_eq!(
                RingBuffer::new(i64::MAX, mode).unwrap_err(),
                RingError::InvalidCapacity(i64::MAX)
            );
        }
    }

    #[test]
    fn test_rejects_unknown_mode_tag() {
        assert!(matches!(
            RingBuffer::from_tag(1, 2),
            Err(RingError::InvalidMode(_))
        ));
        // Capacity is reported first when both are wrong.
        assert_eq!(
            RingBuffer::from_tag(0, 9).unwrap_err(),
            RingError::InvalidCapacity(0)
        );
    }

    #[test]
    fn test_new_ring_is_empty() {
        let ring = RingBuffer::from_tag(3, 1).unwrap();
        assert_eq!(ring.mode(), Mode::ScanFromOldest);
        assert_eq!(ring.capacity(), 3);
        assert!(ring.is_empty());
        assert_eq!(ring.len(), 0);
        assert_eq!(ring.most_recent(), None);
        assert_eq!(ring.oldest(), None);
        assert!(ring.snapshot().is_empty());
    }

    #[test]
    fn test_first_insert_is_both_oldest_and_most_recent() {
        let ring = RingBuffer::new(3, Mode::ScanFromRecent).unwrap();
        ring.insert(b"x");
        assert_eq!(ring.most_recent(), Some(b"x".to_vec()));
        assert_eq!(ring.oldest(), Some(b"x".to_vec()));
        assert_eq!(ring.len(), 1);
    }

    #[test]
    fn test_wrap_evicts_oldest() {
        for mode in MODES {
            let ring = RingBuffer::new(4, mode).unwrap();
            for r in ["a", "b", "c", "d", "e"] {
                ring.insert(r.as_bytes());
            }
            assert!(!ring.contains(b"a"));
            assert!(ring.contains(b"b"));
            assert_eq!(ring.most_recent(), Some(b"e".to_vec()));
            assert_eq!(ring.oldest(), Some(b"b".to_vec()));
            assert_eq!(
                ring.snapshot(),
                vec![b"b".to_vec(), b"c".to_vec(), b"d".to_vec(), b"e".to_vec()]
            );
        }
    }

    #[test]
    fn test_overwrite_after_full_cycle() {
        const SIZE: u32 = 1000;
        for mode in MODES {
            let ring = RingBuffer::new(SIZE as i64, mode).unwrap();
            ring.insert(b"testing");
            for i in 0..SIZE {
                ring.insert(&key(i));
            }
            assert!(!ring.contains(b"testing"));
            for i in 0..SIZE {
                assert!(ring.contains(&key(i)), "{mode}: missing {i} after wrap");
            }
        }
    }

    #[test]
    fn test_data_absent_before_insert_present_after() {
        const SIZE: u32 = 256;
        for mode in MODES {
            let ring = RingBuffer::new(SIZE as i64, mode).unwrap();
            for i in 0..SIZE {
                assert!(!ring.contains(&key(i)));
                ring.insert(&key(i));
                assert!(ring.contains(&key(i)));
                assert_eq!(ring.most_recent(), Some(key(i).to_vec()));
            }
        }
    }

    #[test]
    fn test_oldest_before_and_after_first_wrap() {
        const SIZE: u32 = 50;
        let ring = RingBuffer::new(SIZE as i64, Mode::ScanFromRecent).unwrap();
        ring.insert(b"first");
        for i in 0..SIZE - 1 {
            ring.insert(&key(i));
            assert_eq!(ring.oldest(), Some(b"first".to_vec()));
        }
        ring.insert(b"wrap");
        assert_eq!(ring.oldest(), Some(key(0).to_vec()));
    }

    #[test]
    fn test_reset_forgets_everything() {
        for mode in MODES {
            let ring = RingBuffer::new(8, mode).unwrap();
            for i in 0..11 {
                ring.insert(&key(i));
            }
            ring.reset();
            for i in 0..11 {
                assert!(!ring.contains(&key(i)));
            }
            assert_eq!(ring.most_recent(), None);
            assert_eq!(ring.oldest(), None);
            assert!(ring.is_empty());
            assert_eq!(ring.capacity(), 8);

            // The ring fills from slot 0 again.
            ring.insert(b"again");
            assert_eq!(ring.oldest(), Some(b"again".to_vec()));
        }
    }

    #[test]
    fn test_empty_record_differs_from_empty_slot() {
        for mode in MODES {
            let ring = RingBuffer::new(3, mode).unwrap();
            assert!(!ring.contains(b""));
            ring.insert(b"");
            assert!(ring.contains(b""));
            assert_eq!(ring.most_recent(), Some(Vec::new()));
            assert_eq!(ring.oldest(), Some(Vec::new()));

            ring.insert(b"1");
            ring.insert(b"2");
            ring.insert(b"3");
            assert!(!ring.contains(b""));
        }
    }

    #[test]
    fn test_single_slot_ring_keeps_latest() {
        let ring = RingBuffer::new(1, Mode::ScanFromOldest).unwrap();
        ring.insert(b"one");
        ring.insert(b"two");
        assert!(!ring.contains(b"one"));
        assert!(ring.contains(b"two"));
        assert_eq!(ring.oldest(), ring.most_recent());
    }

    #[test]
    fn test_duplicates_occupy_separate_slots() {
        let ring = RingBuffer::new(3, Mode::ScanFromRecent).unwrap();
        ring.insert(b"dup");
        ring.insert(b"dup");
        ring.insert(b"other");
        assert_eq!(ring.len(), 3);
        ring.insert(b"x");
        // One copy of "dup" survives the first eviction.
        assert!(ring.contains(b"dup"));
        ring.insert(b"y");
        assert!(!ring.contains(b"dup"));
    }

    #[test]
    fn test_seen_inserts_only_new_records() {
        let ring = RingBuffer::new(2, Mode::ScanFromRecent).unwrap();
        assert!(!ring.seen(b"a"));
        assert!(ring.seen(b"a"));
        assert_eq!(ring.len(), 1);
        assert!(!ring.seen(b"b"));
        assert!(!ring.seen(b"c"));
        // "a" was evicted, so it is new again.
        assert!(!ring.seen(b"a"));
    }

    #[test]
    fn test_returned_records_are_copies() {
        let ring = RingBuffer::new(2, Mode::ScanFromRecent).unwrap();
        ring.insert(b"keep");
        let mut copy = ring.most_recent().unwrap();
        copy[0] = b'X';
        assert_eq!(ring.most_recent(), Some(b"keep".to_vec()));

        ring.reset();
        assert_eq!(copy, b"Xeep".to_vec());
    }

    #[test]
    fn test_modes_agree_on_membership() {
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let capacity = rng.gen_range(1..16);
            let recent = RingBuffer::new(capacity, Mode::ScanFromRecent).unwrap();
            let oldest = RingBuffer::new(capacity, Mode::ScanFromOldest).unwrap();

            let inserts = rng.gen_range(0..40);
            for _ in 0..inserts {
                let r = [rng.gen_range(0u8..24)];
                recent.insert(&r);
                oldest.insert(&r);
            }

            for q in 0u8..24 {
                assert_eq!(recent.contains(&[q]), oldest.contains(&[q]));
            }
            assert_eq!(recent.snapshot(), oldest.snapshot());
        }
    }

    #[test]
    fn test_concurrent_access_stays_consistent() {
        const SIZE: u32 = 64;
        const THREADS: u32 = 8;
        const ROUNDS: u32 = 500;

        for mode in MODES {
            let ring = Arc::new(RingBuffer::new(SIZE as i64, mode).unwrap());
            let mut handles = Vec::new();

            for t in 0..THREADS {
                let ring = Arc::clone(&ring);
                handles.push(thread::spawn(move || {
                    let mut rng = rand::thread_rng();
                    let mut ops = [0u8, 1, 2, 3, 4];
                    for i in 0..ROUNDS {
                        ops.shuffle(&mut rng);
                        match ops[0] {
                            0 | 1 => ring.insert(&key(t * ROUNDS + i)),
                            2 => {
                                let _ = ring.contains(&key(rng.gen_range(0..THREADS * ROUNDS)));
                            }
                            3 => {
                                if let Some(r) = ring.most_recent() {
                                    assert_eq!(r.len(), 4);
                                }
                                if let Some(r) = ring.oldest() {
                                    assert_eq!(r.len(), 4);
                                }
                            }
                            _ => {
                                if i % 97 == 0 {
                                    ring.reset();
                                }
                            }
                        }
                    }
                }));
            }

            for handle in handles {
                handle.join().unwrap();
            }

            assert!(ring.len() <= SIZE as usize);
            let snapshot = ring.snapshot();
            assert_eq!(snapshot.len(), ring.len());
            if let Some(latest) = ring.most_recent() {
                assert!(ring.contains(&latest));
                assert_eq!(snapshot.last(), Some(&latest));
            }
        }
    }

    #[test]
    fn test_concurrent_seen_admits_each_record_once() {
        const RECORDS: u32 = 200;
        let ring = Arc::new(RingBuffer::new(RECORDS as i64, Mode::ScanFromRecent).unwrap());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ring = Arc::clone(&ring);
                thread::spawn(move || (0..RECORDS).filter(|&i| !ring.seen(&key(i))).count())
            })
            .collect();

        let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(admitted, RECORDS as usize);
        assert_eq!(ring.len(), RECORDS as usize);
    }

    #[test]
    fn test_ring_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RingBuffer>();
    }
}
