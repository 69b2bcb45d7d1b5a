//! Fixed-capacity ring buffer with overwrite-oldest eviction.
//!
//! The buffer is allocated once, never resized, and tracks three cursors:
//!
//! ```text
//!   tail                head
//!    v                   v
//! [ r2 | r3 | r4 | ... | __ | __ ]      count = head - tail (mod capacity)
//! ```
//!
//! - `head`: next slot to write
//! - `tail`: next slot to read (the oldest live row)
//! - `count`: rows currently held, `0 <= count <= capacity`
//!
//! When `count == capacity` a push evicts the row at `tail` and advances `tail` before
//! writing, so the write always lands and the oldest row is the one lost. Popped slots are
//! emptied, so a stale row can never be handed out twice.
//!
//! `RingBuffer` itself is not synchronised. All methods take `&self`/`&mut self` and the
//! caller is expected to hold exclusive access, see [`SharedRing`](super::SharedRing).

use crate::error::{AppResult, DaqError};
use std::num::NonZeroUsize;

/// Cursor-based FIFO of `T` with a fixed number of slots.
#[derive(Debug)]
pub struct RingBuffer<T> {
    slots: Box<[Option<T>]>,
    head: usize,
    tail: usize,
    count: usize,
    evicted: u64,
}

impl<T> RingBuffer<T> {
    /// Allocate a buffer with `capacity` empty slots.
    pub fn new(capacity: NonZeroUsize) -> Self {
        let slots = (0..capacity.get()).map(|_| None).collect();
        Self {
            slots,
            head: 0,
            tail: 0,
            count: 0,
            evicted: 0,
        }
    }

    /// Allocate a buffer, rejecting a zero capacity.
    pub fn with_capacity(capacity: usize) -> AppResult<Self> {
        NonZeroUsize::new(capacity).map(Self::new).ok_or_else(|| {
            DaqError::Configuration("ring buffer capacity must be at least 1".into())
        })
    }

    /// Append `item`; if the buffer is full the oldest item is evicted and returned.
    ///
    /// O(1), never fails. `len()` grows by one unless the buffer was already full, in
    /// which case it is unchanged and `tail` has moved forward by one slot.
    pub fn push(&mut self, item: T) -> Option<T> {
        let capacity = self.slots.len();
        let evicted = if self.count == capacity {
            let oldest = self.slots[self.tail].take();
            self.tail = (self.tail + 1) % capacity;
            self.count -= 1;
            self.evicted += 1;
            oldest
        } else {
            None
        };

        self.slots[self.head] = Some(item);
        self.head = (self.head + 1) % capacity;
        self.count += 1;
        self.debug_check();
        evicted
    }

    /// Remove and return the oldest item, or `None` when empty.
    pub fn pop(&mut self) -> Option<T> {
        if self.count == 0 {
            return None;
        }
        let item = self.slots[self.tail].take();
        self.tail = (self.tail + 1) % self.slots.len();
        self.count -= 1;
        self.debug_check();
        item
    }

    /// Oldest item without removing it.
    pub fn peek(&self) -> Option<&T> {
        if self.count == 0 {
            None
        } else {
            self.slots[self.tail].as_ref()
        }
    }

    /// Rows currently held.
    pub fn len(&self) -> usize {
        self.count
    }

    /// True when nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// True when the next push will evict.
    pub fn is_full(&self) -> bool {
        self.count == self.slots.len()
    }

    /// Fixed slot count.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Total items discarded by overwrite since creation.
    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    /// Live items, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        let capacity = self.slots.len();
        (0..self.count)
            .filter_map(move |offset| self.slots[(self.tail + offset) % capacity].as_ref())
    }

    /// Drop every live item. Cursors return to the origin; the eviction count is kept.
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
        self.head = 0;
        self.tail = 0;
        self.count = 0;
    }

    #[inline]
    fn debug_check(&self) {
        debug_assert!(self.count <= self.slots.len());
        debug_assert_eq!(
            (self.tail + self.count) % self.slots.len(),
            self.head,
            "head must sit count slots past tail"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(capacity: usize) -> RingBuffer<u32> {
        RingBuffer::with_capacity(capacity).unwrap()
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(RingBuffer::<u32>::with_capacity(0).is_err());
    }

    #[test]
    fn test_fifo_within_capacity() {
        let mut rb = ring(4);
        for i in 1..=4 {
            assert_eq!(rb.push(i), None);
        }
        assert!(rb.is_full());
        assert_eq!(rb.pop(), Some(1));
        assert_eq!(rb.pop(), Some(2));
        assert_eq!(rb.pop(), Some(3));
        assert_eq!(rb.pop(), Some(4));
        assert_eq!(rb.pop(), None);
    }

    #[test]
    fn test_overwrite_evicts_oldest() {
        let mut rb = ring(3);
        assert_eq!(rb.push(1), None);
        assert_eq!(rb.push(2), None);
        assert_eq!(rb.push(3), None);
        assert_eq!(rb.push(4), Some(1));

        assert_eq!(rb.len(), 3);
        assert_eq!(rb.evicted(), 1);
        assert_eq!(rb.iter().copied().collect::<Vec<_>>(), vec![2, 3, 4]);

        assert_eq!(rb.pop(), Some(2));
        assert_eq!(rb.pop(), Some(3));
        assert_eq!(rb.pop(), Some(4));
        assert_eq!(rb.pop(), None);
    }

    #[test]
    fn test_two_channel_row_roundtrip() {
        use crate::data::Row;

        let mut rb: RingBuffer<Row<2>> = RingBuffer::with_capacity(4).unwrap();
        rb.push(Row::new([10, 20]));
        assert_eq!(rb.pop(), Some(Row::new([10, 20])));
        assert!(rb.is_empty());
        assert_eq!(rb.pop(), None);
    }

    #[test]
    fn test_wraps_after_interleaved_use() {
        let mut rb = ring(2);
        for i in 0..10 {
            rb.push(i);
            assert_eq!(rb.pop(), Some(i));
        }
        assert!(rb.is_empty());
        assert_eq!(rb.peek(), None);
        assert_eq!(rb.evicted(), 0);
    }

    #[test]
    fn test_single_slot_buffer() {
        let mut rb = ring(1);
        assert_eq!(rb.push(7), None);
        assert_eq!(rb.push(8), Some(7));
        assert_eq!(rb.peek(), Some(&8));
        assert_eq!(rb.pop(), Some(8));
        assert_eq!(rb.pop(), None);
    }

    #[test]
    fn test_clear_keeps_eviction_count() {
        let mut rb = ring(2);
        rb.push(1);
        rb.push(2);
        rb.push(3);
        rb.clear();
        assert!(rb.is_empty());
        assert_eq!(rb.evicted(), 1);
        rb.push(9);
        assert_eq!(rb.pop(), Some(9));
    }
}
