//! The single shared ring buffer instance.
//!
//! One mutex guards the storage and all three cursors together, so a half-applied push or
//! pop is never visible outside the critical section. Every acquisition is bounded by a
//! timeout; callers that miss it drop their operation instead of waiting.

use crate::data::RingBuffer;
use crate::error::{AppResult, DaqError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};

/// Cloneable handle to the process-wide ring buffer.
///
/// Clones share the same buffer; the pipeline creates exactly one and hands a handle to
/// the acquisition task and one to the drain task.
pub struct SharedRing<T> {
    inner: Arc<Mutex<RingBuffer<T>>>,
    capacity: usize,
}

impl<T> Clone for SharedRing<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            capacity: self.capacity,
        }
    }
}

impl<T> SharedRing<T> {
    /// Take ownership of `buffer` and put it behind the lock.
    pub fn new(buffer: RingBuffer<T>) -> Self {
        let capacity = buffer.capacity();
        Self {
            inner: Arc::new(Mutex::new(buffer)),
            capacity,
        }
    }

    /// Acquire exclusive access, giving up after `limit`.
    pub async fn lock_within(&self, limit: Duration) -> AppResult<MutexGuard<'_, RingBuffer<T>>> {
        tokio::time::timeout(limit, self.inner.lock())
            .await
            .map_err(|_| DaqError::AccessTimeout(limit))
    }

    /// Current fill level if the lock happens to be free.
    ///
    /// Advisory only: the value may be stale as soon as it is returned.
    pub fn try_len(&self) -> Option<usize> {
        self.inner.try_lock().ok().map(|guard| guard.len())
    }

    /// Fixed slot count.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lock_within_and_push() {
        let ring = SharedRing::new(RingBuffer::with_capacity(2).unwrap());
        {
            let mut guard = ring.lock_within(Duration::from_millis(5)).await.unwrap();
            guard.push(1u8);
        }
        assert_eq!(ring.try_len(), Some(1));
        assert_eq!(ring.capacity(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lock_times_out_while_held() {
        let ring = SharedRing::new(RingBuffer::<u8>::with_capacity(2).unwrap());
        let other = ring.clone();

        let _held = ring.lock_within(Duration::from_millis(5)).await.unwrap();
        assert_eq!(other.try_len(), None);

        let err = other.lock_within(Duration::from_millis(2)).await.unwrap_err();
        assert!(matches!(err, DaqError::AccessTimeout(d) if d == Duration::from_millis(2)));
    }
}
