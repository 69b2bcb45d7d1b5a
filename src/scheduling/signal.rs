//! Direct task notification with a single pending unit.
//!
//! A [`WakeSignal`] behaves like a binary task notification: raising it while a wake is
//! already pending does nothing except report [`FireOutcome::Coalesced`]. The waiting
//! task therefore runs at most once per wait, however many periods it fell behind.

use crate::scheduling::FireOutcome;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;

/// Binary wake signal from one producer to one waiting task.
#[derive(Debug, Default)]
pub struct WakeSignal {
    pending: AtomicBool,
    notify: Notify,
}

impl WakeSignal {
    /// Signal with nothing pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark work as pending and wake the waiter. Never blocks.
    pub fn raise(&self) -> FireOutcome {
        if self.pending.swap(true, Ordering::AcqRel) {
            return FireOutcome::Coalesced;
        }
        self.notify.notify_one();
        FireOutcome::Delivered
    }

    /// Whether a raise has not been consumed yet.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Wait until raised, consuming the pending unit.
    ///
    /// Cancel safe: dropping the future never loses a raise.
    pub async fn wait(&self) {
        loop {
            if self.pending.swap(false, Ordering::AcqRel) {
                return;
            }
            // notify_one stores a permit when nobody is waiting, so a raise between the
            // swap above and this await is not lost.
            self.notify.notified().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_raise_then_wait() {
        let signal = WakeSignal::new();
        assert_eq!(signal.raise(), FireOutcome::Delivered);
        assert!(signal.is_pending());
        signal.wait().await;
        assert!(!signal.is_pending());
    }

    #[tokio::test]
    async fn test_duplicate_raises_coalesce() {
        let signal = WakeSignal::new();
        assert_eq!(signal.raise(), FireOutcome::Delivered);
        assert_eq!(signal.raise(), FireOutcome::Coalesced);
        assert_eq!(signal.raise(), FireOutcome::Coalesced);

        signal.wait().await;
        // Only one unit was pending; a second wait must block.
        let second = tokio::time::timeout(Duration::from_millis(20), signal.wait()).await;
        assert!(second.is_err());
    }

    #[tokio::test]
    async fn test_wakes_a_parked_waiter() {
        let signal = Arc::new(WakeSignal::new());
        let waiter = {
            let signal = Arc::clone(&signal);
            tokio::spawn(async move { signal.wait().await })
        };
        tokio::task::yield_now().await;
        signal.raise();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter woke")
            .unwrap();
    }
}
