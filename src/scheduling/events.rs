//! Tagged events multiplexed onto one bounded queue.
//!
//! The drain task serves more than one periodic source, so its wake path carries a small
//! tag instead of a bare notification. The queue is FIFO and bounded; posting to a full
//! queue drops the new event rather than blocking the trigger.

use crate::scheduling::FireOutcome;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::trace;

/// Event kinds delivered to the drain task. Tags are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Event {
    /// Pop one batch from the ring buffer and forward it to the sink.
    Drain = 2,
    /// Log a diagnostics snapshot.
    Report = 3,
}

impl Event {
    /// Wire tag.
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Event for `tag`, if known.
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            2 => Some(Event::Drain),
            3 => Some(Event::Report),
            _ => None,
        }
    }
}

/// Producer half, cloned into each trigger that posts events.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::Sender<Event>,
}

/// Consumer half, owned by the drain task.
#[derive(Debug)]
pub struct EventReceiver {
    rx: mpsc::Receiver<Event>,
}

/// Create a queue holding at most `depth` undelivered events (minimum 1).
pub fn event_queue(depth: usize) -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::channel(depth.max(1));
    (EventSender { tx }, EventReceiver { rx })
}

impl EventSender {
    /// Post without waiting. A full or closed queue drops `event`.
    pub fn post(&self, event: Event) -> FireOutcome {
        match self.tx.try_send(event) {
            Ok(()) => FireOutcome::Delivered,
            Err(TrySendError::Full(event)) => {
                trace!(tag = event.tag(), "event queue full, dropping newest");
                FireOutcome::Dropped
            }
            Err(TrySendError::Closed(event)) => {
                trace!(tag = event.tag(), "event queue closed, dropping");
                FireOutcome::Dropped
            }
        }
    }
}

impl EventReceiver {
    /// Next event in arrival order; `None` once every sender is gone and the queue is empty.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    /// Next event if one is already queued.
    pub fn try_next(&mut self) -> Option<Event> {
        self.rx.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_are_stable() {
        assert_eq!(Event::Drain.tag(), 2);
        assert_eq!(Event::Report.tag(), 3);
        assert_eq!(Event::from_tag(2), Some(Event::Drain));
        assert_eq!(Event::from_tag(3), Some(Event::Report));
        assert_eq!(Event::from_tag(9), None);
    }

    #[tokio::test]
    async fn test_full_queue_drops_newest() {
        let (tx, mut rx) = event_queue(2);
        assert_eq!(tx.post(Event::Drain), FireOutcome::Delivered);
        assert_eq!(tx.post(Event::Report), FireOutcome::Delivered);
        assert_eq!(tx.post(Event::Drain), FireOutcome::Dropped);

        assert_eq!(rx.next().await, Some(Event::Drain));
        assert_eq!(rx.next().await, Some(Event::Report));
        assert_eq!(rx.try_next(), None);
    }

    #[tokio::test]
    async fn test_closed_queue_drops() {
        let (tx, rx) = event_queue(1);
        drop(rx);
        assert_eq!(tx.post(Event::Drain), FireOutcome::Dropped);
    }

    #[tokio::test]
    async fn test_receiver_ends_when_senders_gone() {
        let (tx, mut rx) = event_queue(4);
        tx.post(Event::Drain);
        drop(tx);
        assert_eq!(rx.next().await, Some(Event::Drain));
        assert_eq!(rx.next().await, None);
    }
}
