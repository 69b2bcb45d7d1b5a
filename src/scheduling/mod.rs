//! Periodic triggers and the wake paths from triggers to tasks.
//!
//! Triggers stand in for timer interrupts: their fire action only posts a wake signal or
//! an event and returns. Sampling, buffer access and output all happen in the tasks.

pub mod events;
pub mod signal;
pub mod trigger;

pub use events::{event_queue, Event, EventReceiver, EventSender};
pub use signal::WakeSignal;
pub use trigger::{EventTarget, FireOutcome, PeriodicTrigger, TickTarget};

use tokio::sync::watch;

/// Resolve once `shutdown` holds `true` or its sender is gone.
///
/// Cancel safe, so it can sit in a `select!` next to a tick or wake branch.
pub(crate) async fn shutdown_signalled(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}
