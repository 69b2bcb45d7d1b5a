//! Fixed-period trigger.
//!
//! A [`PeriodicTrigger`] ticks on a tokio interval and, on every tick, calls
//! [`TickTarget::fire`] exactly once. The fire action never blocks, never samples and
//! never touches the ring buffer. A fire that cannot be delivered is dropped; the
//! outcome only feeds the diagnostics counters.
//!
//! Late ticks are skipped rather than replayed in a burst (`MissedTickBehavior::Skip`).

use crate::diagnostics::{Diagnostics, TriggerKind};
use crate::scheduling::{shutdown_signalled, Event, EventSender, WakeSignal};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, trace};

/// What happened to a single fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireOutcome {
    /// The target was woken.
    Delivered,
    /// A wake was already pending; this fire was folded into it.
    Coalesced,
    /// The target could not accept the fire; the tick is lost.
    Dropped,
}

/// Something a trigger can wake.
pub trait TickTarget: Send + Sync + 'static {
    /// Deliver one wake. Must return promptly.
    fn fire(&self) -> FireOutcome;
}

impl TickTarget for Arc<WakeSignal> {
    fn fire(&self) -> FireOutcome {
        self.raise()
    }
}

/// Posts a fixed event kind to an event queue.
#[derive(Debug, Clone)]
pub struct EventTarget {
    sender: EventSender,
    event: Event,
}

impl EventTarget {
    /// Target that posts `event` through `sender`.
    pub fn new(sender: EventSender, event: Event) -> Self {
        Self { sender, event }
    }
}

impl TickTarget for EventTarget {
    fn fire(&self) -> FireOutcome {
        self.sender.post(self.event)
    }
}

/// Periodic time source bound to exactly one target.
pub struct PeriodicTrigger<T> {
    kind: TriggerKind,
    period: Duration,
    target: T,
    diagnostics: Arc<Diagnostics>,
}

impl<T: TickTarget> PeriodicTrigger<T> {
    /// Trigger firing `target` every `period`.
    pub fn new(
        kind: TriggerKind,
        period: Duration,
        target: T,
        diagnostics: Arc<Diagnostics>,
    ) -> Self {
        Self {
            kind,
            period,
            target,
            diagnostics,
        }
    }

    /// Configured period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Fire once, recording the outcome.
    pub fn fire(&self) -> FireOutcome {
        let outcome = self.target.fire();
        self.diagnostics.record_fire(self.kind, outcome);
        if outcome != FireOutcome::Delivered {
            trace!(kind = ?self.kind, ?outcome, "tick not delivered");
        }
        outcome
    }

    /// Run until `shutdown` flips to `true` or its sender is dropped.
    ///
    /// The first fire happens one full period after spawning.
    pub fn spawn(self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + self.period, self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            debug!(kind = ?self.kind, period = ?self.period, "trigger started");

            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_signalled(&mut shutdown) => break,
                    _ = ticker.tick() => {
                        self.fire();
                    }
                }
            }

            debug!(kind = ?self.kind, "trigger stopped");
        })
    }
}
