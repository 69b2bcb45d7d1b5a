//! Advisory counters.
//!
//! Every recovered condition (coalesced wake, overwrite, contention drop, dropped event,
//! empty drain slot, sink failure) bumps a counter here instead of surfacing as an error.
//! Counters use relaxed atomics: they are for observation, never for control flow.

use crate::scheduling::FireOutcome;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Which periodic source fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    /// Fast trigger waking the acquisition task.
    Sample,
    /// Slow trigger posting drain events.
    Drain,
    /// Optional trigger posting report events.
    Report,
}

/// Live counters shared by triggers and tasks.
#[derive(Debug, Default)]
pub struct Diagnostics {
    sample_ticks: AtomicU64,
    coalesced_wakes: AtomicU64,
    rows_acquired: AtomicU64,
    rows_stored: AtomicU64,
    rows_overwritten: AtomicU64,
    push_contention: AtomicU64,
    drain_ticks: AtomicU64,
    report_ticks: AtomicU64,
    events_dropped: AtomicU64,
    drain_wakes: AtomicU64,
    rows_emitted: AtomicU64,
    empty_markers: AtomicU64,
    drain_contention: AtomicU64,
    sink_errors: AtomicU64,
    reports: AtomicU64,
}

/// Point-in-time copy of [`Diagnostics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiagnosticsSnapshot {
    /// Fast trigger fires.
    pub sample_ticks: u64,
    /// Fast fires folded into an already pending wake.
    pub coalesced_wakes: u64,
    /// Rows read from the source.
    pub rows_acquired: u64,
    /// Rows pushed into the ring buffer.
    pub rows_stored: u64,
    /// Rows evicted by overwrite-oldest.
    pub rows_overwritten: u64,
    /// Rows dropped because the buffer lock timed out.
    pub push_contention: u64,
    /// Drain trigger fires.
    pub drain_ticks: u64,
    /// Report trigger fires.
    pub report_ticks: u64,
    /// Events lost to a full or closed event queue.
    pub events_dropped: u64,
    /// Drain events handled.
    pub drain_wakes: u64,
    /// Rows handed to the sink.
    pub rows_emitted: u64,
    /// Empty markers handed to the sink.
    pub empty_markers: u64,
    /// Drain batches skipped because the buffer lock timed out.
    pub drain_contention: u64,
    /// Sink calls that returned an error.
    pub sink_errors: u64,
    /// Report events handled.
    pub reports: u64,
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

impl Diagnostics {
    /// Fresh set of zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one trigger fire and its delivery outcome.
    pub fn record_fire(&self, kind: TriggerKind, outcome: FireOutcome) {
        match kind {
            TriggerKind::Sample => bump(&self.sample_ticks),
            TriggerKind::Drain => bump(&self.drain_ticks),
            TriggerKind::Report => bump(&self.report_ticks),
        }
        match outcome {
            FireOutcome::Delivered => {}
            FireOutcome::Coalesced => bump(&self.coalesced_wakes),
            FireOutcome::Dropped => bump(&self.events_dropped),
        }
    }

    pub(crate) fn row_acquired(&self) {
        bump(&self.rows_acquired);
    }

    pub(crate) fn row_stored(&self, overwrote: bool) {
        bump(&self.rows_stored);
        if overwrote {
            bump(&self.rows_overwritten);
        }
    }

    pub(crate) fn push_contended(&self) {
        bump(&self.push_contention);
    }

    pub(crate) fn drain_woken(&self) {
        bump(&self.drain_wakes);
    }

    pub(crate) fn row_emitted(&self) {
        bump(&self.rows_emitted);
    }

    pub(crate) fn empty_marker(&self) {
        bump(&self.empty_markers);
    }

    pub(crate) fn drain_contended(&self) {
        bump(&self.drain_contention);
    }

    pub(crate) fn sink_error(&self) {
        bump(&self.sink_errors);
    }

    pub(crate) fn reported(&self) {
        bump(&self.reports);
    }

    /// Copy all counters.
    pub fn snapshot(&self) -> DiagnosticsSnapshot {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        DiagnosticsSnapshot {
            sample_ticks: load(&self.sample_ticks),
            coalesced_wakes: load(&self.coalesced_wakes),
            rows_acquired: load(&self.rows_acquired),
            rows_stored: load(&self.rows_stored),
            rows_overwritten: load(&self.rows_overwritten),
            push_contention: load(&self.push_contention),
            drain_ticks: load(&self.drain_ticks),
            report_ticks: load(&self.report_ticks),
            events_dropped: load(&self.events_dropped),
            drain_wakes: load(&self.drain_wakes),
            rows_emitted: load(&self.rows_emitted),
            empty_markers: load(&self.empty_markers),
            drain_contention: load(&self.drain_contention),
            sink_errors: load(&self.sink_errors),
            reports: load(&self.reports),
        }
    }
}

impl DiagnosticsSnapshot {
    /// Rows acquired but never stored (lock timeouts).
    pub fn rows_lost_to_contention(&self) -> u64 {
        self.rows_acquired.saturating_sub(self.rows_stored)
    }
}
