//! Drain task.
//!
//! Consumes tagged events. On [`Event::Drain`] it takes the buffer lock once, pops a
//! fixed batch of `B` slots, releases the lock and forwards the batch to the sink in pop
//! order: real rows first, then one empty marker per slot that found the buffer empty.
//! If the lock is not obtained in time the whole batch is skipped until the next event.
//!
//! On [`Event::Report`] it logs a diagnostics snapshot. Dispatch is purely on the tag.

use crate::data::{Row, SharedRing};
use crate::diagnostics::Diagnostics;
use crate::hardware::Sink;
use crate::scheduling::{shutdown_signalled, Event, EventReceiver};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Result of one drain event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Buffer lock timed out; nothing popped.
    Skipped,
    /// Batch forwarded: `rows` real rows followed by `empty` markers.
    Drained {
        /// Rows popped and emitted.
        rows: usize,
        /// Slots that found the buffer empty.
        empty: usize,
    },
}

/// Consumer side of the pipeline.
pub struct DrainTask<K, const N: usize> {
    sink: K,
    ring: SharedRing<Row<N>>,
    events: EventReceiver,
    batch: usize,
    lock_timeout: Duration,
    flush_on_shutdown: bool,
    diagnostics: Arc<Diagnostics>,
    popped: Vec<Option<Row<N>>>,
}

impl<K: Sink, const N: usize> DrainTask<K, N> {
    /// Task popping `batch` rows per drain event from `ring` into `sink`.
    pub fn new(
        sink: K,
        ring: SharedRing<Row<N>>,
        events: EventReceiver,
        batch: usize,
        lock_timeout: Duration,
        diagnostics: Arc<Diagnostics>,
    ) -> Self {
        Self {
            sink,
            ring,
            events,
            batch,
            lock_timeout,
            flush_on_shutdown: false,
            diagnostics,
            popped: Vec::with_capacity(batch),
        }
    }

    /// Empty the buffer into the sink before exiting.
    pub fn flush_on_shutdown(mut self, enabled: bool) -> Self {
        self.flush_on_shutdown = enabled;
        self
    }

    /// Pop one batch and forward it.
    pub async fn drain_once(&mut self) -> DrainOutcome {
        self.diagnostics.drain_woken();

        let mut buffer = match self.ring.lock_within(self.lock_timeout).await {
            Ok(guard) => guard,
            Err(err) => {
                self.diagnostics.drain_contended();
                debug!(error = %err, "skipping drain batch");
                return DrainOutcome::Skipped;
            }
        };
        self.popped.clear();
        for _ in 0..self.batch {
            self.popped.push(buffer.pop());
        }
        drop(buffer);

        let (mut rows, mut empty) = (0, 0);
        for slot in self.popped.drain(..) {
            let result = match slot {
                Some(row) => {
                    rows += 1;
                    self.diagnostics.row_emitted();
                    self.sink.emit(&row)
                }
                None => {
                    empty += 1;
                    self.diagnostics.empty_marker();
                    self.sink.emit_empty_marker()
                }
            };
            if let Err(err) = result {
                self.diagnostics.sink_error();
                warn!(error = %err, "sink rejected output");
            }
        }
        self.flush_sink();

        DrainOutcome::Drained { rows, empty }
    }

    /// Log counters and the advisory fill level.
    pub fn report(&mut self) {
        self.diagnostics.reported();
        let snapshot = self.diagnostics.snapshot();
        let buffered = self.ring.try_len();
        info!(
            ?buffered,
            capacity = self.ring.capacity(),
            rows_acquired = snapshot.rows_acquired,
            rows_emitted = snapshot.rows_emitted,
            rows_overwritten = snapshot.rows_overwritten,
            push_contention = snapshot.push_contention,
            drain_contention = snapshot.drain_contention,
            coalesced_wakes = snapshot.coalesced_wakes,
            events_dropped = snapshot.events_dropped,
            empty_markers = snapshot.empty_markers,
            sink_errors = snapshot.sink_errors,
            "sampler report"
        );
    }

    /// Dispatch one event.
    pub async fn handle(&mut self, event: Event) {
        match event {
            Event::Drain => {
                self.drain_once().await;
            }
            Event::Report => self.report(),
        }
    }

    /// Pop everything left and emit it, without empty markers. Returns rows emitted.
    pub async fn drain_remaining(&mut self) -> usize {
        let mut buffer = match self.ring.lock_within(self.lock_timeout).await {
            Ok(guard) => guard,
            Err(err) => {
                self.diagnostics.drain_contended();
                warn!(error = %err, "final flush skipped");
                return 0;
            }
        };
        let remaining: Vec<Row<N>> = std::iter::from_fn(|| buffer.pop()).collect();
        drop(buffer);

        for row in &remaining {
            self.diagnostics.row_emitted();
            if let Err(err) = self.sink.emit(row) {
                self.diagnostics.sink_error();
                warn!(error = %err, "sink rejected output");
            }
        }
        self.flush_sink();
        remaining.len()
    }

    fn flush_sink(&mut self) {
        if let Err(err) = self.sink.flush() {
            self.diagnostics.sink_error();
            warn!(error = %err, "sink flush failed");
        }
    }

    /// Loop until shutdown or until every event sender is gone.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(batch = self.batch, lock_timeout = ?self.lock_timeout, "drain task started");
        loop {
            tokio::select! {
                biased;
                _ = shutdown_signalled(&mut shutdown) => break,
                event = self.events.next() => match event {
                    Some(event) => self.handle(event).await,
                    None => break,
                },
            }
        }

        if self.flush_on_shutdown {
            let flushed = self.drain_remaining().await;
            info!(rows = flushed, "flushed remaining rows");
        }
        info!("drain task stopped");
    }
}
