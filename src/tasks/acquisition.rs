//! Acquisition task.
//!
//! Waits for the fast trigger, reads every configured channel into one complete row, then
//! pushes the row under a short bounded lock. If the lock is not obtained in time the
//! whole row is dropped: no partial write, no retry, only a counter.

use crate::data::{ChannelId, Row, Sample, SharedRing};
use crate::diagnostics::Diagnostics;
use crate::hardware::SampleSource;
use crate::scheduling::{shutdown_signalled, WakeSignal};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info};

/// Result of one wake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// Row appended.
    Stored,
    /// Row appended after evicting the oldest row.
    Overwrote,
    /// Buffer lock timed out; row discarded.
    Dropped,
}

/// Producer side of the pipeline.
pub struct AcquisitionTask<S, const N: usize> {
    source: S,
    channels: [ChannelId; N],
    ring: SharedRing<Row<N>>,
    wake: Arc<WakeSignal>,
    lock_timeout: Duration,
    diagnostics: Arc<Diagnostics>,
}

impl<S: SampleSource, const N: usize> AcquisitionTask<S, N> {
    /// Task reading `channels` (in that order) from `source` into `ring`.
    pub fn new(
        source: S,
        channels: [ChannelId; N],
        ring: SharedRing<Row<N>>,
        wake: Arc<WakeSignal>,
        lock_timeout: Duration,
        diagnostics: Arc<Diagnostics>,
    ) -> Self {
        Self {
            source,
            channels,
            ring,
            wake,
            lock_timeout,
            diagnostics,
        }
    }

    /// Read one sample from every channel. Never touches the buffer.
    pub fn sample_row(&mut self) -> Row<N> {
        let mut samples: [Sample; N] = [0; N];
        for (slot, &channel) in samples.iter_mut().zip(self.channels.iter()) {
            *slot = self.source.read(channel);
        }
        self.diagnostics.row_acquired();
        Row::new(samples)
    }

    /// Handle one wake: sample, then push or drop.
    pub async fn acquire_once(&mut self) -> AcquireOutcome {
        let row = self.sample_row();

        let mut buffer = match self.ring.lock_within(self.lock_timeout).await {
            Ok(guard) => guard,
            Err(err) => {
                self.diagnostics.push_contended();
                debug!(error = %err, "dropping row");
                return AcquireOutcome::Dropped;
            }
        };
        let evicted = buffer.push(row).is_some();
        drop(buffer);

        self.diagnostics.row_stored(evicted);
        if evicted {
            AcquireOutcome::Overwrote
        } else {
            AcquireOutcome::Stored
        }
    }

    /// Loop until shutdown. Blocks indefinitely only on the wake signal.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(channels = N, lock_timeout = ?self.lock_timeout, "acquisition task started");
        loop {
            tokio::select! {
                biased;
                _ = shutdown_signalled(&mut shutdown) => break,
                _ = self.wake.wait() => {
                    self.acquire_once().await;
                }
            }
        }
        info!("acquisition task stopped");
    }
}
