//! Pipeline wiring and lifecycle.
//!
//! [`Pipeline::spawn`] brings the collaborators up, creates the single shared ring buffer,
//! then starts the consumers before the time sources:
//!
//! 1. acquisition task (waits on the wake signal)
//! 2. drain task (waits on the event queue)
//! 3. fast trigger, slow trigger, optional report trigger
//!
//! Collaborator init failures never stop the pipeline. A failed source is reported once
//! through the sink and sampling continues; a failed sink is logged and every later emit
//! goes to the sink anyway.
//!
//! Shutdown is staged: triggers and the acquisition task stop first, then the drain task
//! gets its own stop signal so its final flush sees every stored row.

use crate::config::SamplerConfig;
use crate::data::{ChannelId, RingBuffer, Row, SharedRing};
use crate::diagnostics::{Diagnostics, DiagnosticsSnapshot, TriggerKind};
use crate::error::{AppResult, DaqError};
use crate::hardware::{SampleSource, Sink};
use crate::scheduling::{
    event_queue, Event, EventSender, EventTarget, PeriodicTrigger, WakeSignal,
};
use crate::tasks::{AcquisitionTask, DrainTask};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// How long each task gets to stop before it is aborted.
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// A configured, not yet running pipeline for rows `N` channels wide.
pub struct Pipeline<S, K, const N: usize> {
    config: SamplerConfig,
    channels: [ChannelId; N],
    source: S,
    sink: K,
}

impl<S: SampleSource, K: Sink, const N: usize> Pipeline<S, K, N> {
    /// Validate `config` and bind the collaborators.
    ///
    /// Fails when the configuration is unusable or lists a channel count other than `N`.
    pub fn new(config: SamplerConfig, source: S, sink: K) -> AppResult<Self> {
        config.validate()?;
        let channels = config.channel_array::<N>()?;
        for note in config.advisories() {
            warn!("{note}");
        }
        Ok(Self {
            config,
            channels,
            source,
            sink,
        })
    }

    /// Configuration the pipeline was built with.
    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Initialize collaborators and start every task. Must be called inside a tokio runtime.
    pub fn spawn(self) -> AppResult<PipelineHandle<N>> {
        let Self {
            config,
            channels,
            mut source,
            mut sink,
        } = self;

        if let Err(e) = sink.init() {
            let fault = DaqError::SinkInit(format!("{e:#}"));
            error!(error = %fault, "continuing with degraded sink");
        }
        if let Err(e) = source.init() {
            let fault = DaqError::SourceInit(format!("{e:#}"));
            error!(error = %fault, "continuing with degraded source");
            if let Err(e) = sink.report_fault(&fault.to_string()) {
                warn!(error = %e, "could not report source fault to sink");
            }
        }

        let diagnostics = Arc::new(Diagnostics::new());
        let ring = SharedRing::new(RingBuffer::with_capacity(config.buffer.capacity)?);
        let wake = Arc::new(WakeSignal::new());
        let (events_tx, events_rx) = event_queue(config.drain.event_queue_depth);
        let (stop_tx, stop_rx) = watch::channel(false);
        let (drain_stop_tx, drain_stop_rx) = watch::channel(false);

        let acquisition = AcquisitionTask::new(
            source,
            channels,
            ring.clone(),
            Arc::clone(&wake),
            config.acquisition.lock_timeout,
            Arc::clone(&diagnostics),
        );
        let drain = DrainTask::new(
            sink,
            ring.clone(),
            events_rx,
            config.drain.batch,
            config.drain.lock_timeout,
            Arc::clone(&diagnostics),
        )
        .flush_on_shutdown(config.drain.flush_on_shutdown);

        let mut tasks = vec![(
            "acquisition",
            tokio::spawn(acquisition.run(stop_rx.clone())),
        )];
        let drain = tokio::spawn(drain.run(drain_stop_rx));

        let sample_trigger = PeriodicTrigger::new(
            TriggerKind::Sample,
            config.acquisition.sample_period,
            wake,
            Arc::clone(&diagnostics),
        );
        tasks.push(("sample trigger", sample_trigger.spawn(stop_rx.clone())));

        let drain_trigger = PeriodicTrigger::new(
            TriggerKind::Drain,
            config.drain.period,
            EventTarget::new(events_tx.clone(), Event::Drain),
            Arc::clone(&diagnostics),
        );
        tasks.push(("drain trigger", drain_trigger.spawn(stop_rx.clone())));

        if let Some(period) = config.report.period {
            let report_trigger = PeriodicTrigger::new(
                TriggerKind::Report,
                period,
                EventTarget::new(events_tx.clone(), Event::Report),
                Arc::clone(&diagnostics),
            );
            tasks.push(("report trigger", report_trigger.spawn(stop_rx)));
        }

        info!(
            channels = N,
            capacity = config.buffer.capacity,
            sample_period = ?config.acquisition.sample_period,
            drain_period = ?config.drain.period,
            batch = config.drain.batch,
            "pipeline started"
        );

        Ok(PipelineHandle {
            diagnostics,
            ring,
            stop_tx,
            drain_stop_tx,
            events: events_tx,
            tasks,
            drain,
        })
    }
}

/// Running pipeline.
///
/// Dropping the handle without calling [`shutdown`](Self::shutdown) closes the stop
/// channels, which also ends every task, but skips the ordered join.
pub struct PipelineHandle<const N: usize> {
    diagnostics: Arc<Diagnostics>,
    ring: SharedRing<Row<N>>,
    stop_tx: watch::Sender<bool>,
    drain_stop_tx: watch::Sender<bool>,
    events: EventSender,
    tasks: Vec<(&'static str, JoinHandle<()>)>,
    drain: JoinHandle<()>,
}

impl<const N: usize> PipelineHandle<N> {
    /// Shared counters.
    pub fn diagnostics(&self) -> &Arc<Diagnostics> {
        &self.diagnostics
    }

    /// Current fill level, if the buffer is not locked right now. Advisory only.
    pub fn buffered(&self) -> Option<usize> {
        self.ring.try_len()
    }

    /// Stop every task and return the final counters.
    pub async fn shutdown(self) -> AppResult<DiagnosticsSnapshot> {
        let mut errors = Vec::new();

        let _ = self.stop_tx.send(true);
        for (name, handle) in self.tasks {
            if let Err(e) = join_within(name, handle).await {
                errors.push(e);
            }
        }

        drop(self.events);
        let _ = self.drain_stop_tx.send(true);
        if let Err(e) = join_within("drain", self.drain).await {
            errors.push(e);
        }

        let snapshot = self.diagnostics.snapshot();
        info!(
            rows_acquired = snapshot.rows_acquired,
            rows_emitted = snapshot.rows_emitted,
            rows_overwritten = snapshot.rows_overwritten,
            rows_lost_to_contention = snapshot.rows_lost_to_contention(),
            "pipeline stopped"
        );

        match errors.len() {
            0 => Ok(snapshot),
            1 => Err(errors.remove(0)),
            _ => Err(DaqError::ShutdownFailed(errors)),
        }
    }
}

async fn join_within(name: &'static str, mut handle: JoinHandle<()>) -> AppResult<()> {
    match tokio::time::timeout(SHUTDOWN_TIMEOUT, &mut handle).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => {
            error!(task = name, error = %e, "task terminated abnormally");
            Err(DaqError::TaskFailed(name, e.to_string()))
        }
        Err(_) => {
            warn!(task = name, timeout = ?SHUTDOWN_TIMEOUT, "task did not stop, aborting");
            handle.abort();
            Err(DaqError::TaskFailed(
                name,
                format!("did not stop within {SHUTDOWN_TIMEOUT:?}"),
            ))
        }
    }
}
