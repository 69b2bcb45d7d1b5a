//! Custom error types for the sampler.
//!
//! This module defines the primary error type, `DaqError`. Using the `thiserror` crate it
//! gives one consistent place for everything that can go wrong while the pipeline is
//! configured, started and stopped.
//!
//! ## Error Hierarchy
//!
//! - **`Config`**: wraps errors from `figment`, typically TOML syntax or type mismatches.
//! - **`Configuration`**: semantic errors in a configuration that parsed fine (zero capacity,
//!   duplicate channels, a drain period faster than the sample period, ...).
//! - **`AccessTimeout`**: exclusive access to the ring buffer was not obtained in time. The
//!   tasks recover from this locally by dropping the current push or batch; it is never
//!   escalated past the task that hit it.
//! - **`SourceInit`** / **`SinkInit`**: an external collaborator failed to come up. The
//!   pipeline reports these once and keeps running in degraded mode.
//! - **`TaskFailed`** / **`ShutdownFailed`**: a spawned task panicked or was aborted.
//!
//! Buffer saturation and starvation are deliberately absent: overwrite-oldest and the
//! empty marker are normal outcomes, not errors.

use std::time::Duration;
use thiserror::Error;

/// Convenience alias for results using the crate error type.
pub type AppResult<T> = std::result::Result<T, DaqError>;

/// Errors raised by the sampler.
#[derive(Error, Debug)]
pub enum DaqError {
    /// The configuration sources could not be read or deserialized.
    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    /// The configuration parsed but is not usable.
    #[error("Configuration validation error: {0}")]
    Configuration(String),

    /// Plain I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Exclusive ring buffer access was not obtained within the bound.
    #[error("Ring buffer access not acquired within {0:?}")]
    AccessTimeout(Duration),

    /// The sample source failed its one-time initialization.
    #[error("Sample source initialization failed: {0}")]
    SourceInit(String),

    /// The sink failed its one-time initialization.
    #[error("Sink initialization failed: {0}")]
    SinkInit(String),

    /// A spawned task did not finish cleanly.
    #[error("Task '{0}' terminated abnormally: {1}")]
    TaskFailed(&'static str, String),

    /// The tracing subscriber could not be installed.
    #[error("Logging initialization failed: {0}")]
    Logging(String),

    /// One or more tasks failed while the pipeline was stopping.
    #[error("Shutdown failed with errors")]
    ShutdownFailed(Vec<DaqError>),
}

impl From<figment::Error> for DaqError {
    fn from(err: figment::Error) -> Self {
        DaqError::Config(Box::new(err))
    }
}

impl DaqError {
    /// Whether the pipeline can keep running after this error.
    ///
    /// Contention and collaborator init failures are recovered locally; everything else
    /// stops startup or shutdown.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DaqError::AccessTimeout(_) | DaqError::SourceInit(_) | DaqError::SinkInit(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_timeout_is_recoverable() {
        let err = DaqError::AccessTimeout(Duration::from_millis(2));
        assert!(err.is_recoverable());
        assert_eq!(
            err.to_string(),
            "Ring buffer access not acquired within 2ms"
        );
    }

    #[test]
    fn configuration_errors_are_fatal() {
        let err = DaqError::Configuration("buffer.capacity must be at least 1".into());
        assert!(!err.is_recoverable());
        assert!(err.to_string().contains("buffer.capacity"));
    }

    #[test]
    fn shutdown_failure_keeps_inner_errors() {
        let err = DaqError::ShutdownFailed(vec![
            DaqError::TaskFailed("drain", "panicked".into()),
            DaqError::TaskFailed("acquisition", "cancelled".into()),
        ]);
        match err {
            DaqError::ShutdownFailed(inner) => assert_eq!(inner.len(), 2),
            other => panic!("unexpected variant: {:?}", other),
        }
    }
}
