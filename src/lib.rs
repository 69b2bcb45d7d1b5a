//! # DAQ Sampler Core Library
//!
//! A fixed-rate, multi-channel sampling pipeline. A fast periodic trigger wakes an
//! acquisition task that reads one complete row from every configured channel and pushes it
//! into a bounded ring buffer. A slower trigger posts drain events; the drain task pops a
//! fixed batch per event and forwards it to a line-oriented sink, marking every slot that
//! found the buffer empty.
//!
//! ## Crate Structure
//!
//! - **`config`**: Figment-layered configuration (defaults, TOML file, environment) and its
//!   validation rules.
//! - **`data`**: the `Row` type, the overwrite-oldest `RingBuffer`, the timeout-guarded
//!   `SharedRing`, and the text line format.
//! - **`diagnostics`**: lock-free counters for ticks, drops, overwrites and contention.
//! - **`error`**: the `DaqError` enum and `AppResult` alias.
//! - **`hardware`**: the `SampleSource` and `Sink` capability traits, the stdout line sink and
//!   mock collaborators.
//! - **`logging`**: tracing subscriber setup (stderr only).
//! - **`pipeline`**: wiring, start-up in degraded mode, staged shutdown.
//! - **`scheduling`**: periodic triggers, the coalescing wake signal and the tagged event queue.
//! - **`tasks`**: the acquisition and drain task loops.

pub mod config;
pub mod data;
pub mod diagnostics;
pub mod error;
pub mod hardware;
pub mod logging;
pub mod pipeline;
pub mod scheduling;
pub mod tasks;

pub use config::SamplerConfig;
pub use error::{AppResult, DaqError};
pub use pipeline::{Pipeline, PipelineHandle};
