//! Sample sources and sinks.
//!
//! The capability traits the pipeline is generic over, plus the concrete implementations
//! used by the binary and the tests.

pub mod capabilities;
pub mod line_sink;
pub mod mock;

pub use capabilities::{SampleSource, Sink};
pub use line_sink::LineSink;
