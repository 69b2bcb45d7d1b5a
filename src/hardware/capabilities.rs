//! Capabilities the pipeline needs from the outside world.
//!
//! The sampler core never touches ADC registers or output devices directly. It talks to
//! two small traits:
//!
//! - [`SampleSource`]: read one integer sample from a physical channel
//! - [`Sink`]: render one drained row, or an explicit empty-slot marker
//!
//! # Design Philosophy
//!
//! Each capability trait:
//! - Is synchronous and bounded-time; both are only ever called from task context
//! - Is `Send + 'static`, so the owning task can be spawned
//! - Uses `anyhow::Result` where the operation can fail
//! - Focuses on ONE thing
//!
//! Neither trait is interrupt-safe. Triggers never call into them.
//!
//! # Example
//!
//! ```rust
//! use daq_sampler::data::{ChannelId, Sample};
//! use daq_sampler::hardware::capabilities::SampleSource;
//!
//! struct Ramp(Sample);
//!
//! impl SampleSource for Ramp {
//!     fn read(&mut self, channel: ChannelId) -> Sample {
//!         self.0 += 1;
//!         self.0 * 100 + channel.0 as Sample
//!     }
//! }
//!
//! let mut ramp = Ramp(0);
//! assert_eq!(ramp.read(ChannelId(3)), 103);
//! ```

use crate::data::{ChannelId, Sample};
use anyhow::Result;

/// Capability: Channel Sampling
///
/// Devices that can produce one integer reading per channel (ADCs, counters).
///
/// # Contract
/// - `read` completes in bounded time and always yields a value
/// - `read` has no effect visible to the core beyond returning the sample
/// - `init` is called once before the first `read`; a failure is reported and sampling
///   continues in degraded mode
pub trait SampleSource: Send + 'static {
    /// One-time bring-up.
    ///
    /// # Default Implementation
    /// Nothing to initialize.
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    /// Read the current value of `channel`.
    fn read(&mut self, channel: ChannelId) -> Sample;
}

/// Capability: Row Output
///
/// Destinations for drained rows (serial console, stdout, a test recorder).
///
/// # Contract
/// - `emit` renders exactly one row, in the order it is called
/// - `emit_empty_marker` renders the explicit "no data" indication for one drain slot
/// - `flush` is called once after each drain batch
pub trait Sink: Send + 'static {
    /// One-time bring-up.
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    /// Render one drained row.
    fn emit(&mut self, row: &[Sample]) -> Result<()>;

    /// Render the empty-slot indication.
    fn emit_empty_marker(&mut self) -> Result<()>;

    /// Report a start-up fault on the output channel.
    ///
    /// # Default Implementation
    /// Faults are only logged by the caller.
    fn report_fault(&mut self, message: &str) -> Result<()> {
        let _ = message;
        Ok(())
    }

    /// Push buffered output to the destination.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<S: SampleSource + ?Sized> SampleSource for Box<S> {
    fn init(&mut self) -> Result<()> {
        (**self).init()
    }

    fn read(&mut self, channel: ChannelId) -> Sample {
        (**self).read(channel)
    }
}

impl<K: Sink + ?Sized> Sink for Box<K> {
    fn init(&mut self) -> Result<()> {
        (**self).init()
    }

    fn emit(&mut self, row: &[Sample]) -> Result<()> {
        (**self).emit(row)
    }

    fn emit_empty_marker(&mut self) -> Result<()> {
        (**self).emit_empty_marker()
    }

    fn report_fault(&mut self, message: &str) -> Result<()> {
        (**self).report_fault(message)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}
