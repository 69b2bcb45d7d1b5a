//! The two task loops on either side of the ring buffer.

pub mod acquisition;
pub mod drain;

pub use acquisition::{AcquireOutcome, AcquisitionTask};
pub use drain::{DrainOutcome, DrainTask};
