//! Sample rows, the ring buffer they live in, and their text rendering.

pub mod line_format;
pub mod ring_buffer;
pub mod row;
pub mod shared;

pub use ring_buffer::RingBuffer;
pub use row::{ChannelId, Row, Sample};
pub use shared::SharedRing;
