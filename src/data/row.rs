//! Sample rows.
//!
//! A [`Row`] is one acquisition instant: one sample per configured channel, in the order
//! of the channel map. The width is the const parameter `N`, so every row that can ever
//! reach the ring buffer has exactly the configured channel count.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// One raw channel reading (ADC counts).
pub type Sample = i32;

/// Physical channel index as understood by the sample source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub u8);

impl ChannelId {
    /// Index as `usize`, for table lookups in sources.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ch{}", self.0)
    }
}

/// Fixed-width row of samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Row<const N: usize>([Sample; N]);

impl<const N: usize> Row<N> {
    /// Number of channels in every row of this type.
    pub const WIDTH: usize = N;

    /// Wrap a complete set of samples.
    pub const fn new(samples: [Sample; N]) -> Self {
        Self(samples)
    }

    /// Samples in channel-map order.
    pub fn samples(&self) -> &[Sample; N] {
        &self.0
    }

    /// Consume the row, returning the samples.
    pub fn into_inner(self) -> [Sample; N] {
        self.0
    }
}

impl<const N: usize> From<[Sample; N]> for Row<N> {
    fn from(samples: [Sample; N]) -> Self {
        Self(samples)
    }
}

impl<const N: usize> Deref for Row<N> {
    type Target = [Sample];

    fn deref(&self) -> &[Sample] {
        &self.0
    }
}
