//! Mock Hardware Implementations
//!
//! Simulated sample sources and an in-memory sink for running the pipeline without an
//! ADC or a serial console.
//!
//! # Available Mocks
//!
//! - `RandomSource` - uniform integers, 0..=1000 by default
//! - `SineSource` - per-channel sine at `5 + channel` Hz on a 12-bit scale, plus noise
//! - `SequenceSource` - deterministic values that encode row sequence and position
//! - `MemorySink` - records every emission for later inspection

use anyhow::{anyhow, Result};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::TAU;
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Instant;

use crate::data::{ChannelId, Sample};
use crate::hardware::capabilities::{SampleSource, Sink};

/// Full-scale reading of a 12-bit ADC.
pub const ADC_MAX: Sample = 4095;

// =============================================================================
// RandomSource - Uniform Noise
// =============================================================================

/// Uniformly distributed samples, independent of the channel.
pub struct RandomSource {
    rng: StdRng,
    range: RangeInclusive<Sample>,
}

impl RandomSource {
    /// Samples in `0..=1000`, seeded from entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            range: 0..=1000,
        }
    }

    /// Reproducible stream from `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            range: 0..=1000,
        }
    }

    /// Change the output range.
    pub fn with_range(mut self, range: RangeInclusive<Sample>) -> Self {
        self.range = range;
        self
    }
}

impl Default for RandomSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleSource for RandomSource {
    fn init(&mut self) -> Result<()> {
        if self.range.is_empty() {
            return Err(anyhow!("empty sample range {:?}", self.range));
        }
        Ok(())
    }

    fn read(&mut self, _channel: ChannelId) -> Sample {
        if self.range.is_empty() {
            return *self.range.start();
        }
        self.rng.gen_range(self.range.clone())
    }
}

// =============================================================================
// SineSource - Simulated Analog Inputs
// =============================================================================

/// Each channel is a sine at `5 + channel` Hz centred on mid-scale, with uniform noise.
///
/// Time is wall-clock time since construction, so the waveform reflects the actual
/// sampling instants, jitter included.
pub struct SineSource {
    started: Instant,
    rng: StdRng,
    amplitude: f64,
    noise: f64,
}

impl SineSource {
    /// Amplitude 1800 counts around 2048, noise of +/- 40 counts.
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            rng: StdRng::from_entropy(),
            amplitude: 1800.0,
            noise: 40.0,
        }
    }

    /// Reproducible noise from `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            ..Self::new()
        }
    }

    /// Frequency used for `channel`.
    pub fn frequency_hz(channel: ChannelId) -> f64 {
        5.0 + f64::from(channel.0)
    }

    fn value_at(&mut self, channel: ChannelId, t: f64) -> Sample {
        let mid = f64::from(ADC_MAX + 1) / 2.0;
        let phase = TAU * Self::frequency_hz(channel) * t;
        let noise = if self.noise > 0.0 {
            self.rng.gen_range(-self.noise..=self.noise)
        } else {
            0.0
        };
        let value = (mid + self.amplitude * phase.sin() + noise).round();
        value.clamp(0.0, f64::from(ADC_MAX)) as Sample
    }
}

impl Default for SineSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleSource for SineSource {
    fn read(&mut self, channel: ChannelId) -> Sample {
        let t = self.started.elapsed().as_secs_f64();
        self.value_at(channel, t)
    }
}

// =============================================================================
// SequenceSource - Deterministic Values
// =============================================================================

/// Emits `row_seq * 1000 + position` where `position` counts reads within a row.
///
/// Reads are assumed to arrive `width` at a time, which is how the acquisition task
/// calls a source. A row whose samples disagree on `row_seq` was torn; a row whose
/// `row_seq` goes backwards was reordered.
pub struct SequenceSource {
    width: u64,
    reads: u64,
}

impl SequenceSource {
    /// Source for rows of `width` channels.
    pub fn new(width: usize) -> Self {
        Self {
            width: width.max(1) as u64,
            reads: 0,
        }
    }

    /// Sequence number encoded in a sample.
    pub fn row_seq(sample: Sample) -> Sample {
        sample / 1000
    }
}

impl SampleSource for SequenceSource {
    fn read(&mut self, _channel: ChannelId) -> Sample {
        let seq = self.reads / self.width;
        let position = self.reads % self.width;
        self.reads += 1;
        (seq * 1000 + position) as Sample
    }
}

// =============================================================================
// MemorySink - Recording Sink
// =============================================================================

/// One thing written to a [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emission {
    /// A drained row.
    Row(Vec<Sample>),
    /// An empty drain slot.
    Empty,
    /// A start-up fault.
    Fault(String),
}

/// Sink that records emissions in memory. Clones share the same log.
#[derive(Clone, Default)]
pub struct MemorySink {
    log: Arc<Mutex<Vec<Emission>>>,
    flushes: Arc<Mutex<u64>>,
    init_error: Option<String>,
}

impl MemorySink {
    /// Empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorder whose `init` fails with `message`.
    pub fn failing_init(message: impl Into<String>) -> Self {
        Self {
            init_error: Some(message.into()),
            ..Self::default()
        }
    }

    /// Copy of everything emitted so far.
    pub fn emissions(&self) -> Vec<Emission> {
        self.log.lock().clone()
    }

    /// Only the rows, in emission order.
    pub fn rows(&self) -> Vec<Vec<Sample>> {
        self.log
            .lock()
            .iter()
            .filter_map(|emission| match emission {
                Emission::Row(row) => Some(row.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of flushes (one per drain batch).
    pub fn flush_count(&self) -> u64 {
        *self.flushes.lock()
    }
}

impl Sink for MemorySink {
    fn init(&mut self) -> Result<()> {
        match &self.init_error {
            Some(message) => Err(anyhow!("{message}")),
            None => Ok(()),
        }
    }

    fn emit(&mut self, row: &[Sample]) -> Result<()> {
        self.log.lock().push(Emission::Row(row.to_vec()));
        Ok(())
    }

    fn emit_empty_marker(&mut self) -> Result<()> {
        self.log.lock().push(Emission::Empty);
        Ok(())
    }

    fn report_fault(&mut self, message: &str) -> Result<()> {
        self.log.lock().push(Emission::Fault(message.to_string()));
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        *self.flushes.lock() += 1;
        Ok(())
    }
}
