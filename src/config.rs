//! Configuration using Figment
//!
//! Configuration is loaded once at start and fixed for the process lifetime. Layers, last
//! one wins:
//! 1. built-in defaults
//! 2. `config/sampler.toml` (or the file given on the command line)
//! 3. environment variables prefixed with `DAQ_SAMPLER_`, nested keys split on `__`
//!
//! # Example
//! ```no_run
//! use daq_sampler::config::SamplerConfig;
//!
//! let config = SamplerConfig::load()?;
//! config.validate()?;
//! println!("sampling {} channels", config.acquisition.channels.len());
//! # Ok::<(), daq_sampler::error::DaqError>(())
//! ```
//!
//! ```toml
//! [acquisition]
//! channels = [0, 1, 2, 3]
//! sample_period = "5ms"
//!
//! [drain]
//! period = "10ms"
//! batch = 2
//! ```

use crate::data::ChannelId;
use crate::error::{AppResult, DaqError};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

/// Default configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "config/sampler.toml";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "DAQ_SAMPLER_";

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Application settings
    pub application: ApplicationConfig,
    /// Fast trigger and acquisition task
    pub acquisition: AcquisitionConfig,
    /// Ring buffer
    pub buffer: BufferConfig,
    /// Slow trigger and drain task
    pub drain: DrainConfig,
    /// Optional periodic diagnostics report
    pub report: ReportConfig,
}

/// Application-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Application name
    pub name: String,
    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Log output format
    pub log_format: LogFormat,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line, coloured
    Pretty,
    /// Single line
    Compact,
    /// One JSON object per event
    Json,
}

/// Acquisition configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Physical channel for each row position, in row order
    pub channels: Vec<ChannelId>,
    /// Fast trigger period
    #[serde(with = "humantime_serde")]
    pub sample_period: Duration,
    /// Bound on waiting for the buffer lock before a row is dropped
    #[serde(with = "humantime_serde")]
    pub lock_timeout: Duration,
}

/// Ring buffer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// Rows held before the oldest is overwritten
    pub capacity: usize,
}

/// Drain configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrainConfig {
    /// Slow trigger period
    #[serde(with = "humantime_serde")]
    pub period: Duration,
    /// Rows popped per drain event
    pub batch: usize,
    /// Bound on waiting for the buffer lock before a batch is skipped
    #[serde(with = "humantime_serde")]
    pub lock_timeout: Duration,
    /// Undelivered events held before new ones are dropped
    pub event_queue_depth: usize,
    /// Empty the buffer into the sink on shutdown
    pub flush_on_shutdown: bool,
}

/// Report configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Report period; no report trigger when absent
    #[serde(with = "humantime_serde")]
    pub period: Option<Duration>,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            application: ApplicationConfig::default(),
            acquisition: AcquisitionConfig::default(),
            buffer: BufferConfig::default(),
            drain: DrainConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: "daq-sampler".to_string(),
            log_level: "info".to_string(),
            log_format: LogFormat::Compact,
        }
    }
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            channels: (0..8).map(ChannelId).collect(),
            sample_period: Duration::from_millis(5),
            lock_timeout: Duration::from_millis(2),
        }
    }
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self { capacity: 500 }
    }
}

impl Default for DrainConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_millis(10),
            batch: 2,
            lock_timeout: Duration::from_millis(5),
            event_queue_depth: 10,
            flush_on_shutdown: true,
        }
    }
}

impl SamplerConfig {
    /// Load from `config/sampler.toml` and the environment.
    ///
    /// A missing file is not an error; defaults and environment still apply.
    pub fn load() -> AppResult<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load from a specific file path plus the environment.
    pub fn load_from<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        Self::figment(path.as_ref()).extract().map_err(DaqError::from)
    }

    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(SamplerConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> AppResult<()> {
        let invalid = |msg: String| Err(DaqError::Configuration(msg));

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.application.log_level.to_lowercase().as_str()) {
            return invalid(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.application.log_level,
                valid_levels.join(", ")
            ));
        }

        let channels = &self.acquisition.channels;
        if channels.is_empty() {
            return invalid("acquisition.channels must list at least one channel".into());
        }
        let mut seen = HashSet::new();
        for channel in channels {
            if !seen.insert(channel) {
                return invalid(format!("Duplicate channel in acquisition.channels: {channel}"));
            }
        }

        if self.buffer.capacity == 0 {
            return invalid("buffer.capacity must be at least 1".into());
        }
        if self.drain.batch == 0 {
            return invalid("drain.batch must be at least 1".into());
        }
        if self.drain.event_queue_depth == 0 {
            return invalid("drain.event_queue_depth must be at least 1".into());
        }

        let sample = self.acquisition.sample_period;
        let drain = self.drain.period;
        for (name, value) in [
            ("acquisition.sample_period", sample),
            ("acquisition.lock_timeout", self.acquisition.lock_timeout),
            ("drain.period", drain),
            ("drain.lock_timeout", self.drain.lock_timeout),
        ] {
            if value.is_zero() {
                return invalid(format!("{name} must be greater than zero"));
            }
        }
        if let Some(period) = self.report.period {
            if period.is_zero() {
                return invalid("report.period must be greater than zero".into());
            }
        }

        if drain < sample {
            return invalid(format!(
                "drain.period ({drain:?}) must not be shorter than acquisition.sample_period ({sample:?})"
            ));
        }
        if self.acquisition.lock_timeout >= sample {
            return invalid(format!(
                "acquisition.lock_timeout ({:?}) must be shorter than acquisition.sample_period ({sample:?})",
                self.acquisition.lock_timeout
            ));
        }
        if self.drain.lock_timeout >= drain {
            return invalid(format!(
                "drain.lock_timeout ({:?}) must be shorter than drain.period ({drain:?})",
                self.drain.lock_timeout
            ));
        }

        Ok(())
    }

    /// Design ratio `k = drain.period / sample_period`, rounded down.
    pub fn trigger_ratio(&self) -> u32 {
        let sample = self.acquisition.sample_period.as_nanos();
        if sample == 0 {
            return 0;
        }
        u32::try_from(self.drain.period.as_nanos() / sample).unwrap_or(u32::MAX)
    }

    /// Non-fatal observations worth logging at start-up.
    pub fn advisories(&self) -> Vec<String> {
        let mut notes = Vec::new();
        let sample = self.acquisition.sample_period.as_nanos();
        let drain = self.drain.period.as_nanos();
        if sample > 0 && drain % sample != 0 {
            notes.push(format!(
                "drain.period {:?} is not a whole multiple of sample_period {:?}",
                self.drain.period, self.acquisition.sample_period
            ));
        }

        let k = self.trigger_ratio() as usize;
        if self.drain.batch < k {
            notes.push(format!(
                "drain.batch {} is smaller than the trigger ratio {k}; the buffer will fill and overwrite",
                self.drain.batch
            ));
        }
        if self.drain.lock_timeout <= self.acquisition.lock_timeout {
            notes.push(format!(
                "drain.lock_timeout {:?} is not longer than acquisition.lock_timeout {:?}",
                self.drain.lock_timeout, self.acquisition.lock_timeout
            ));
        }
        notes
    }

    /// Channel map as a fixed-width array.
    ///
    /// Fails when the configured channel count differs from `N`.
    pub fn channel_array<const N: usize>(&self) -> AppResult<[ChannelId; N]> {
        <[ChannelId; N]>::try_from(self.acquisition.channels.as_slice()).map_err(|_| {
            DaqError::Configuration(format!(
                "configured {} channels but rows are {N} wide",
                self.acquisition.channels.len()
            ))
        })
    }

    /// Effective configuration rendered as TOML.
    pub fn to_toml_string(&self) -> AppResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| DaqError::Configuration(format!("cannot render configuration: {e}")))
    }
}
