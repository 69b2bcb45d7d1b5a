//! CLI entry point for daq-sampler
//!
//! Provides a command-line interface for:
//! - Running the sampling pipeline with a mock sample source, rows printed to stdout
//! - Checking a configuration file and printing the effective settings
//!
//! Logs go to stderr so stdout carries only data lines.
//!
//! # Usage
//!
//! ```bash
//! daq-sampler run --config config/sampler.toml --source sine --duration 10s
//! daq-sampler check-config --config config/sampler.toml
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use daq_sampler::config::{SamplerConfig, DEFAULT_CONFIG_PATH};
use daq_sampler::hardware::mock::{RandomSource, SequenceSource, SineSource};
use daq_sampler::hardware::{LineSink, SampleSource};
use daq_sampler::{logging, Pipeline};
use humantime_serde::re::humantime;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "daq-sampler")]
#[command(about = "Fixed-rate multi-channel sampler", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline until Ctrl+C or the optional duration elapses
    Run {
        /// Configuration file
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,

        /// Mock sample source
        #[arg(long, value_enum, default_value_t = SourceKind::Random)]
        source: SourceKind,

        /// Seed for the random and sine sources
        #[arg(long)]
        seed: Option<u64>,

        /// Stop after this long (e.g. "10s", "1m 30s")
        #[arg(long, value_parser = humantime::parse_duration)]
        duration: Option<Duration>,
    },

    /// Validate a configuration file and print the effective settings
    CheckConfig {
        /// Configuration file
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SourceKind {
    /// Uniform noise in 0..=1000
    Random,
    /// Per-channel sine wave in the 12-bit ADC range
    Sine,
    /// Deterministic row counter
    Sequence,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            source,
            seed,
            duration,
        } => run(config, source, seed, duration).await,
        Commands::CheckConfig { config } => check_config(config),
    }
}

fn load(path: &Path) -> Result<SamplerConfig> {
    let config = SamplerConfig::load_from(path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

fn check_config(path: PathBuf) -> Result<()> {
    let config = load(&path)?;
    for note in config.advisories() {
        eprintln!("note: {note}");
    }
    print!("{}", config.to_toml_string()?);
    Ok(())
}

async fn run(
    path: PathBuf,
    kind: SourceKind,
    seed: Option<u64>,
    duration: Option<Duration>,
) -> Result<()> {
    let config = load(&path)?;
    logging::init_from_config(&config)?;
    info!(config = %path.display(), source = ?kind, "daq-sampler starting");

    let width = config.acquisition.channels.len();
    let source: Box<dyn SampleSource> = match (kind, seed) {
        (SourceKind::Random, Some(seed)) => Box::new(RandomSource::seeded(seed)),
        (SourceKind::Random, None) => Box::new(RandomSource::new()),
        (SourceKind::Sine, Some(seed)) => Box::new(SineSource::seeded(seed)),
        (SourceKind::Sine, None) => Box::new(SineSource::new()),
        (SourceKind::Sequence, _) => Box::new(SequenceSource::new(width)),
    };

    match width {
        1 => run_width::<1>(config, source, duration).await,
        2 => run_width::<2>(config, source, duration).await,
        4 => run_width::<4>(config, source, duration).await,
        8 => run_width::<8>(config, source, duration).await,
        16 => run_width::<16>(config, source, duration).await,
        17 => run_width::<17>(config, source, duration).await,
        n => bail!("unsupported channel count {n}; rows may be 1, 2, 4, 8, 16 or 17 wide"),
    }
}

async fn run_width<const N: usize>(
    config: SamplerConfig,
    source: Box<dyn SampleSource>,
    duration: Option<Duration>,
) -> Result<()> {
    let handle = Pipeline::<_, _, N>::new(config, source, LineSink::stdout())?.spawn()?;

    wait_for_stop(duration).await?;
    info!("stopping");

    let snapshot = handle.shutdown().await?;
    info!(?snapshot, "final counters");
    Ok(())
}

async fn wait_for_stop(duration: Option<Duration>) -> Result<()> {
    match duration {
        Some(limit) => tokio::select! {
            signal = tokio::signal::ctrl_c() => signal?,
            _ = tokio::time::sleep(limit) => {}
        },
        None => tokio::signal::ctrl_c().await?,
    }
    Ok(())
}
