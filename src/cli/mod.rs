//! CLI argument parsing and command dispatch

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use faas_loader_core::{Exporter, ExperimentConfig, Orchestrator, SimulatedInvoker, TraceMode};

#[derive(Parser)]
#[command(name = "faas-loader")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate an arrival schedule and print it as JSON
    Generate {
        /// Path to configuration file (overrides the trace flags)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Trace mode
        #[arg(short, long, value_enum, default_value_t = Mode::Warm)]
        mode: Mode,

        /// Experiment duration in minutes
        #[arg(short, long, default_value_t = 1)]
        duration: u32,

        /// Target requests per second
        #[arg(short, long, default_value_t = 1.0)]
        rps: f64,

        /// Cold-start cooldown in seconds
        #[arg(long, default_value_t = 600)]
        cooldown: u32,

        /// Write the schedule to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        /// Path to configuration file
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Replay a configuration against a simulated function
    DryRun {
        /// Path to configuration file
        #[arg(short, long)]
        config: PathBuf,

        /// Simulated function runtime in milliseconds
        #[arg(long, default_value_t = 100)]
        runtime_ms: u64,
    },
}

/// Trace mode selectable on the command line
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// One constant-rate stream
    Warm,
    /// Staggered streams respecting the cooldown
    Cold,
}

impl Cli {
    /// Execute the selected command
    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Generate {
                config,
                mode,
                duration,
                rps,
                cooldown,
                output,
            } => {
                let config = match config {
                    Some(path) => load_config(&path)?,
                    None => {
                        let config = match mode {
                            Mode::Warm => ExperimentConfig::warm_start(duration, rps),
                            Mode::Cold => ExperimentConfig::cold_start(duration, rps, cooldown),
                        };
                        config.validate()?;
                        config
                    }
                };
                generate(&config, output.as_deref())
            }
            Commands::Validate { config } => {
                let config = load_config(&config)?;
                println!("{}", serde_json::to_string_pretty(&config)?);
                tracing::info!("Configuration is valid");
                Ok(())
            }
            Commands::DryRun { config, runtime_ms } => {
                let config = load_config(&config)?;
                dry_run(config, Duration::from_millis(runtime_ms))
            }
        }
    }
}

fn load_config(path: &Path) -> Result<ExperimentConfig> {
    let config = ExperimentConfig::from_json_file(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

fn generate(config: &ExperimentConfig, output: Option<&Path>) -> Result<()> {
    let trace = config.generate_trace()?;

    tracing::info!(
        mode = ?config.mode,
        streams = trace.len(),
        arrivals = trace.total_arrivals(),
        per_minute = ?trace.per_minute_totals(),
        "Generated trace"
    );

    let json = serde_json::to_string_pretty(&trace)?;
    match output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("Failed to write trace to {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}

fn dry_run(config: ExperimentConfig, runtime: Duration) -> Result<()> {
    if let TraceMode::ColdStart { cooldown_seconds } = config.mode {
        tracing::info!(cooldown_seconds, "Dry run with cold-start schedule");
    }

    let runtime_handle = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start tokio runtime")?;

    let orchestrator = Orchestrator::new(
        config,
        Arc::new(SimulatedInvoker::new(runtime)),
        Arc::new(Exporter::new()),
    );

    let stats = runtime_handle.block_on(orchestrator.run_with_signal_handling())?;
    let exporter = orchestrator.exporter();
    let threshold = orchestrator.config().overload_threshold;
    let summary = exporter.summary();

    println!("{}", serde_json::to_string_pretty(&summary)?);
    println!(
        "{}",
        serde_json::to_string_pretty(&exporter.invocation_records())?
    );

    if stats.total_issued == 0 {
        tracing::warn!("No invocations were issued");
    }
    match summary.good_fraction {
        Some(fraction) if !exporter.check_overload(threshold) => {
            bail!("good-outcome fraction {fraction:.3} is below threshold {threshold}")
        }
        _ => Ok(()),
    }
}
