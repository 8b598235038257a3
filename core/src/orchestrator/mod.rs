//! Orchestrator for experiment lifecycle management
//!
//! The Orchestrator runs one experiment end to end:
//! - Generating the trace set from the configuration
//! - Spawning one stream worker per arrival stream
//! - Managing graceful shutdown via broadcast channels
//! - Reporting per-minute invocation records and the health check
//!
//! # Example
//!
//! ```ignore
//! use faas_loader_core::{ExperimentConfig, Exporter, Orchestrator, SimulatedInvoker};
//!
//! let exporter = Arc::new(Exporter::new());
//! let orchestrator = Orchestrator::new(
//!     ExperimentConfig::cold_start(5, 2.0, 600),
//!     Arc::new(SimulatedInvoker::new(Duration::from_millis(100))),
//!     Arc::clone(&exporter),
//! );
//!
//! let stats = orchestrator.run_with_signal_handling().await?;
//! ```

mod aggregator;
mod executor;

pub use aggregator::{aggregate_dispatch_stats, AggregatedStats};
pub use executor::Orchestrator;
