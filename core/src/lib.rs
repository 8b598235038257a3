//! faas-loader-core: Load generation for serverless function platforms
//!
//! This crate provides the building blocks of a FaaS load generator:
//!
//! - Inter-arrival time trace synthesis (warm-start and cold-start)
//! - A concurrent metrics exporter for invocation outcomes
//! - Experiment configuration and error types
//! - The `Invoker` seam and a reference dispatch driver

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod dispatch;
pub mod error;
pub mod metrics;
pub mod orchestrator;
pub mod trace;
pub mod traits;

pub use config::{ConfigError, ExperimentConfig, TraceMode};
pub use dispatch::{DispatchStats, StreamWorker, StreamWorkerBuilder};
pub use error::{Error, Result};
pub use metrics::{ExecutionRecord, ExecutionSummary, Exporter, MinuteInvocationRecord};
pub use orchestrator::{AggregatedStats, Orchestrator};
pub use trace::{generate_cold_start, generate_warm_start, ArrivalStream, TraceError, TraceSet};
pub use traits::{InvocationOutcome, InvokeError, Invoker, SimulatedInvoker};
