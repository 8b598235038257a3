//! Orchestrator execution logic

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::time::Instant;

use crate::config::ExperimentConfig;
use crate::dispatch::{DispatchStats, StreamWorkerBuilder};
use crate::error::{Error, Result};
use crate::metrics::{Exporter, MinuteInvocationRecord};
use crate::traits::Invoker;

use super::aggregator::{aggregate_dispatch_stats, AggregatedStats};

/// Orchestrator manages the experiment lifecycle
///
/// Responsible for generating the trace, spawning stream workers,
/// coordinating shutdown and reporting results into the exporter.
pub struct Orchestrator {
    /// Experiment configuration
    config: ExperimentConfig,

    /// Invoker (shared across workers)
    invoker: Arc<dyn Invoker>,

    /// Outcome sink (shared across workers)
    exporter: Arc<Exporter>,

    /// Shutdown signal sender
    shutdown_tx: broadcast::Sender<()>,
}

impl Orchestrator {
    /// Create a new orchestrator
    pub fn new(
        config: ExperimentConfig,
        invoker: Arc<dyn Invoker>,
        exporter: Arc<Exporter>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            config,
            invoker,
            exporter,
            shutdown_tx,
        }
    }

    /// Trigger shutdown of all workers
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Get the experiment configuration
    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Get the exporter receiving this run's records
    pub fn exporter(&self) -> &Arc<Exporter> {
        &self.exporter
    }

    /// Run the experiment
    ///
    /// Validates the configuration, replays every generated stream and
    /// returns the aggregated dispatch statistics. One
    /// [`MinuteInvocationRecord`] per experiment minute is reported once all
    /// workers have finished.
    pub async fn run(&self) -> Result<AggregatedStats> {
        self.config.validate()?;
        let trace = self.config.generate_trace()?;
        let targets = trace.per_minute_totals();

        tracing::info!(
            duration_minutes = self.config.duration_minutes,
            rps_target = self.config.rps_target,
            mode = ?self.config.mode,
            streams = trace.len(),
            arrivals = trace.total_arrivals(),
            invoker = self.invoker.name(),
            "Starting experiment"
        );

        let experiment_start = Instant::now();
        let mut handles = Vec::with_capacity(trace.len());

        for (stream_id, stream) in trace.streams.into_iter().enumerate() {
            let worker = StreamWorkerBuilder::new(stream_id)
                .stream(stream)
                .invoker(Arc::clone(&self.invoker))
                .exporter(Arc::clone(&self.exporter))
                .invocation_timeout(self.config.invocation_timeout())
                .build()?;
            let shutdown_rx = self.shutdown_tx.subscribe();

            handles.push(tokio::spawn(worker.run(experiment_start, shutdown_rx)));
        }

        // Wait for all workers to complete
        let mut results: Vec<DispatchStats> = Vec::with_capacity(handles.len());
        let mut worker_failures = 0;
        for (stream_id, handle) in handles.into_iter().enumerate() {
            match handle.await {
                Ok(stats) => results.push(stats),
                Err(e) => {
                    worker_failures += 1;
                    tracing::error!(stream_id, error = %e, "Stream worker task panicked");
                }
            }
        }

        if results.is_empty() && worker_failures > 0 {
            return Err(Error::dispatch(format!(
                "All {} stream workers failed to complete",
                worker_failures
            )));
        }

        let aggregated = aggregate_dispatch_stats(&results);

        for (minute, target) in targets.into_iter().enumerate() {
            self.exporter.report_invocation(MinuteInvocationRecord {
                minute,
                target,
                issued: aggregated.per_minute_issued.get(minute).copied().unwrap_or(0),
            });
        }

        let healthy = self.exporter.check_overload(self.config.overload_threshold);
        tracing::info!(
            elapsed_secs = experiment_start.elapsed().as_secs_f64(),
            issued = aggregated.total_issued,
            completed = aggregated.total_completed,
            failed = aggregated.total_failed,
            timed_out = aggregated.total_timed_out,
            "Experiment completed"
        );
        if !healthy {
            tracing::warn!(
                threshold = self.config.overload_threshold,
                good_fraction = ?self.exporter.good_fraction(),
                "Good-outcome fraction below overload threshold"
            );
        }

        Ok(aggregated)
    }

    /// Run with Ctrl+C signal handling
    ///
    /// Automatically triggers graceful shutdown on Ctrl+C.
    pub async fn run_with_signal_handling(&self) -> Result<AggregatedStats> {
        let shutdown_tx = self.shutdown_tx.clone();

        let signal_handle = tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
                    let _ = shutdown_tx.send(());
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                }
            }
        });

        let result = self.run().await;

        signal_handle.abort();

        result
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .field("invoker", &self.invoker.name())
            .finish()
    }
}
