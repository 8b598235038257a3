//! Stream worker pacing loop

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::metrics::{ExecutionRecord, Exporter};
use crate::trace::{minute_index, ArrivalStream};
use crate::traits::{InvokeError, Invoker};

use super::stats::DispatchStats;

/// Worker that replays one arrival stream against an invoker
///
/// Workers are independent tokio tasks managed by the Orchestrator. They
/// share the invoker and the exporter via Arc.
pub struct StreamWorker {
    /// Stream index, passed to the invoker
    id: usize,

    /// Arrival schedule to replay
    stream: ArrivalStream,

    /// Invoker (shared across workers via Arc)
    invoker: Arc<dyn Invoker>,

    /// Outcome sink (shared across workers via Arc)
    exporter: Arc<Exporter>,

    /// Deadline for a single invocation
    invocation_timeout: Duration,
}

impl StreamWorker {
    /// Create a new worker
    pub fn new(
        id: usize,
        stream: ArrivalStream,
        invoker: Arc<dyn Invoker>,
        exporter: Arc<Exporter>,
        invocation_timeout: Duration,
    ) -> Self {
        Self {
            id,
            stream,
            invoker,
            exporter,
            invocation_timeout,
        }
    }

    /// Replay the stream with arrival times relative to `experiment_start`
    ///
    /// Returns once every issued invocation has finished, either because the
    /// stream is exhausted or because a shutdown signal arrived.
    pub async fn run(
        self,
        experiment_start: Instant,
        mut shutdown: broadcast::Receiver<()>,
    ) -> DispatchStats {
        let duration_minutes = self.stream.per_minute.len() as u32;
        let mut stats = DispatchStats::new(self.stream.per_minute.len());
        let mut timestamps = Vec::with_capacity(self.stream.len());
        let mut in_flight: Vec<JoinHandle<ExecutionRecord>> = Vec::with_capacity(self.stream.len());
        stats.start();

        tracing::debug!(
            stream_id = self.id,
            arrivals = self.stream.len(),
            start_offset_us = ?self.stream.start_offset_us(),
            "Stream worker started"
        );

        for arrival_us in self.stream.arrival_times_us() {
            let deadline = experiment_start + micros_to_duration(arrival_us);

            tokio::select! {
                biased;

                _ = shutdown.recv() => {
                    tracing::debug!(stream_id = self.id, "Stream worker received shutdown signal");
                    break;
                }

                _ = tokio::time::sleep_until(deadline) => {
                    let timestamp = chrono::Utc::now().timestamp_micros();
                    stats.record_issued(minute_index(arrival_us, duration_minutes));
                    timestamps.push(timestamp);
                    in_flight.push(self.spawn_invocation(timestamp));
                }
            }
        }

        let results = futures::future::join_all(in_flight).await;
        for (timestamp, result) in timestamps.into_iter().zip(results) {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    tracing::error!(stream_id = self.id, error = %e, "Invocation task panicked");
                    // the task never reached the exporter
                    let record = ExecutionRecord {
                        timestamp,
                        failed: true,
                        ..Default::default()
                    };
                    self.exporter.report_execution(record);
                    record
                }
            };
            stats.record_outcome(&record);
        }

        stats.stop();
        tracing::debug!(
            stream_id = self.id,
            issued = stats.issued,
            completed = stats.completed,
            failed = stats.failed,
            timed_out = stats.timed_out,
            elapsed_ms = ?stats.elapsed().map(|d| d.as_millis()),
            "Stream worker finished"
        );

        stats
    }

    /// Issue one invocation in its own task and report its outcome
    fn spawn_invocation(&self, timestamp: i64) -> JoinHandle<ExecutionRecord> {
        let id = self.id;
        let invoker = Arc::clone(&self.invoker);
        let exporter = Arc::clone(&self.exporter);
        let timeout = self.invocation_timeout;

        tokio::spawn(async move {
            let start = Instant::now();
            let result = tokio::time::timeout(timeout, invoker.invoke(id)).await;
            let latency = start.elapsed().as_secs_f64() * 1e6;

            let mut record = ExecutionRecord {
                timestamp,
                latency,
                ..Default::default()
            };
            match result {
                Ok(Ok(outcome)) => record.runtime = outcome.runtime.as_secs_f64() * 1e6,
                Ok(Err(InvokeError::Timeout(_))) | Err(_) => {
                    record.timeout = true;
                    tracing::warn!(stream_id = id, latency_us = latency, "Invocation timed out");
                }
                Ok(Err(e)) => {
                    record.failed = true;
                    tracing::warn!(stream_id = id, error = %e, "Invocation failed");
                }
            }

            exporter.report_execution(record);
            record
        })
    }

    /// Get the stream ID
    pub fn id(&self) -> usize {
        self.id
    }
}

/// Convert a trace timestamp (µs) to a duration, rounded to the nanosecond
fn micros_to_duration(micros: f64) -> Duration {
    Duration::from_nanos((micros * 1_000.0).round().max(0.0) as u64)
}

impl std::fmt::Debug for StreamWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamWorker")
            .field("id", &self.id)
            .field("arrivals", &self.stream.len())
            .field("invoker", &self.invoker.name())
            .field("invocation_timeout", &self.invocation_timeout)
            .finish()
    }
}
