//! Integration tests for the dispatch module

use super::*;
use crate::metrics::Exporter;
use crate::trace::{generate_cold_start, generate_warm_start, ArrivalStream};
use crate::traits::{InvocationOutcome, InvokeError, Invoker, SimulatedInvoker};

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::Instant;

// ============================================================================
// Recording Invoker
// ============================================================================

/// Records when each invocation started, relative to `origin`
struct RecordingInvoker {
    origin: Instant,
    runtime: Duration,
    started: Mutex<Vec<Duration>>,
}

impl RecordingInvoker {
    fn new(origin: Instant, runtime: Duration) -> Self {
        Self {
            origin,
            runtime,
            started: Mutex::new(Vec::new()),
        }
    }

    fn start_offsets(&self) -> Vec<Duration> {
        let mut offsets = self.started.lock().clone();
        offsets.sort();
        offsets
    }
}

#[async_trait]
impl Invoker for RecordingInvoker {
    fn name(&self) -> &str {
        "recording"
    }

    async fn invoke(&self, _stream_id: usize) -> Result<InvocationOutcome, InvokeError> {
        self.started.lock().push(self.origin.elapsed());
        tokio::time::sleep(self.runtime).await;
        Ok(InvocationOutcome {
            runtime: self.runtime,
        })
    }
}

// ============================================================================
// Panicking Invoker
// ============================================================================

/// Panics on every second call
struct PanickingInvoker {
    calls: Mutex<usize>,
}

#[async_trait]
impl Invoker for PanickingInvoker {
    fn name(&self) -> &str {
        "panicking"
    }

    async fn invoke(&self, _stream_id: usize) -> Result<InvocationOutcome, InvokeError> {
        let call = {
            let mut calls = self.calls.lock();
            *calls += 1;
            *calls
        };
        if call % 2 == 0 {
            panic!("invoker panicked on call {call}");
        }
        Ok(InvocationOutcome {
            runtime: Duration::ZERO,
        })
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn build_worker(
    stream: ArrivalStream,
    invoker: Arc<dyn Invoker>,
    exporter: Arc<Exporter>,
    timeout: Duration,
) -> StreamWorker {
    StreamWorkerBuilder::new(0)
        .stream(stream)
        .invoker(invoker)
        .exporter(exporter)
        .invocation_timeout(timeout)
        .build()
        .unwrap()
}

fn assert_offsets_near(actual: &[Duration], expected_secs: &[f64]) {
    assert_eq!(actual.len(), expected_secs.len());
    for (offset, expected) in actual.iter().zip(expected_secs) {
        let expected = Duration::from_secs_f64(*expected);
        assert!(
            *offset >= expected && *offset <= expected + Duration::from_millis(2),
            "invocation at {:?}, expected {:?}",
            offset,
            expected
        );
    }
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_worker_issues_every_arrival() {
    let stream = generate_warm_start(1, 1.0).unwrap();
    let exporter = Arc::new(Exporter::new());
    let invoker = Arc::new(SimulatedInvoker::new(Duration::from_millis(250)));
    let worker = build_worker(
        stream,
        invoker.clone(),
        exporter.clone(),
        Duration::from_secs(1),
    );

    let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let stats = worker.run(Instant::now(), shutdown_rx).await;

    assert_eq!(stats.issued, 60);
    assert_eq!(stats.completed, 60);
    assert_eq!(stats.per_minute_issued, vec![60]);
    assert_eq!(invoker.calls(), 60);
    assert_eq!(exporter.latency_record_len(), 60);

    for record in exporter.snapshot() {
        assert!(record.is_good());
        assert_eq!(record.runtime, 250_000.0);
        assert!(record.latency >= 250_000.0);
    }
}

#[tokio::test(start_paused = true)]
async fn test_worker_paces_arrivals() {
    let origin = Instant::now();
    let stream = generate_warm_start(1, 0.5).unwrap();
    let invoker = Arc::new(RecordingInvoker::new(origin, Duration::ZERO));
    let worker = build_worker(
        stream,
        invoker.clone(),
        Arc::new(Exporter::new()),
        Duration::from_secs(1),
    );

    let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
    worker.run(origin, shutdown_rx).await;

    let expected: Vec<f64> = (0..30).map(|i| i as f64 * 2.0).collect();
    assert_offsets_near(&invoker.start_offsets(), &expected);
}

#[tokio::test(start_paused = true)]
async fn test_slow_invocations_do_not_delay_pacing() {
    let origin = Instant::now();
    let stream = generate_warm_start(1, 1.0).unwrap();
    let invoker = Arc::new(RecordingInvoker::new(origin, Duration::from_secs(10)));
    let worker = build_worker(
        stream,
        invoker.clone(),
        Arc::new(Exporter::new()),
        Duration::from_secs(60),
    );

    let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let stats = worker.run(origin, shutdown_rx).await;

    let expected: Vec<f64> = (0..60).map(f64::from).collect();
    assert_offsets_near(&invoker.start_offsets(), &expected);
    assert_eq!(stats.completed, 60);

    // last arrival at 59s plus its 10s runtime
    assert!(origin.elapsed() >= Duration::from_secs(69));
}

#[tokio::test(start_paused = true)]
async fn test_worker_reports_timeouts() {
    let stream = generate_warm_start(1, 0.1).unwrap();
    let exporter = Arc::new(Exporter::new());
    let worker = build_worker(
        stream,
        Arc::new(SimulatedInvoker::new(Duration::from_secs(5))),
        exporter.clone(),
        Duration::from_secs(1),
    );

    let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let stats = worker.run(Instant::now(), shutdown_rx).await;

    assert_eq!(stats.issued, 6);
    assert_eq!(stats.timed_out, 6);
    assert_eq!(stats.completed, 0);

    for record in exporter.snapshot() {
        assert!(record.timeout);
        assert!(!record.failed);
        assert_eq!(record.runtime, 0.0);
        assert!(record.latency >= 1_000_000.0);
    }
    assert!(!exporter.check_overload(0.1));
}

#[tokio::test(start_paused = true)]
async fn test_worker_reports_failures() {
    let stream = generate_warm_start(1, 1.0).unwrap();
    let exporter = Arc::new(Exporter::new());
    let worker = build_worker(
        stream,
        Arc::new(SimulatedInvoker::new(Duration::from_millis(10)).fail_every(4)),
        exporter.clone(),
        Duration::from_secs(1),
    );

    let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let stats = worker.run(Instant::now(), shutdown_rx).await;

    assert_eq!(stats.completed, 45);
    assert_eq!(stats.failed, 15);
    assert_eq!(exporter.good_fraction(), Some(0.75));
    assert!(exporter.check_overload(0.75));
    assert!(!exporter.check_overload(0.8));
}

#[tokio::test(start_paused = true)]
async fn test_panicked_invocations_are_reported_as_failed() {
    let stream = generate_warm_start(1, 0.1).unwrap();
    let exporter = Arc::new(Exporter::new());
    let worker = build_worker(
        stream,
        Arc::new(PanickingInvoker {
            calls: Mutex::new(0),
        }),
        exporter.clone(),
        Duration::from_secs(1),
    );

    let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let stats = worker.run(Instant::now(), shutdown_rx).await;

    assert_eq!(stats.issued, 6);
    assert_eq!(stats.completed, 3);
    assert_eq!(stats.failed, 3);
    assert_eq!(exporter.latency_record_len(), stats.issued);
    assert_eq!(exporter.good_fraction(), Some(0.5));

    let failed: Vec<_> = exporter.snapshot().into_iter().filter(|r| r.failed).collect();
    assert_eq!(failed.len(), 3);
    for record in failed {
        assert!(!record.timeout);
        assert!(record.timestamp > 0);
    }
}

#[tokio::test(start_paused = true)]
async fn test_worker_shutdown_stops_pacing() {
    let stream = generate_warm_start(1, 1.0).unwrap();
    let exporter = Arc::new(Exporter::new());
    let worker = build_worker(
        stream,
        Arc::new(SimulatedInvoker::new(Duration::ZERO)),
        exporter.clone(),
        Duration::from_secs(1),
    );

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10_500)).await;
        let _ = shutdown_tx.send(());
    });

    let stats = worker.run(Instant::now(), shutdown_rx).await;

    assert_eq!(stats.issued, 11);
    assert_eq!(stats.completed, 11);
    assert_eq!(exporter.latency_record_len(), 11);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_waits_for_in_flight_invocations() {
    let stream = generate_warm_start(1, 1.0).unwrap();
    let exporter = Arc::new(Exporter::new());
    let worker = build_worker(
        stream,
        Arc::new(SimulatedInvoker::new(Duration::from_secs(3))),
        exporter.clone(),
        Duration::from_secs(10),
    );

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(4_500)).await;
        let _ = shutdown_tx.send(());
    });

    let stats = worker.run(Instant::now(), shutdown_rx).await;

    assert_eq!(stats.issued, 5);
    assert_eq!(stats.finished(), 5);
    assert_eq!(exporter.latency_record_len(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_cold_start_stream_honours_offset() {
    let origin = Instant::now();
    let streams = generate_cold_start(1, 0.25, 10).unwrap();
    let third = streams[2].clone();
    let invoker = Arc::new(RecordingInvoker::new(origin, Duration::ZERO));
    let worker = build_worker(
        third,
        invoker.clone(),
        Arc::new(Exporter::new()),
        Duration::from_secs(1),
    );

    let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let stats = worker.run(origin, shutdown_rx).await;

    assert_eq!(stats.issued, 5);
    assert_offsets_near(&invoker.start_offsets(), &[8.0, 20.0, 32.0, 44.0, 56.0]);
}

#[tokio::test(start_paused = true)]
async fn test_empty_stream_finishes_immediately() {
    let exporter = Arc::new(Exporter::new());
    let worker = build_worker(
        ArrivalStream::empty(2),
        Arc::new(SimulatedInvoker::new(Duration::ZERO)),
        exporter.clone(),
        Duration::from_secs(1),
    );

    let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let stats = worker.run(Instant::now(), shutdown_rx).await;

    assert_eq!(stats.issued, 0);
    assert_eq!(stats.per_minute_issued, vec![0, 0]);
    assert_eq!(exporter.latency_record_len(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_per_minute_issued_matches_trace() {
    let stream = generate_warm_start(3, 0.5).unwrap();
    let expected = stream.per_minute.clone();
    let worker = build_worker(
        stream,
        Arc::new(SimulatedInvoker::new(Duration::ZERO)),
        Arc::new(Exporter::new()),
        Duration::from_secs(1),
    );

    let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let stats = worker.run(Instant::now(), shutdown_rx).await;

    assert_eq!(stats.per_minute_issued, expected);
    assert_eq!(stats.per_minute_issued, vec![30, 30, 30]);
}
