//! Invoker seam between the dispatch driver and a function platform
//!
//! The trait lives in core so that platform clients can be implemented in
//! separate crates without depending on the driver.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

// ============================================================================
// Invoker Trait
// ============================================================================

/// Issues one invocation of the function under test
///
/// The driver calls `invoke` once per scheduled arrival and never retries.
/// Implementations must be safe to call concurrently from many tasks.
#[async_trait]
pub trait Invoker: Send + Sync {
    /// Invoker identifier used in logs
    fn name(&self) -> &str;

    /// Invoke the function on behalf of stream `stream_id`
    async fn invoke(&self, stream_id: usize) -> Result<InvocationOutcome, InvokeError>;
}

/// What the platform reported back for a completed invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvocationOutcome {
    /// Execution time measured inside the function
    pub runtime: Duration,
}

/// Invocation errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum InvokeError {
    /// The platform returned an error
    #[error("Invocation failed: {0}")]
    Failed(String),

    /// The platform gave up before the function finished
    #[error("Invocation timed out after {0:?}")]
    Timeout(Duration),
}

// ============================================================================
// Simulated Invoker
// ============================================================================

/// In-process invoker that sleeps for a fixed runtime
///
/// Used by `dry-run` and tests. Optionally fails every n-th call
/// (1-based), so `fail_every(3)` fails calls 3, 6, 9, ...
#[derive(Debug)]
pub struct SimulatedInvoker {
    runtime: Duration,
    fail_every: Option<usize>,
    calls: AtomicUsize,
}

impl SimulatedInvoker {
    /// Invoker whose every call takes `runtime`
    pub fn new(runtime: Duration) -> Self {
        Self {
            runtime,
            fail_every: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Fail every n-th call; `0` disables failures
    pub fn fail_every(mut self, n: usize) -> Self {
        self.fail_every = (n > 0).then_some(n);
        self
    }

    /// Number of invocations received so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Invoker for SimulatedInvoker {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn invoke(&self, stream_id: usize) -> Result<InvocationOutcome, InvokeError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

        tokio::time::sleep(self.runtime).await;

        if let Some(n) = self.fail_every {
            if call % n == 0 {
                return Err(InvokeError::Failed(format!(
                    "simulated failure on call {call} (stream {stream_id})"
                )));
            }
        }

        Ok(InvocationOutcome {
            runtime: self.runtime,
        })
    }
}
