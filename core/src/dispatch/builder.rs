//! Builder pattern for StreamWorker construction

use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::metrics::Exporter;
use crate::trace::ArrivalStream;
use crate::traits::Invoker;

use super::worker::StreamWorker;

/// Builder for creating StreamWorker instances
///
/// # Example
/// ```ignore
/// let worker = StreamWorkerBuilder::new(0)
///     .stream(stream)
///     .invoker(invoker)
///     .exporter(exporter)
///     .invocation_timeout(Duration::from_secs(30))
///     .build()?;
/// ```
#[derive(Default)]
pub struct StreamWorkerBuilder {
    id: usize,
    stream: Option<ArrivalStream>,
    invoker: Option<Arc<dyn Invoker>>,
    exporter: Option<Arc<Exporter>>,
    invocation_timeout: Option<Duration>,
}

impl StreamWorkerBuilder {
    /// Create a new builder for stream `id`
    pub fn new(id: usize) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// Set the arrival stream to replay
    pub fn stream(mut self, stream: ArrivalStream) -> Self {
        self.stream = Some(stream);
        self
    }

    /// Set the invoker
    pub fn invoker(mut self, invoker: Arc<dyn Invoker>) -> Self {
        self.invoker = Some(invoker);
        self
    }

    /// Set the exporter receiving execution records
    pub fn exporter(mut self, exporter: Arc<Exporter>) -> Self {
        self.exporter = Some(exporter);
        self
    }

    /// Set the per-invocation deadline
    pub fn invocation_timeout(mut self, timeout: Duration) -> Self {
        self.invocation_timeout = Some(timeout);
        self
    }

    /// Build the StreamWorker
    ///
    /// # Errors
    /// Returns [`Error::MissingConfig`] if any required part is missing.
    pub fn build(self) -> Result<StreamWorker> {
        let stream = self.stream.ok_or(Error::MissingConfig("stream"))?;
        let invoker = self.invoker.ok_or(Error::MissingConfig("invoker"))?;
        let exporter = self.exporter.ok_or(Error::MissingConfig("exporter"))?;
        let invocation_timeout = self
            .invocation_timeout
            .ok_or(Error::MissingConfig("invocation_timeout"))?;

        Ok(StreamWorker::new(
            self.id,
            stream,
            invoker,
            exporter,
            invocation_timeout,
        ))
    }
}
