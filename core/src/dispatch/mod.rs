//! Reference dispatch driver for generated traces
//!
//! A [`StreamWorker`] turns one [`ArrivalStream`](crate::trace::ArrivalStream)
//! into real invocations. Its loop is deliberately small:
//! **wait for the next arrival -> spawn the invocation -> repeat**.
//!
//! 1. Sleeps until `experiment start + sum(iat[0..=i])`
//! 2. Spawns the invocation as its own task, so a slow call never delays
//!    the arrivals behind it
//! 3. Reports each outcome to the shared [`Exporter`](crate::metrics::Exporter)
//! 4. Stops at the end of the stream or on the shutdown signal, then waits
//!    for the invocations still in flight
//!
//! Invocations are never retried.
//!
//! # Example
//!
//! ```ignore
//! use faas_loader_core::dispatch::StreamWorkerBuilder;
//!
//! let worker = StreamWorkerBuilder::new(0)
//!     .stream(stream)
//!     .invoker(invoker)
//!     .exporter(exporter)
//!     .invocation_timeout(Duration::from_secs(30))
//!     .build()?;
//!
//! let stats = worker.run(tokio::time::Instant::now(), shutdown_rx).await;
//! println!("Issued: {}", stats.issued);
//! ```

mod builder;
mod stats;
mod worker;

pub use builder::StreamWorkerBuilder;
pub use stats::DispatchStats;
pub use worker::StreamWorker;

#[cfg(test)]
mod tests;
