//! Invocation outcome collection
//!
//! Invocation workers report one [`ExecutionRecord`] per finished call and
//! the driver reports one [`MinuteInvocationRecord`] per experiment minute.
//! Both land in a shared [`Exporter`], which answers ordering and health
//! queries at any time while reports keep arriving.

mod exporter;
mod record;
mod summary;

pub use exporter::Exporter;
pub use record::{good_fraction, ExecutionRecord, MinuteInvocationRecord};
pub use summary::{ExecutionSummary, LatencyPercentiles};
