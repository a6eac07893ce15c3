use async_trait::async_trait;
use thiserror::Error;

pub mod event;
pub mod file;
pub mod log;
pub(crate) mod scheduler;
pub mod webhook;

use event::FeatureEvent;

/// Error describing a failed event export. Export failures are logged and the
/// affected batch is dropped; they never reach the evaluation caller.
#[derive(Error, Debug)]
pub enum ExportError {
    /// I/O failure while writing events.
    #[error("I/O failure during export. ({0})")]
    Io(#[from] std::io::Error),
    /// HTTP failure while shipping events.
    #[error("HTTP failure during export. ({0})")]
    Http(#[from] reqwest::Error),
    /// The event collector answered with a non-success status.
    #[error("the event collector rejected the batch (HTTP {0})")]
    Rejected(u16),
    /// An event could not be serialized.
    #[error("event serialization failed. ({0})")]
    Serialization(#[from] serde_json::Error),
}

/// A sink that accepts a whole batch of evaluation events in one call.
#[async_trait]
pub trait BulkExporter: Sync + Send {
    /// Ships the batch. Events arrive in insertion order.
    async fn export_batch(&self, events: Vec<FeatureEvent>) -> Result<(), ExportError>;
}

/// A sink that accepts one evaluation event per call.
#[async_trait]
pub trait SingleExporter: Sync + Send {
    /// Ships one event.
    async fn export(&self, event: FeatureEvent) -> Result<(), ExportError>;
}

/// The export capability a sink offers, fixed once at construction. The
/// scheduler drives a bulk sink once per flush and a single sink once per
/// event, in insertion order.
pub enum ExportSink {
    /// The sink accepts whole batches.
    Bulk(Box<dyn BulkExporter>),
    /// The sink accepts one event at a time.
    Single(Box<dyn SingleExporter>),
}
