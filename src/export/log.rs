use crate::export::event::FeatureEvent;
use crate::export::{ExportError, SingleExporter};
use async_trait::async_trait;
use log::info;

/// Exporter that logs one variation record per event.
///
/// # Examples
///
/// ```rust
/// use vexil::{ExportSink, LogExporter};
///
/// let sink = ExportSink::Single(Box::new(LogExporter::new()));
/// ```
#[derive(Default)]
pub struct LogExporter {}

impl LogExporter {
    /// Creates a new [`LogExporter`].
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait]
impl SingleExporter for LogExporter {
    async fn export(&self, event: FeatureEvent) -> Result<(), ExportError> {
        info!(flag = event.key.as_str(); "user=\"{}\", flag=\"{}\", value=\"{}\"", event.user_key, event.key, event.value);
        Ok(())
    }
}
