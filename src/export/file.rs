use crate::export::event::FeatureEvent;
use crate::export::{BulkExporter, ExportError};
use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

/// Exporter that appends events as JSON lines to a timestamped file in the
/// configured directory.
///
/// Files are named `flag-variation-<unix-timestamp>.json` and opened in
/// append mode, so flushes landing in the same second share one file.
///
/// # Examples
///
/// ```rust
/// use vexil::{ExportSink, FileExporter};
///
/// let sink = ExportSink::Bulk(Box::new(FileExporter::new("/var/log/flags")));
/// ```
pub struct FileExporter {
    directory: PathBuf,
}

impl FileExporter {
    /// Creates a new [`FileExporter`] writing into `directory`.
    pub fn new<P: Into<PathBuf>>(directory: P) -> Self {
        Self { directory: directory.into() }
    }
}

#[async_trait]
impl BulkExporter for FileExporter {
    async fn export_batch(&self, events: Vec<FeatureEvent>) -> Result<(), ExportError> {
        let path = self
            .directory
            .join(format!("flag-variation-{}.json", Utc::now().timestamp()));
        let mut lines = String::new();
        for event in &events {
            lines.push_str(serde_json::to_string(event)?.as_str());
            lines.push('\n');
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(lines.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
