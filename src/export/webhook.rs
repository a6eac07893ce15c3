use crate::export::event::FeatureEvent;
use crate::export::{BulkExporter, ExportError};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize)]
struct WebhookPayload<'a> {
    events: &'a [FeatureEvent],
}

/// Exporter that POSTs each batch as a JSON document to a collector endpoint.
///
/// The request body is `{"events": [...]}`.
///
/// # Examples
///
/// ```rust
/// use vexil::{ExportSink, WebhookExporter};
///
/// let sink = ExportSink::Bulk(Box::new(
///     WebhookExporter::new("https://collector.example.com/events"),
/// ));
/// ```
pub struct WebhookExporter {
    endpoint: String,
    timeout: Duration,
    http_client: reqwest::Client,
}

impl WebhookExporter {
    /// Creates a new [`WebhookExporter`] targeting `endpoint`.
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_owned(),
            timeout: DEFAULT_TIMEOUT,
            http_client: reqwest::Client::new(),
        }
    }

    /// Sets the HTTP request timeout. Default value is `10` seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl BulkExporter for WebhookExporter {
    async fn export_batch(&self, events: Vec<FeatureEvent>) -> Result<(), ExportError> {
        let body = serde_json::to_string(&WebhookPayload { events: &events })?;
        let response = self
            .http_client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ExportError::Rejected(response.status().as_u16()));
        }
        Ok(())
    }
}
