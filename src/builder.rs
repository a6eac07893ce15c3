use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::client::{Client, ExportHandle};
use crate::errors::{ClientError, ErrorKind};
use crate::export::scheduler::ExportScheduler;
use crate::export::ExportSink;
use crate::model::enums::FlagFormat;
use crate::notify::Notifier;
use crate::retrieve::Retriever;
use crate::store::FlagStore;
use crate::updater::{refresh, Updater};

const DEFAULT_POLLING_INTERVAL: Duration = Duration::from_secs(60);
const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(60);
const DEFAULT_MAX_PENDING_EVENTS: usize = 100_000;

/// Builder to create a [`Client`].
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use vexil::{Client, FileRetriever, FlagFormat};
///
/// #[tokio::main]
/// async fn main() {
///     let client = Client::builder()
///         .retriever(Box::new(FileRetriever::new("flags.yaml")))
///         .format(FlagFormat::Yaml)
///         .polling_interval(Duration::from_secs(30))
///         .build()
///         .await
///         .unwrap();
/// }
/// ```
pub struct ClientBuilder {
    retriever: Option<Box<dyn Retriever>>,
    format: FlagFormat,
    polling_interval: Duration,
    exporter: Option<ExportSink>,
    flush_interval: Duration,
    max_pending_events: usize,
    notifiers: Vec<Box<dyn Notifier>>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientBuilder {
    /// Creates a new [`ClientBuilder`].
    pub fn new() -> Self {
        Self {
            retriever: None,
            format: FlagFormat::default(),
            polling_interval: DEFAULT_POLLING_INTERVAL,
            exporter: None,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            max_pending_events: DEFAULT_MAX_PENDING_EVENTS,
            notifiers: Vec::default(),
        }
    }

    /// Sets the retriever that fetches the flag definition document.
    /// Exactly one retriever must be configured.
    pub fn retriever(mut self, retriever: Box<dyn Retriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    /// Sets the format of the flag definition document.
    /// Default value is [`FlagFormat::Yaml`].
    pub fn format(mut self, format: FlagFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets the interval at which the flag definitions are re-retrieved.
    /// Default value is `60` seconds.
    ///
    /// A zero interval disables background polling, the definitions are
    /// loaded once at build time.
    pub fn polling_interval(mut self, interval: Duration) -> Self {
        self.polling_interval = interval;
        self
    }

    /// Sets the sink that receives the evaluation events of tracked flags.
    /// Without a sink no events are collected.
    pub fn exporter(mut self, exporter: ExportSink) -> Self {
        self.exporter = Some(exporter);
        self
    }

    /// Sets the interval at which collected evaluation events are flushed to
    /// the exporter. Default value is `60` seconds; a zero interval falls
    /// back to the default.
    pub fn flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = interval;
        self
    }

    /// Sets the number of pending evaluation events that triggers an early
    /// flush. Default value is `100000`.
    pub fn max_pending_events(mut self, max: usize) -> Self {
        self.max_pending_events = max;
        self
    }

    /// Adds a notifier that is called with a change summary after each flag
    /// definition update.
    pub fn notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifiers.push(notifier);
        self
    }

    /// Creates a [`Client`] from the builder's configuration and performs the
    /// initial load of the flag definitions.
    ///
    /// # Errors
    ///
    /// This method fails in the following cases:
    /// - No retriever is configured.
    /// - The initial retrieval or parse of the flag definitions fails.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use vexil::{Client, FileRetriever};
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let client = Client::builder()
    ///         .retriever(Box::new(FileRetriever::new("flags.yaml")))
    ///         .build()
    ///         .await
    ///         .unwrap();
    /// }
    /// ```
    pub async fn build(self) -> Result<Client, ClientError> {
        let retriever: Arc<dyn Retriever> = match self.retriever {
            Some(retriever) => Arc::from(retriever),
            None => {
                return Err(ClientError::new(
                    ErrorKind::NoRetrieverConfigured,
                    "A retriever must be configured.".to_owned(),
                ))
            }
        };
        let store = Arc::new(FlagStore::new(self.notifiers));

        refresh(retriever.as_ref(), &store, self.format).await?;

        let updater = if self.polling_interval.is_zero() {
            None
        } else {
            Some(Updater::start(
                Arc::clone(&retriever),
                Arc::clone(&store),
                self.format,
                self.polling_interval,
            ))
        };

        let exports = self.exporter.map(|sink| {
            // a zero interval would be an invalid timer period for the daemon
            let flush_interval = if self.flush_interval.is_zero() {
                DEFAULT_FLUSH_INTERVAL
            } else {
                self.flush_interval
            };
            let scheduler = Arc::new(ExportScheduler::new(
                sink,
                flush_interval,
                self.max_pending_events,
            ));
            let cancellation_token = CancellationToken::new();
            let daemon = Arc::clone(&scheduler);
            let token = cancellation_token.clone();
            let join_handle = tokio::spawn(async move { daemon.run(token).await });
            ExportHandle::new(scheduler, cancellation_token, join_handle)
        });

        Ok(Client::new(store, retriever, self.format, updater, exports))
    }
}
