use crate::export::event::FeatureEvent;
use crate::export::ExportSink;
use chrono::Utc;
use log::error;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Buffers evaluation events and flushes them to the configured sink on a
/// time or size trigger.
///
/// `add_event` is the only touch point on the evaluation hot path; it holds
/// the buffer lock just long enough to append. Flushing swaps the buffer out
/// under the lock and performs sink I/O with the lock released, so appends are
/// never blocked for the duration of sink I/O.
pub(crate) struct ExportScheduler {
    sink: ExportSink,
    flush_interval: Duration,
    max_pending: usize,
    buffer: Mutex<Vec<FeatureEvent>>,
    flush_signal: Notify,
}

impl ExportScheduler {
    pub fn new(sink: ExportSink, flush_interval: Duration, max_pending: usize) -> Self {
        Self {
            sink,
            flush_interval,
            max_pending,
            buffer: Mutex::new(Vec::new()),
            flush_signal: Notify::new(),
        }
    }

    /// Appends an event. When the buffer reaches the configured maximum, the
    /// flush daemon is woken immediately instead of waiting for the next tick;
    /// sink I/O never runs on the caller's thread.
    pub fn add_event(&self, event: FeatureEvent) {
        let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        buffer.push(event);
        let full = buffer.len() >= self.max_pending;
        drop(buffer);
        if full {
            self.flush_signal.notify_one();
        }
    }

    /// Runs the flush daemon until the token is cancelled, then performs one
    /// final flush so no buffered event is lost on shutdown.
    pub async fn run(&self, cancellation_token: CancellationToken) {
        let mut tick =
            tokio::time::interval_at(Instant::now() + self.flush_interval, self.flush_interval);
        loop {
            tokio::select! {
                _ = tick.tick() => self.flush().await,
                _ = self.flush_signal.notified() => self.flush().await,
                _ = cancellation_token.cancelled() => break,
            }
        }
        self.flush().await;
    }

    async fn flush(&self) {
        let events = {
            let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut *buffer)
        };
        if events.is_empty() {
            return;
        }
        let result = match &self.sink {
            ExportSink::Bulk(exporter) => exporter.export_batch(events).await,
            ExportSink::Single(exporter) => {
                let mut result = Ok(());
                for event in events {
                    if let Err(err) = exporter.export(event).await {
                        result = Err(err);
                        break;
                    }
                }
                result
            }
        };
        // at-most-once: a failed batch is dropped, the daemon keeps running
        if let Err(err) = result {
            error!("[{}] error while exporting events: {err}", Utc::now().to_rfc3339());
        }
    }
}

#[cfg(test)]
mod scheduler_tests {
    use crate::export::event::FeatureEvent;
    use crate::export::scheduler::ExportScheduler;
    use crate::export::{BulkExporter, ExportError, ExportSink, SingleExporter};
    use crate::model::enums::VariationKind;
    use crate::user::User;
    use crate::value::FlagValue;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    struct RecordingSink {
        events: Arc<Mutex<Vec<FeatureEvent>>>,
        batches: Arc<Mutex<Vec<usize>>>,
        fail: bool,
    }

    impl RecordingSink {
        fn new() -> Self {
            Self {
                events: Arc::new(Mutex::new(vec![])),
                batches: Arc::new(Mutex::new(vec![])),
                fail: false,
            }
        }
    }

    #[async_trait]
    impl BulkExporter for RecordingSink {
        async fn export_batch(&self, events: Vec<FeatureEvent>) -> Result<(), ExportError> {
            if self.fail {
                return Err(ExportError::Rejected(500));
            }
            self.batches.lock().unwrap().push(events.len());
            self.events.lock().unwrap().extend(events);
            Ok(())
        }
    }

    #[async_trait]
    impl SingleExporter for RecordingSink {
        async fn export(&self, event: FeatureEvent) -> Result<(), ExportError> {
            if self.fail {
                return Err(ExportError::Rejected(500));
            }
            self.events.lock().unwrap().push(event);
            Ok(())
        }
    }

    fn event(user_key: &str) -> FeatureEvent {
        FeatureEvent::new(
            &User::new_anonymous(user_key),
            "random-key",
            FlagValue::Bool(true),
            VariationKind::True,
            false,
        )
    }

    fn start(
        scheduler: &Arc<ExportScheduler>,
    ) -> (CancellationToken, tokio::task::JoinHandle<()>) {
        let token = CancellationToken::new();
        let task_token = token.clone();
        let task_scheduler = Arc::clone(scheduler);
        let handle = tokio::spawn(async move { task_scheduler.run(task_token).await });
        (token, handle)
    }

    #[tokio::test]
    async fn flush_on_timer() {
        let sink = RecordingSink::new();
        let events = Arc::clone(&sink.events);
        let scheduler = Arc::new(ExportScheduler::new(
            ExportSink::Bulk(Box::new(sink)),
            Duration::from_millis(20),
            1000,
        ));
        let (token, handle) = start(&scheduler);

        scheduler.add_event(event("ABCD"));
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(events.lock().unwrap().len(), 1);
        token.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn flush_on_buffer_size() {
        let sink = RecordingSink::new();
        let events = Arc::clone(&sink.events);
        let scheduler = Arc::new(ExportScheduler::new(
            ExportSink::Bulk(Box::new(sink)),
            Duration::from_secs(600),
            100,
        ));
        let (token, handle) = start(&scheduler);

        for i in 0..100 {
            scheduler.add_event(event(&format!("user-{i}")));
        }
        tokio::time::sleep(Duration::from_millis(100)).await;

        // the size trigger fired without waiting for the tick
        assert_eq!(events.lock().unwrap().len(), 100);
        token.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn close_flushes_everything_in_order() {
        let sink = RecordingSink::new();
        let events = Arc::clone(&sink.events);
        let scheduler = Arc::new(ExportScheduler::new(
            ExportSink::Bulk(Box::new(sink)),
            Duration::from_secs(600),
            100_000,
        ));
        let (token, handle) = start(&scheduler);

        for i in 0..250 {
            scheduler.add_event(event(&format!("user-{i}")));
        }
        token.cancel();
        handle.await.unwrap();

        let exported = events.lock().unwrap();
        assert_eq!(exported.len(), 250);
        for (i, event) in exported.iter().enumerate() {
            assert_eq!(event.user_key, format!("user-{i}"));
        }
    }

    #[tokio::test]
    async fn single_sink_receives_events_in_sequence() {
        let sink = RecordingSink::new();
        let events = Arc::clone(&sink.events);
        let scheduler = Arc::new(ExportScheduler::new(
            ExportSink::Single(Box::new(sink)),
            Duration::from_secs(600),
            100_000,
        ));
        let (token, handle) = start(&scheduler);

        for i in 0..50 {
            scheduler.add_event(event(&format!("user-{i}")));
        }
        token.cancel();
        handle.await.unwrap();

        let exported = events.lock().unwrap();
        assert_eq!(exported.len(), 50);
        assert_eq!(exported[0].user_key, "user-0");
        assert_eq!(exported[49].user_key, "user-49");
    }

    #[tokio::test]
    async fn sink_failure_drops_the_batch_and_keeps_running() {
        let mut sink = RecordingSink::new();
        sink.fail = true;
        let events = Arc::clone(&sink.events);
        let scheduler = Arc::new(ExportScheduler::new(
            ExportSink::Bulk(Box::new(sink)),
            Duration::from_millis(20),
            1000,
        ));
        let (token, handle) = start(&scheduler);

        scheduler.add_event(event("ABCD"));
        tokio::time::sleep(Duration::from_millis(100)).await;

        // no redelivery: the failed batch is gone and later events still flow
        assert!(events.lock().unwrap().is_empty());
        scheduler.add_event(event("EFGH"));
        token.cancel();
        handle.await.unwrap();
        assert!(events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn batches_split_on_the_size_limit() {
        let sink = RecordingSink::new();
        let events = Arc::clone(&sink.events);
        let batches = Arc::clone(&sink.batches);
        let scheduler = Arc::new(ExportScheduler::new(
            ExportSink::Bulk(Box::new(sink)),
            Duration::from_secs(600),
            100,
        ));
        let (token, handle) = start(&scheduler);

        for i in 0..150 {
            scheduler.add_event(event(&format!("user-{i}")));
            // give the daemon a chance to take the full buffer
            if i == 99 {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        }
        token.cancel();
        handle.await.unwrap();

        assert_eq!(events.lock().unwrap().len(), 150);
        assert_eq!(*batches.lock().unwrap(), vec![100, 50]);
    }
}
