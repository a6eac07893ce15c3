use std::sync::Arc;
use std::time::Duration;

use log::{debug, error};
use tokio_util::sync::CancellationToken;

use crate::errors::{ClientError, ErrorKind};
use crate::model::enums::FlagFormat;
use crate::retrieve::Retriever;
use crate::store::FlagStore;

/// Retrieves the flag definition document and swaps it into the store.
pub(crate) async fn refresh(
    retriever: &dyn Retriever,
    store: &FlagStore,
    format: FlagFormat,
) -> Result<(), ClientError> {
    let bytes = retriever.retrieve().await.map_err(|err| {
        ClientError::new(
            ErrorKind::RetrievalFailure,
            format!("Failed to retrieve the flag definitions: {err}"),
        )
    })?;
    store.update(&bytes, format).map_err(|err| {
        ClientError::new(
            ErrorKind::ParseFailure,
            format!("Failed to parse the flag definitions: {err}"),
        )
    })
}

/// Background task that periodically refreshes the flag store.
pub(crate) struct Updater {
    cancellation_token: CancellationToken,
    join_handle: tokio::sync::Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl Updater {
    pub(crate) fn start(
        retriever: Arc<dyn Retriever>,
        store: Arc<FlagStore>,
        format: FlagFormat,
        interval: Duration,
    ) -> Self {
        let cancellation_token = CancellationToken::new();
        let token = cancellation_token.clone();

        let handle = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + interval;
            let mut tick = tokio::time::interval_at(start, interval);
            loop {
                tokio::select! {
                    _ = tick.tick() => {
                        match refresh(retriever.as_ref(), &store, format).await {
                            Ok(()) => debug!("Flag definitions refreshed"),
                            Err(err) => error!("{}", err.message),
                        }
                    },
                    _ = token.cancelled() => break
                }
            }
        });

        Self {
            cancellation_token,
            join_handle: tokio::sync::Mutex::new(Some(handle)),
        }
    }

    pub(crate) async fn stop(&self) {
        self.cancellation_token.cancel();
        if let Some(handle) = self.join_handle.lock().await.take() {
            _ = handle.await;
        }
    }
}

impl Drop for Updater {
    fn drop(&mut self) {
        self.cancellation_token.cancel();
    }
}

#[cfg(test)]
mod updater_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use crate::model::enums::FlagFormat;
    use crate::retrieve::http::HttpRetriever;
    use crate::store::FlagStore;
    use crate::updater::{refresh, Updater};
    use crate::value::FlagValue;

    #[tokio::test]
    async fn periodic_refresh_picks_up_changes() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/flags.yaml")
            .with_status(200)
            .with_body("test-flag:\n  percentage: 100\n  true: true\n  false: false\n")
            .expect_at_least(2)
            .create_async()
            .await;

        let retriever: Arc<dyn crate::retrieve::Retriever> = Arc::new(HttpRetriever::new(
            format!("{}/flags.yaml", server.url()).as_str(),
        ));
        let store = Arc::new(FlagStore::new(Vec::default()));

        refresh(retriever.as_ref(), &store, FlagFormat::Yaml)
            .await
            .unwrap();
        let updater = Updater::start(
            Arc::clone(&retriever),
            Arc::clone(&store),
            FlagFormat::Yaml,
            Duration::from_millis(100),
        );
        tokio::time::sleep(Duration::from_millis(250)).await;
        updater.stop().await;

        let flag = store.flag("test-flag").unwrap();
        assert_eq!(flag.true_value, Some(FlagValue::Bool(true)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn refresh_failure_keeps_the_store_untouched() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/flags.yaml")
            .with_status(500)
            .create_async()
            .await;

        let retriever =
            HttpRetriever::new(format!("{}/flags.yaml", server.url()).as_str());
        let store = FlagStore::new(Vec::default());
        store
            .update(b"test-flag:\n  percentage: 100\n", FlagFormat::Yaml)
            .unwrap();

        let result = refresh(&retriever, &store, FlagFormat::Yaml).await;

        assert!(result.is_err());
        assert!(store.flag("test-flag").is_ok());
    }
}
