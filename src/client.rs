use std::any::type_name;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use log::{error, info, warn};
use tokio_util::sync::CancellationToken;

use crate::builder::ClientBuilder;
use crate::errors::{ClientError, ErrorKind};
use crate::eval::details::EvaluationDetails;
use crate::eval::evaluator::eval;
use crate::export::event::FeatureEvent;
use crate::export::scheduler::ExportScheduler;
use crate::model::enums::FlagFormat;
use crate::retrieve::Retriever;
use crate::store::{FlagStore, StoreError};
use crate::updater::Updater;
use crate::user::User;
use crate::value::{FlagValue, OptionalValueDisplay, VariationValue};

/// Running export pipeline of a [`Client`], a scheduler plus its flush daemon.
pub(crate) struct ExportHandle {
    scheduler: Arc<ExportScheduler>,
    cancellation_token: CancellationToken,
    join_handle: tokio::sync::Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl ExportHandle {
    pub(crate) fn new(
        scheduler: Arc<ExportScheduler>,
        cancellation_token: CancellationToken,
        join_handle: tokio::task::JoinHandle<()>,
    ) -> Self {
        Self {
            scheduler,
            cancellation_token,
            join_handle: tokio::sync::Mutex::new(Some(join_handle)),
        }
    }

    async fn stop(&self) {
        self.cancellation_token.cancel();
        if let Some(handle) = self.join_handle.lock().await.take() {
            _ = handle.await;
        }
    }
}

impl Drop for ExportHandle {
    fn drop(&mut self) {
        self.cancellation_token.cancel();
    }
}

/// The main component for evaluating feature flags.
///
/// # Examples
///
/// ```no_run
/// use vexil::{Client, FileRetriever, User};
///
/// #[tokio::main]
/// async fn main() {
///     let client = Client::builder()
///         .retriever(Box::new(FileRetriever::new("flags.yaml")))
///         .build()
///         .await
///         .unwrap();
///
///     let user = User::new("user-id");
///     let enabled = client.bool_variation("flag-key", &user, false);
///
///     client.close().await;
/// }
/// ```
pub struct Client {
    store: Arc<FlagStore>,
    retriever: Arc<dyn Retriever>,
    format: FlagFormat,
    updater: Option<Updater>,
    exports: Option<ExportHandle>,
    closed: AtomicBool,
}

impl Client {
    pub(crate) fn new(
        store: Arc<FlagStore>,
        retriever: Arc<dyn Retriever>,
        format: FlagFormat,
        updater: Option<Updater>,
        exports: Option<ExportHandle>,
    ) -> Self {
        Self {
            store,
            retriever,
            format,
            updater,
            exports,
            closed: AtomicBool::new(false),
        }
    }

    /// Creates a new [`ClientBuilder`] used to build a [`Client`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::time::Duration;
    /// use vexil::{Client, FileRetriever};
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let client = Client::builder()
    ///         .retriever(Box::new(FileRetriever::new("flags.yaml")))
    ///         .polling_interval(Duration::from_secs(30))
    ///         .build()
    ///         .await
    ///         .unwrap();
    /// }
    /// ```
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Evaluates the feature flag identified by the given `key` for `user`.
    ///
    /// Returns `default` if the flag doesn't exist, is disabled, or its
    /// resolved value does not convert to `T`.
    pub fn variation<T: VariationValue + Clone>(&self, key: &str, user: &User, default: T) -> T {
        self.variation_details(key, user, default).value
    }

    /// The same as [`Client::variation`] but returns an [`EvaluationDetails`]
    /// that contains additional information about the result of the
    /// evaluation process.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use vexil::{Client, FileRetriever, User};
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let client = Client::builder()
    ///         .retriever(Box::new(FileRetriever::new("flags.yaml")))
    ///         .build()
    ///         .await
    ///         .unwrap();
    ///
    ///     let details = client.variation_details("flag-key", &User::new("user-id"), false);
    /// }
    /// ```
    pub fn variation_details<T: VariationValue + Clone>(
        &self,
        key: &str,
        user: &User,
        default: T,
    ) -> EvaluationDetails<T> {
        let flag = match self.store.flag(key) {
            Ok(flag) => flag,
            Err(err) => {
                let kind = match err {
                    StoreError::NotInitialized => ErrorKind::NotInitialized,
                    StoreError::NotFound(_) => ErrorKind::FlagNotFound,
                };
                let err = ClientError::new(kind, format!("Failed to evaluate '{key}': {err}"));
                warn!(flag = key; "{err}");
                self.log_variation(key, user, &default.clone().into());
                return EvaluationDetails::from_err(default, key, err);
            }
        };
        if flag.disable {
            let err = ClientError::new(
                ErrorKind::FlagDisabled,
                format!("Flag '{key}' is disabled, the default value is served."),
            );
            warn!(flag = key; "{err}");
            self.log_variation(key, user, &default.clone().into());
            return EvaluationDetails::from_err(default, key, err);
        }

        let outcome = eval(&flag, key, user, Utc::now());
        let value = match outcome.value.as_ref().and_then(T::from_value) {
            Some(value) => value,
            None => {
                let resolved_type =
                    outcome.value.as_ref().map_or("none", FlagValue::type_name);
                let err = ClientError::new(
                    ErrorKind::TypeMismatch,
                    format!(
                        "Flag '{key}' resolved to '{}' of type '{resolved_type}', which does not match the requested type '{}'.",
                        outcome.value.to_str(),
                        type_name::<T>()
                    ),
                );
                warn!(flag = key; "{err}");
                self.log_variation(key, user, &default.clone().into());
                return EvaluationDetails::from_err(default, key, err);
            }
        };

        let error = outcome.rule_error.map(|rule_err| {
            let err = ClientError::new(
                ErrorKind::RuleEvaluation,
                format!("Rule of flag '{key}' could not be evaluated: {rule_err}"),
            );
            warn!(flag = key; "{err}");
            err
        });

        if flag.track_events {
            if let Some(exports) = &self.exports {
                exports.scheduler.add_event(FeatureEvent::new(
                    user,
                    key,
                    value.clone().into(),
                    outcome.variation,
                    false,
                ));
            }
        }
        self.log_variation(key, user, &value.clone().into());

        EvaluationDetails {
            value,
            key: key.to_owned(),
            variation: outcome.variation,
            is_default_value: false,
            error,
        }
    }

    /// Evaluates the flag identified by `key` as a [`bool`].
    pub fn bool_variation(&self, key: &str, user: &User, default: bool) -> bool {
        self.variation(key, user, default)
    }

    /// Evaluates the flag identified by `key` as an [`i64`].
    pub fn int_variation(&self, key: &str, user: &User, default: i64) -> i64 {
        self.variation(key, user, default)
    }

    /// Evaluates the flag identified by `key` as an [`f64`].
    pub fn float_variation(&self, key: &str, user: &User, default: f64) -> f64 {
        self.variation(key, user, default)
    }

    /// Evaluates the flag identified by `key` as a [`String`].
    pub fn string_variation(&self, key: &str, user: &User, default: String) -> String {
        self.variation(key, user, default)
    }

    /// Evaluates the flag identified by `key` as a JSON array.
    pub fn json_array_variation(
        &self,
        key: &str,
        user: &User,
        default: Vec<serde_json::Value>,
    ) -> Vec<serde_json::Value> {
        self.variation(key, user, default)
    }

    /// Evaluates the flag identified by `key` as a JSON object.
    pub fn json_variation(
        &self,
        key: &str,
        user: &User,
        default: serde_json::Map<String, serde_json::Value>,
    ) -> serde_json::Map<String, serde_json::Value> {
        self.variation(key, user, default)
    }

    /// Returns the keys of all flags in the currently served snapshot.
    ///
    /// Returns an empty vector if no snapshot has been installed yet.
    pub fn all_flag_keys(&self) -> Vec<String> {
        match self.store.all_keys() {
            Ok(keys) => keys,
            Err(err) => {
                error!("Failed to list flag keys: {err}");
                Vec::default()
            }
        }
    }

    /// Initiates an immediate re-retrieval of the flag definitions,
    /// independent of the polling schedule.
    ///
    /// # Errors
    ///
    /// This method fails in the following cases:
    /// - The retriever fails to fetch the flag document.
    /// - The fetched document cannot be parsed. The previously served
    ///   snapshot is retained.
    pub async fn refresh(&self) -> Result<(), ClientError> {
        crate::updater::refresh(self.retriever.as_ref(), &self.store, self.format).await
    }

    /// Shuts the client down: stops the background updater, flushes pending
    /// evaluation events to the exporter, and releases the flag snapshot.
    ///
    /// Subsequent evaluations fail with [`ErrorKind::NotInitialized`].
    /// Calling this method more than once has no further effect.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(updater) = &self.updater {
            updater.stop().await;
        }
        if let Some(exports) = &self.exports {
            exports.stop().await;
        }
        self.store.close();
    }

    fn log_variation(&self, key: &str, user: &User, value: &FlagValue) {
        info!(flag = key; "user=\"{}\", flag=\"{key}\", value=\"{value}\"", user.key());
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("format", &self.format)
            .field("polling", &self.updater.is_some())
            .field("exporting", &self.exports.is_some())
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        if let Some(exports) = &self.exports {
            exports.cancellation_token.cancel();
        }
    }
}
