use crate::model::enums::FlagFormat;
use crate::model::flag::{flags_from_bytes, Flag, ParseError};
use crate::notify::{Notifier, UpdateSummary};
use arc_swap::ArcSwapOption;
use log::warn;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub(crate) enum StoreError {
    #[error("no flag snapshot has been installed")]
    NotInitialized,
    #[error("flag '{0}' does not exist")]
    NotFound(String),
}

/// Holds the currently served flag snapshot. A successful update replaces the
/// whole snapshot with a single pointer swap, so readers never observe a mix
/// of old and new definitions and are never blocked by the writer.
pub(crate) struct FlagStore {
    snapshot: ArcSwapOption<HashMap<String, Flag>>,
    notifiers: Vec<Box<dyn Notifier>>,
}

impl FlagStore {
    pub fn new(notifiers: Vec<Box<dyn Notifier>>) -> Self {
        Self { snapshot: ArcSwapOption::empty(), notifiers }
    }

    /// Deserializes `bytes` into a candidate snapshot and installs it. On a
    /// parse failure the previously served snapshot is retained unchanged.
    pub fn update(&self, bytes: &[u8], format: FlagFormat) -> Result<(), ParseError> {
        let flags = Arc::new(flags_from_bytes(bytes, format)?);
        let previous = self.snapshot.swap(Some(Arc::clone(&flags)));
        if !self.notifiers.is_empty() {
            let old = previous.unwrap_or_default();
            let summary = UpdateSummary::diff(&old, &flags);
            if !summary.is_empty() {
                for notifier in &self.notifiers {
                    if let Err(err) = notifier.notify(&summary) {
                        warn!("flag update notification failed: {err}");
                    }
                }
            }
        }
        Ok(())
    }

    pub fn flag(&self, key: &str) -> Result<Flag, StoreError> {
        let guard = self.snapshot.load();
        match guard.as_ref() {
            None => Err(StoreError::NotInitialized),
            Some(flags) => flags
                .get(key)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(key.to_owned())),
        }
    }

    pub fn all_keys(&self) -> Result<Vec<String>, StoreError> {
        let guard = self.snapshot.load();
        match guard.as_ref() {
            None => Err(StoreError::NotInitialized),
            Some(flags) => Ok(flags.keys().cloned().collect()),
        }
    }

    /// Releases the snapshot; subsequent reads fail with `NotInitialized`.
    pub fn close(&self) {
        self.snapshot.store(None);
    }
}
