use crate::model::flag::Flag;
use log::info;
use std::collections::HashMap;
use std::error::Error;

/// A notification sink invoked after each successful flag snapshot update.
///
/// Implementations must be fast and non-blocking; `notify` runs on the task
/// that performed the update. Returned errors are logged and never propagated.
pub trait Notifier: Sync + Send {
    /// Delivers the keyed diff of the snapshot update.
    fn notify(&self, summary: &UpdateSummary) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// The keyed diff between the previously served snapshot and the one that
/// replaced it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpdateSummary {
    /// Flags present in the new snapshot but not the old one.
    pub added: HashMap<String, Flag>,
    /// Flags present in the old snapshot but not the new one.
    pub deleted: HashMap<String, Flag>,
    /// Flags whose definition changed between the snapshots.
    pub updated: HashMap<String, UpdatedFlag>,
}

/// Before/after pair of an updated flag definition.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdatedFlag {
    /// The definition served before the update.
    pub before: Flag,
    /// The definition served after the update.
    pub after: Flag,
}

impl UpdateSummary {
    pub(crate) fn diff(old: &HashMap<String, Flag>, new: &HashMap<String, Flag>) -> Self {
        let mut summary = UpdateSummary::default();
        for (key, flag) in new {
            match old.get(key) {
                None => {
                    summary.added.insert(key.clone(), flag.clone());
                }
                Some(previous) if previous != flag => {
                    summary.updated.insert(
                        key.clone(),
                        UpdatedFlag { before: previous.clone(), after: flag.clone() },
                    );
                }
                Some(_) => {}
            }
        }
        for (key, flag) in old {
            if !new.contains_key(key) {
                summary.deleted.insert(key.clone(), flag.clone());
            }
        }
        summary
    }

    /// Whether the update changed anything at all.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.deleted.is_empty() && self.updated.is_empty()
    }
}

/// Notifier that logs one line per added, removed, and updated flag key.
#[derive(Default)]
pub struct LogNotifier {}

impl LogNotifier {
    /// Creates a new [`LogNotifier`].
    pub fn new() -> Self {
        Self {}
    }
}

impl Notifier for LogNotifier {
    fn notify(&self, summary: &UpdateSummary) -> Result<(), Box<dyn Error + Send + Sync>> {
        for key in summary.added.keys() {
            info!(flag = key.as_str(); "flag {key} added");
        }
        for key in summary.deleted.keys() {
            info!(flag = key.as_str(); "flag {key} removed");
        }
        for (key, update) in &summary.updated {
            info!(flag = key.as_str(); "flag {key} updated, old: [{:?}], new: [{:?}]", update.before, update.after);
        }
        Ok(())
    }
}
