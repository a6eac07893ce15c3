use std::error::Error;
use std::fmt::{Display, Formatter};

/// Error kind that represents failures reported by the [`crate::Client`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The client was built without a configured retriever.
    NoRetrieverConfigured,
    /// The evaluation failed because no flag snapshot has been installed yet,
    /// or the client has been closed.
    NotInitialized,
    /// The evaluation failed because the key of the evaluated flag was not
    /// found in the current snapshot.
    FlagNotFound,
    /// The evaluated flag is disabled by its kill-switch.
    FlagDisabled,
    /// The flag's targeting rule could not be evaluated and was treated as
    /// non-matching.
    RuleEvaluation,
    /// The flag's resolved value does not convert to the requested type.
    TypeMismatch,
    /// The retrieved flag document could not be deserialized. The previously
    /// served snapshot is retained.
    ParseFailure,
    /// The retriever failed to fetch the flag document.
    RetrievalFailure,
}

/// Error struct that holds the [`ErrorKind`] and message of the reported failure.
#[derive(Debug, PartialEq)]
pub struct ClientError {
    /// Error kind that represents failures reported by the [`crate::Client`].
    pub kind: ErrorKind,
    /// The text representation of the failure.
    pub message: String,
}

impl ClientError {
    pub(crate) fn new(kind: ErrorKind, message: String) -> Self {
        Self { kind, message }
    }
}

impl Display for ClientError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message.as_str())
    }
}

impl Error for ClientError {}
