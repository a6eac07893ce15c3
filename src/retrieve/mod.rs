use async_trait::async_trait;
use thiserror::Error;

pub mod file;
pub mod github;
pub mod http;

/// Error describing a failed flag document retrieval.
#[derive(Error, Debug)]
pub enum RetrieverError {
    /// I/O failure while reading the source.
    #[error("I/O failure during retrieval. ({0})")]
    Io(#[from] std::io::Error),
    /// HTTP failure while fetching the source.
    #[error("HTTP failure during retrieval. ({0})")]
    Http(#[from] reqwest::Error),
    /// The source answered with a non-success status.
    #[error("unexpected HTTP response status {0}")]
    UnexpectedStatus(u16),
    /// A configured request header is not a valid HTTP header.
    #[error("invalid HTTP header '{0}'")]
    InvalidHeader(String),
}

/// External collaborator that fetches the raw flag definition document.
///
/// Exactly one retriever must be configured on the
/// [`ClientBuilder`](crate::ClientBuilder); the background updater calls it on
/// every polling cycle. The retrieved bytes are not retained after a
/// successful parse.
#[async_trait]
pub trait Retriever: Sync + Send {
    /// Fetches the current flag definition document.
    async fn retrieve(&self) -> Result<Vec<u8>, RetrieverError>;
}
