use crate::retrieve::{Retriever, RetrieverError};
use async_trait::async_trait;
use std::path::PathBuf;

/// Retriever that reads the flag definition document from a local file.
///
/// # Examples
///
/// ```rust
/// use vexil::FileRetriever;
///
/// let retriever = FileRetriever::new("flags.yaml");
/// ```
pub struct FileRetriever {
    path: PathBuf,
}

impl FileRetriever {
    /// Creates a new [`FileRetriever`] reading from `path`.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Retriever for FileRetriever {
    async fn retrieve(&self) -> Result<Vec<u8>, RetrieverError> {
        Ok(tokio::fs::read(&self.path).await?)
    }
}
