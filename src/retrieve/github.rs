use crate::retrieve::http::HttpRetriever;
use crate::retrieve::{Retriever, RetrieverError};
use async_trait::async_trait;
use std::time::Duration;

const DEFAULT_BRANCH: &str = "main";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Retriever that fetches the flag definition document from a GitHub repository
/// through the raw content endpoint.
///
/// # Examples
///
/// ```rust
/// use vexil::GithubRetriever;
///
/// let retriever = GithubRetriever::new("acme/flags", "config/flags.yaml")
///     .branch("production")
///     .token("github-token");
/// ```
pub struct GithubRetriever {
    repository_slug: String,
    file_path: String,
    branch: String,
    token: Option<String>,
    timeout: Duration,
}

impl GithubRetriever {
    /// Creates a new [`GithubRetriever`] for the `owner/repository` slug and
    /// the path of the flag file inside the repository.
    pub fn new(repository_slug: &str, file_path: &str) -> Self {
        Self {
            repository_slug: repository_slug.to_owned(),
            file_path: file_path.to_owned(),
            branch: DEFAULT_BRANCH.to_owned(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the branch to read from. Default value is `main`.
    pub fn branch(mut self, branch: &str) -> Self {
        self.branch = branch.to_owned();
        self
    }

    /// Sets the access token used to read private repositories.
    pub fn token(mut self, token: &str) -> Self {
        self.token = Some(token.to_owned());
        self
    }

    /// Sets the request timeout. Default value is `10` seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn to_http(&self) -> HttpRetriever {
        let url = format!(
            "https://raw.githubusercontent.com/{}/{}/{}",
            self.repository_slug, self.branch, self.file_path
        );
        let mut retriever = HttpRetriever::new(&url).timeout(self.timeout);
        if let Some(token) = &self.token {
            retriever = retriever.header("Authorization", format!("token {token}").as_str());
        }
        retriever
    }
}

#[async_trait]
impl Retriever for GithubRetriever {
    async fn retrieve(&self) -> Result<Vec<u8>, RetrieverError> {
        self.to_http().retrieve().await
    }
}
