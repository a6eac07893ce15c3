use crate::retrieve::{Retriever, RetrieverError};
use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Method;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Retriever that fetches the flag definition document from an HTTP endpoint.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use vexil::HttpRetriever;
///
/// let retriever = HttpRetriever::new("https://example.com/flags.yaml")
///     .header("Authorization", "Bearer token")
///     .timeout(Duration::from_secs(5));
/// ```
pub struct HttpRetriever {
    url: String,
    method: Method,
    headers: Vec<(String, String)>,
    body: Option<String>,
    timeout: Duration,
    http_client: reqwest::Client,
}

impl HttpRetriever {
    /// Creates a new [`HttpRetriever`] issuing `GET` requests against `url`.
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_owned(),
            method: Method::GET,
            headers: Vec::new(),
            body: None,
            timeout: DEFAULT_TIMEOUT,
            http_client: reqwest::Client::new(),
        }
    }

    /// Sets the HTTP method. Default is `GET`.
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Adds a request header.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    /// Sets a request body.
    pub fn body(mut self, body: &str) -> Self {
        self.body = Some(body.to_owned());
        self
    }

    /// Sets the request timeout. Default value is `10` seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[cfg(test)]
    pub(crate) fn url(&self) -> &str {
        &self.url
    }

    #[cfg(test)]
    pub(crate) fn headers(&self) -> &[(String, String)] {
        &self.headers
    }
}

#[async_trait]
impl Retriever for HttpRetriever {
    async fn retrieve(&self) -> Result<Vec<u8>, RetrieverError> {
        let mut builder = self
            .http_client
            .request(self.method.clone(), &self.url)
            .timeout(self.timeout);
        for (name, value) in &self.headers {
            let header_name = HeaderName::from_str(name)
                .map_err(|_| RetrieverError::InvalidHeader(name.clone()))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|_| RetrieverError::InvalidHeader(name.clone()))?;
            builder = builder.header(header_name, header_value);
        }
        if let Some(body) = &self.body {
            builder = builder.body(body.clone());
        }
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RetrieverError::UnexpectedStatus(status.as_u16()));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod http_tests {
    use crate::retrieve::http::HttpRetriever;
    use crate::retrieve::{Retriever, RetrieverError};
    use reqwest::Method;

    #[tokio::test]
    async fn fetches_the_document() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/flags.yaml")
            .match_header("x-api-key", "secret")
            .with_status(200)
            .with_body("test-flag:\n  percentage: 100\n")
            .create_async()
            .await;

        let retriever = HttpRetriever::new(format!("{}/flags.yaml", server.url()).as_str())
            .header("X-Api-Key", "secret");
        let bytes = retriever.retrieve().await.unwrap();

        assert_eq!(bytes, b"test-flag:\n  percentage: 100\n");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn post_with_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/flags")
            .match_body("query")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let retriever = HttpRetriever::new(format!("{}/flags", server.url()).as_str())
            .method(Method::POST)
            .body("query");
        retriever.retrieve().await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/flags.yaml")
            .with_status(404)
            .create_async()
            .await;

        let retriever = HttpRetriever::new(format!("{}/flags.yaml", server.url()).as_str());
        assert!(matches!(
            retriever.retrieve().await,
            Err(RetrieverError::UnexpectedStatus(404))
        ));
    }

    #[tokio::test]
    async fn invalid_header_is_an_error() {
        let retriever = HttpRetriever::new("http://localhost/flags.yaml")
            .header("bad header name", "value");
        assert!(matches!(
            retriever.retrieve().await,
            Err(RetrieverError::InvalidHeader(_))
        ));
    }
}
