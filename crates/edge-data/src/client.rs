//! Retrieval channel and the Spin-backed client.

use async_trait::async_trait;
use edge_core::FragmentId;

/// Error type for retrieval operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP error: {status} for {url}")]
    Http { status: u16, url: String },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request error: {0}")]
    Request(String),

    #[error("Body is not valid UTF-8: {0}")]
    Decode(String),
}

/// Status and full text body of a retrieval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retrieved {
    /// HTTP-style status code.
    pub status: u16,
    /// Response body.
    pub body: String,
}

impl Retrieved {
    /// Create a retrieval result.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// A 200 response.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Fetch a resource by identifier.
///
/// Implementations report network-level failures as `Err`; any status,
/// success or not, comes back as `Ok` and is judged by the caller.
#[async_trait(?Send)]
pub trait Retriever {
    /// Retrieve the resource named by `id`.
    async fn retrieve(&self, id: &FragmentId) -> Result<Retrieved, FetchError>;
}

#[async_trait(?Send)]
impl<R: Retriever + ?Sized> Retriever for std::rc::Rc<R> {
    async fn retrieve(&self, id: &FragmentId) -> Result<Retrieved, FetchError> {
        (**self).retrieve(id).await
    }
}

/// Platform fetch through Spin's outbound HTTP.
#[derive(Debug, Clone, Default)]
pub struct SpinRetriever {
    base_url: Option<String>,
}

impl SpinRetriever {
    /// Create a retriever that sends identifiers as-is.
    pub fn new() -> Self {
        Self::default()
    }

    /// Join relative identifiers onto a base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// URL requested for a fragment identifier.
    pub fn resolve(&self, id: &FragmentId) -> String {
        resolve_url(self.base_url.as_deref(), id.as_str())
    }
}

#[async_trait(?Send)]
impl Retriever for SpinRetriever {
    async fn retrieve(&self, id: &FragmentId) -> Result<Retrieved, FetchError> {
        let url = self.resolve(id);

        let req = spin_sdk::http::Request::get(&url);
        let resp: spin_sdk::http::Response = spin_sdk::http::send(req)
            .await
            .map_err(|e| FetchError::Connection(e.to_string()))?;

        let status = *resp.status();
        let body = String::from_utf8(resp.body().to_vec())
            .map_err(|e| FetchError::Decode(e.to_string()))?;

        Ok(Retrieved { status, body })
    }
}

/// Join `path` onto `base`. Absolute URLs and a missing base pass through.
pub fn resolve_url(base: Option<&str>, path: &str) -> String {
    let is_absolute = path.starts_with("http://") || path.starts_with("https://");
    match base {
        Some(base) if !is_absolute && !base.is_empty() => format!(
            "{}/{}",
            base.trim_end_matches('/'),
            path.trim_start_matches('/')
        ),
        _ => path.to_string(),
    }
}
