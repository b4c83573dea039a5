//! Main Parallel client implementation.

use crate::error::{Error, Result};
use crate::types::*;
use crate::version::build_user_agent;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://api.parallel.ai/v1beta";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Beta tag sent in the `parallel-beta` header unless overridden.
pub const DEFAULT_BETA_TAG: &str = "search-extract-2025-10-10";

/// Environment variable holding the API key for [`Client::from_env`].
pub const API_KEY_ENV: &str = "PARALLEL_API_KEY";

/// Environment variable overriding the base URL for [`Client::from_env`].
pub const BASE_URL_ENV: &str = "PARALLEL_BASE_URL";

const API_KEY_HEADER: &str = "x-api-key";
const BETA_HEADER: &str = "parallel-beta";

/// How an endpoint expects the credential to be presented.
///
/// The search, extract and task endpoints take `x-api-key` plus the
/// `parallel-beta` tag; the chat endpoint takes a bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// `x-api-key: <key>` and `parallel-beta: <tag>`.
    ApiKey,
    /// `Authorization: Bearer <key>`.
    Bearer,
}

/// Builder for constructing a [`Client`].
pub struct ClientBuilder {
    api_key: String,
    base_url: String,
    beta_tag: String,
    timeout: Duration,
    user_agent_suffix: Option<String>,
}

impl ClientBuilder {
    /// Create a new client builder with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            beta_tag: DEFAULT_BETA_TAG.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent_suffix: None,
        }
    }

    /// Set the API base URL, including the version segment.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the `parallel-beta` tag.
    pub fn beta_tag(mut self, tag: impl Into<String>) -> Self {
        self.beta_tag = tag.into();
        self
    }

    /// Set the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom User-Agent suffix.
    pub fn user_agent_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.user_agent_suffix = Some(suffix.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<Client> {
        if self.api_key.is_empty() {
            return Err(Error::Config("API key is required".into()));
        }
        if self.timeout.is_zero() {
            return Err(Error::Config("timeout must be greater than zero".into()));
        }

        if !self.base_url.starts_with("https://") {
            warn!(
                base_url = %self.base_url,
                "API base URL is not using HTTPS. This is insecure."
            );
        }

        let mut api_key_headers = HeaderMap::new();
        api_key_headers.insert(
            HeaderName::from_static(API_KEY_HEADER),
            sensitive_value(&self.api_key)?,
        );
        api_key_headers.insert(
            HeaderName::from_static(BETA_HEADER),
            HeaderValue::from_str(&self.beta_tag)
                .map_err(|_| Error::Config("beta tag is not a valid header value".into()))?,
        );

        let mut bearer_headers = HeaderMap::new();
        bearer_headers.insert(
            AUTHORIZATION,
            sensitive_value(&format!("Bearer {}", self.api_key))?,
        );

        let base_url = Url::parse(&self.base_url)
            .map_err(|e| Error::Config(format!("invalid base URL {}: {}", self.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!("invalid base URL {}", self.base_url)));
        }

        let http_client = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(build_user_agent(self.user_agent_suffix.as_deref()))
            .build()
            .map_err(Error::Http)?;

        Ok(Client {
            base_url,
            beta_tag: self.beta_tag,
            timeout: self.timeout,
            http_client,
            api_key_headers,
            bearer_headers,
        })
    }
}

fn sensitive_value(value: &str) -> Result<HeaderValue> {
    let mut header = HeaderValue::from_str(value)
        .map_err(|_| Error::Config("API key is not a valid header value".into()))?;
    header.set_sensitive(true);
    Ok(header)
}

/// The Parallel API client.
///
/// Holds no per-call state; clone it or share it by reference across tasks.
///
/// # Example
///
/// ```rust,no_run
/// use parallel::{Client, SearchRequest};
///
/// #[tokio::main]
/// async fn main() -> Result<(), parallel::Error> {
///     let client = Client::new("your-api-key")?;
///
///     let response = client.search(SearchRequest {
///         objective: "Find the latest news on AI.".into(),
///         search_queries: vec!["latest AI news".into()],
///         max_results: 5,
///         ..Default::default()
///     }).await?;
///
///     for result in &response.results {
///         println!("{} ({})", result.title, result.url);
///     }
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Client {
    base_url: Url,
    beta_tag: String,
    timeout: Duration,
    http_client: reqwest::Client,
    api_key_headers: HeaderMap,
    bearer_headers: HeaderMap,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url.as_str())
            .field("beta_tag", &self.beta_tag)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a new client builder.
    pub fn builder(api_key: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(api_key)
    }

    /// Create a client with default settings.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        ClientBuilder::new(api_key).build()
    }

    /// Create a client from `PARALLEL_API_KEY` and, if set, `PARALLEL_BASE_URL`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| Error::Config(format!("{} is not set", API_KEY_ENV)))?;
        let mut builder = ClientBuilder::new(api_key);
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            builder = builder.base_url(url);
        }
        builder.build()
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Tag sent in the `parallel-beta` header.
    pub fn beta_tag(&self) -> &str {
        &self.beta_tag
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run a web search.
    pub async fn search(&self, request: SearchRequest) -> Result<SearchResponse> {
        self.post(&["search"], AuthScheme::ApiKey, &request).await
    }

    /// Extract content from one or more URLs.
    pub async fn extract(&self, request: ExtractRequest) -> Result<ExtractResponse> {
        self.post(&["extract"], AuthScheme::ApiKey, &request).await
    }

    /// Launch a task run. Use [`Client::poll_until_complete`] to wait for it.
    pub async fn run_task(&self, request: TaskRunRequest) -> Result<TaskRunResponse> {
        self.post(&["tasks", "runs"], AuthScheme::ApiKey, &request).await
    }

    /// Fetch the latest status or final output of a task run.
    ///
    /// The run id is sent as one percent-encoded path segment.
    pub async fn get_task(&self, run_id: &str) -> Result<TaskRunResult> {
        if run_id.is_empty() {
            return Err(Error::Config("run_id is required".into()));
        }
        self.request(
            Method::GET,
            &["tasks", "runs", run_id],
            AuthScheme::ApiKey,
            None,
        )
        .await
    }

    /// Request a chat completion.
    pub async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        self.post(&["chat", "completions"], AuthScheme::Bearer, &request).await
    }

    // === Internal methods ===

    async fn post<T, B>(&self, path: &[&str], auth: AuthScheme, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let payload = serde_json::to_vec(body).map_err(Error::Encode)?;
        self.request(Method::POST, path, auth, Some(payload)).await
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &[&str],
        auth: AuthScheme,
        body: Option<Vec<u8>>,
    ) -> Result<T> {
        let url = self.endpoint(path);
        let response = self.send(method.clone(), url.clone(), auth, body).await?;
        let status = response.status();
        debug!(method = %method, path = url.path(), status = %status, "Parallel API response");

        if !status.is_success() {
            return Err(Error::from_response(response).await);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| Error::Body { status, source })?;
        serde_json::from_slice(&bytes).map_err(Error::Decode)
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // checked in ClientBuilder::build
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        auth: AuthScheme,
        body: Option<Vec<u8>>,
    ) -> Result<reqwest::Response> {

        let headers = match auth {
            AuthScheme::ApiKey => self.api_key_headers.clone(),
            AuthScheme::Bearer => self.bearer_headers.clone(),
        };
        let mut req = self.http_client.request(method, url).headers(headers);

        if let Some(b) = body {
            req = req
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(b);
        }

        req.send().await.map_err(Error::from_send)
    }
}
