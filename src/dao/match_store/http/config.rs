use std::time::Duration;

const DEFAULT_BACKEND_URL: &str = "http://localhost:8080";
const DEFAULT_ANALYZER_URL: &str = "http://localhost:5000";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Runtime configuration describing how to reach the match backend and the analyzer.
#[derive(Debug, Clone)]
pub struct HttpStoreConfig {
    /// Base URL of the match backend.
    pub backend_url: String,
    /// Base URL of the match analyzer.
    pub analyzer_url: String,
    /// Key sent as `X-API-KEY` on backend requests.
    pub api_key: Option<String>,
    /// Per-request timeout applied by the HTTP client.
    pub timeout: Duration,
}

impl HttpStoreConfig {
    /// Construct a configuration from explicit backend and analyzer base URLs.
    pub fn new(backend_url: impl Into<String>, analyzer_url: impl Into<String>) -> Self {
        Self {
            backend_url: backend_url.into(),
            analyzer_url: analyzer_url.into(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Attach the key sent in the `X-API-KEY` header.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build a configuration from `BACKEND_URL`, `ANALYZER_URL` and `BACKEND_API_KEY`,
    /// using local defaults for the URLs.
    pub fn from_env() -> Self {
        let backend_url =
            std::env::var("BACKEND_URL").unwrap_or_else(|_| DEFAULT_BACKEND_URL.into());
        let analyzer_url =
            std::env::var("ANALYZER_URL").unwrap_or_else(|_| DEFAULT_ANALYZER_URL.into());

        let config = Self::new(backend_url, analyzer_url);
        match std::env::var("BACKEND_API_KEY") {
            Ok(key) if !key.is_empty() => config.with_api_key(key),
            _ => config,
        }
    }
}
