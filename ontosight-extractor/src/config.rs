use crate::error::{ExtractError, Result};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

/// Shared handle to the request configuration. The dispatcher reads it per
/// admission, so changes apply to requests that have not been dispatched yet.
pub type SharedConfig = Arc<Mutex<RequestConfig>>;

#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub endpoint: Url,
    pub limit: usize,
    pub label_lang: String,
    pub query_delay: Duration,
    pub concurrency: usize,
    pub timeout_hint: String,
}

impl RequestConfig {
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            limit: 10,
            label_lang: "en".to_string(),
            query_delay: Duration::from_millis(100),
            concurrency: 1,
            timeout_hint: "30s".to_string(),
        }
    }

    pub fn parse_endpoint(endpoint: &str) -> Result<Url> {
        let url = Url::parse(endpoint)
            .map_err(|e| ExtractError::InvalidEndpoint(format!("{}: {}", endpoint, e)))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ExtractError::InvalidEndpoint(format!(
                "unsupported scheme '{}' in {}",
                other, endpoint
            ))),
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_label_lang(mut self, lang: impl Into<String>) -> Self {
        self.label_lang = lang.into();
        self
    }

    pub fn with_query_delay(mut self, delay: Duration) -> Self {
        self.query_delay = delay;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_timeout_hint(mut self, hint: impl Into<String>) -> Self {
        self.timeout_hint = hint.into();
        self
    }

    pub fn into_shared(self) -> SharedConfig {
        Arc::new(Mutex::new(self))
    }
}
