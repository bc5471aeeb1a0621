//! Client configuration.
//!
//! Everything here is fixed at construction and shared read-only by every
//! request: the panel's origin, the static API key sent verbatim as the
//! `Authorization` header, and an optional request timeout. There is no
//! default timeout; callers who want one must set it.

use std::fmt;
use std::time::Duration;

use reqwest::header::HeaderValue;

use crate::error::ApiError;

pub const ENV_URL: &str = "EASYPANEL_URL";
pub const ENV_API_KEY: &str = "EASYPANEL_API_KEY";
pub const ENV_TIMEOUT_SECS: &str = "EASYPANEL_TIMEOUT_SECS";

#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Origin of the panel, e.g. `https://panel.example.com`. A trailing
    /// `/` is ignored.
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            timeout: None,
        }
    }

    /// An empty key means "no key".
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let api_key = api_key.into();
        self.api_key = (!api_key.is_empty()).then_some(api_key);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Read `EASYPANEL_URL`, `EASYPANEL_API_KEY` and `EASYPANEL_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like `from_env`, with variables supplied by `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let base_url = lookup(ENV_URL)
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ApiError::Config(format!("{ENV_URL} is not set")))?;
        let mut config = Self::new(base_url.trim());
        if let Some(api_key) = lookup(ENV_API_KEY) {
            config = config.with_api_key(api_key);
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|_| {
                    ApiError::Config(format!(
                        "{ENV_TIMEOUT_SECS} must be a whole number of seconds, got {raw:?}"
                    ))
                })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config.validate()?;
        Ok(config)
    }

    /// Check the base URL is an absolute http(s) origin and the API key is a
    /// legal header value.
    pub fn validate(&self) -> Result<(), ApiError> {
        let url = url::Url::parse(&self.base_url)
            .map_err(|e| ApiError::Config(format!("base url {:?}: {e}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ApiError::Config(format!(
                "base url {:?} must use http or https",
                self.base_url
            )));
        }
        if let Some(api_key) = &self.api_key {
            HeaderValue::from_str(api_key)
                .map_err(|_| ApiError::Config("api key is not a valid header value".to_string()))?;
        }
        if self.timeout == Some(Duration::ZERO) {
            return Err(ApiError::Config("timeout must be greater than zero".to_string()));
        }
        Ok(())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}
