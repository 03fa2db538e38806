//! Store configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use crate::error::ErrorCode;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Configuration errors. Raised once at startup, never per request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} is set but empty")]
    EmptyApiUrl { var: &'static str },
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyApiUrl { .. } => "E_CONFIG_API_URL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl StoreTimeouts {
    /// HTTP client honoring these timeouts. In the browser, fetch manages its own limits.
    pub(crate) fn client(&self) -> reqwest::Result<reqwest::Client> {
        let builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder
            .timeout(std::time::Duration::from_secs(self.request_secs))
            .connect_timeout(std::time::Duration::from_secs(self.connect_secs));
        builder.build()
    }
}

impl Default for StoreTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

/// Where the annotation store lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Base URL without a trailing slash.
    pub api_url: String,
    pub timeouts: StoreTimeouts,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { api_url: DEFAULT_API_URL.to_owned(), timeouts: StoreTimeouts::default() }
    }
}

impl StoreConfig {
    /// Config for a store at `api_url` with default timeouts.
    #[must_use]
    pub fn with_api_url(api_url: &str) -> Self {
        Self { api_url: api_url.trim_end_matches('/').to_owned(), timeouts: StoreTimeouts::default() }
    }

    /// Build typed store config from environment variables.
    ///
    /// Optional:
    /// - `LABELCANVAS_API_URL`: default `http://localhost:8000`
    /// - `LABELCANVAS_REQUEST_TIMEOUT_SECS`: default 30
    /// - `LABELCANVAS_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyApiUrl`] when the URL variable is set to an
    /// empty (or all-slash) value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = match std::env::var("LABELCANVAS_API_URL") {
            Ok(raw) => {
                let trimmed = raw.trim().trim_end_matches('/');
                if trimmed.is_empty() {
                    return Err(ConfigError::EmptyApiUrl { var: "LABELCANVAS_API_URL" });
                }
                trimmed.to_owned()
            }
            Err(_) => DEFAULT_API_URL.to_owned(),
        };
        let timeouts = StoreTimeouts {
            request_secs: env_parse("LABELCANVAS_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse("LABELCANVAS_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        Ok(Self { api_url, timeouts })
    }
}

/// Parse `key` as `T`, falling back to `default` when unset or malformed.
pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}
