//! # API Configuration Module
//!
//! Holds the static settings every outgoing request depends on: the API base
//! URL, the optional static API key header, the transport timeout and the
//! diagnostic flag.
//!
//! ## Overview
//!
//! Configuration is constructed through a builder that normalizes and
//! validates its inputs before the core is allowed to start: the base URL is
//! trimmed and stripped of its trailing slash, the API key is treated as
//! unset when blank, and the timeout has a sanity floor. Hosts can also load
//! the same settings from the process environment with
//! [`ApiConfig::from_env`].
//!
//! ## Usage
//!
//! ```
//! use core_runtime::config::ApiConfig;
//! use std::time::Duration;
//!
//! let config = ApiConfig::builder()
//!     .base_url("https://api.example.com/")
//!     .api_key("server-key")
//!     .timeout(Duration::from_secs(10))
//!     .debug(true)
//!     .build()
//!     .expect("Failed to build config");
//!
//! assert_eq!(config.base_url, "https://api.example.com");
//! ```

use crate::error::{Error, Result};
use std::time::Duration;

/// Default transport timeout applied when the host does not configure one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Minimum accepted transport timeout. Anything below this is almost
/// certainly a unit mistake (milliseconds passed as seconds or vice versa).
pub const MIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Environment variable names recognized by [`ApiConfig::from_env`].
pub const ENV_BASE_URL: &str = "RCC_BASE_URL";
pub const ENV_API_KEY: &str = "RCC_API_KEY";
pub const ENV_TIMEOUT_MS: &str = "RCC_TIMEOUT_MS";
pub const ENV_DEBUG: &str = "RCC_DEBUG";

/// Static configuration for the API client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL of the API server, normalized without a trailing slash
    pub base_url: String,

    /// Static API key attached as `x-api-key` when the server requires one
    pub api_key: Option<String>,

    /// Per-request transport timeout
    pub timeout: Duration,

    /// Emit a diagnostic log line for every outgoing request
    pub debug: bool,
}

impl ApiConfig {
    /// Creates a new builder for constructing an `ApiConfig`.
    pub fn builder() -> ApiConfigBuilder {
        ApiConfigBuilder::default()
    }

    /// Loads configuration from the process environment.
    ///
    /// Recognized variables: `RCC_BASE_URL` (required), `RCC_API_KEY`,
    /// `RCC_TIMEOUT_MS` and `RCC_DEBUG` (`1` or `true`).
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` when the base URL is missing or any value
    /// fails validation.
    pub fn from_env() -> Result<Self> {
        let mut builder = Self::builder();

        let base_url = std::env::var(ENV_BASE_URL)
            .map_err(|_| Error::Config(format!("{} is not set", ENV_BASE_URL)))?;
        builder = builder.base_url(base_url);

        if let Ok(api_key) = std::env::var(ENV_API_KEY) {
            builder = builder.api_key(api_key);
        }

        if let Ok(raw) = std::env::var(ENV_TIMEOUT_MS) {
            let millis: u64 = raw.trim().parse().map_err(|_| {
                Error::Config(format!("{} is not a number: \"{}\"", ENV_TIMEOUT_MS, raw))
            })?;
            builder = builder.timeout(Duration::from_millis(millis));
        }

        if let Ok(raw) = std::env::var(ENV_DEBUG) {
            let value = raw.trim();
            builder = builder.debug(value == "1" || value.eq_ignore_ascii_case("true"));
        }

        builder.build()
    }

    /// Joins the base URL with an endpoint path, ensuring exactly one slash
    /// between them.
    pub fn endpoint_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let path = path.trim_start_matches('/');
        format!("{}/{}", self.base_url, path)
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if !self.base_url.starts_with("http") {
            return Err(Error::Config(format!(
                "Base URL looks invalid: \"{}\". It must start with http(s)://.",
                self.base_url
            )));
        }

        if self.timeout < MIN_TIMEOUT {
            return Err(Error::Config(format!(
                "Timeout is too small: {} ms. Minimum is {} ms.",
                self.timeout.as_millis(),
                MIN_TIMEOUT.as_millis()
            )));
        }

        Ok(())
    }
}

/// Strip surrounding whitespace and the trailing slash from a base URL.
fn normalize_base_url(url: &str) -> String {
    let url = url.trim();
    url.strip_suffix('/').unwrap_or(url).to_string()
}

/// Builder for constructing [`ApiConfig`] instances.
#[derive(Default)]
pub struct ApiConfigBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    timeout: Option<Duration>,
    debug: bool,
}

impl ApiConfigBuilder {
    /// Sets the API base URL (required).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the static API key. A blank value is treated as unset.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the per-request transport timeout.
    ///
    /// Default: [`DEFAULT_TIMEOUT`]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Enables or disables request diagnostics.
    ///
    /// Default: false
    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    /// Builds the final `ApiConfig` instance.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` when the base URL is missing or validation
    /// fails.
    pub fn build(self) -> Result<ApiConfig> {
        let base_url = self.base_url.ok_or_else(|| {
            Error::Config("Base URL is required. Use .base_url() to set it.".to_string())
        })?;

        let api_key = self
            .api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        let config = ApiConfig {
            base_url: normalize_base_url(&base_url),
            api_key,
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            debug: self.debug,
        };

        config.validate()?;

        Ok(config)
    }
}
