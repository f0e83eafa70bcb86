//! Client configuration

use crate::error::{ConfigError, Result};
use std::time::Duration;

/// Default service endpoint
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default API version path segment
pub const DEFAULT_API_VERSION: &str = "v1beta";

/// Default model used when a request does not name one
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Configuration for a [`crate::Client`]
///
/// Built once at client construction and immutable afterwards. The operating
/// mode (cooperative vs blocking) is not part of the configuration: it is
/// selected by constructing either `Client` or `blocking::Client`.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API key for authentication
    pub api_key: Option<String>,

    /// Base URL of the service
    pub base_url: String,

    /// API version path segment
    pub api_version: String,

    /// Model used when a request does not specify one
    pub default_model: String,

    /// Per-request timeout applied by the transport
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            timeout: None,
        }
    }
}

impl ClientConfig {
    /// Create a configuration with the given API key
    pub fn new<S: Into<String>>(api_key: S) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }

    /// Build a configuration from environment variables
    ///
    /// Reads `GENLOOP_API_KEY` (falling back to `GEMINI_API_KEY`), and the
    /// optional `GENLOOP_BASE_URL`, `GENLOOP_API_VERSION` and `GENLOOP_MODEL`
    /// overrides.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.api_key = std::env::var("GENLOOP_API_KEY")
            .or_else(|_| std::env::var("GEMINI_API_KEY"))
            .ok();
        if let Ok(base_url) = std::env::var("GENLOOP_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(api_version) = std::env::var("GENLOOP_API_VERSION") {
            config.api_version = api_version;
        }
        if let Ok(model) = std::env::var("GENLOOP_MODEL") {
            config.default_model = model;
        }
        config
    }

    /// Set the base URL
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the API version
    pub fn with_api_version<S: Into<String>>(mut self, api_version: S) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Set the default model
    pub fn with_default_model<S: Into<String>>(mut self, model: S) -> Self {
        self.default_model = model.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Return the configured API key or fail
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ConfigError::MissingApiKey.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api_version, DEFAULT_API_VERSION);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_require_api_key() {
        let config = ClientConfig::default();
        assert!(config.require_api_key().is_err());

        let config = ClientConfig::new("secret");
        assert_eq!(config.require_api_key().unwrap(), "secret");
    }

    #[test]
    fn test_builder_overrides() {
        let config = ClientConfig::new("k")
            .with_base_url("https://example.test")
            .with_default_model("other-model");
        assert_eq!(config.base_url, "https://example.test");
        assert_eq!(config.default_model, "other-model");
    }
}
