//! CLI configuration loader
//!
//! Single-source priority loading with flag overrides:
//! 1. --config file (highest priority)
//! 2. Current working directory: ./genloop.json
//! 3. XDG config: ~/.config/genloop/config.json
//! 4. Environment variables only (no files)

use anyhow::{Context, Result};
use genloop_core::ClientConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Raw configuration file format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawConfig {
    /// API key (can be "env:VAR_NAME" for an environment variable)
    pub api_key: Option<String>,

    /// Base URL (optional, uses the service default if not specified)
    pub base_url: Option<String>,

    /// API version (optional)
    pub api_version: Option<String>,

    /// Default model name
    pub model: Option<String>,
}

/// CLI configuration loader
#[derive(Default)]
pub struct CliConfigLoader {
    config_override: Option<PathBuf>,
    api_key_override: Option<String>,
    base_url_override: Option<String>,
    model_override: Option<String>,
}

impl CliConfigLoader {
    /// Create a new loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the config file override
    pub fn with_config_override(mut self, path: Option<PathBuf>) -> Self {
        self.config_override = path;
        self
    }

    /// Set the API key override
    pub fn with_api_key_override(mut self, api_key: Option<String>) -> Self {
        self.api_key_override = api_key;
        self
    }

    /// Set the base URL override
    pub fn with_base_url_override(mut self, base_url: Option<String>) -> Self {
        self.base_url_override = base_url;
        self
    }

    /// Set the model override
    pub fn with_model_override(mut self, model: Option<String>) -> Self {
        self.model_override = model;
        self
    }

    /// Load and resolve the client configuration
    pub fn load(&self) -> Result<ClientConfig> {
        let raw = if let Some(path) = &self.config_override {
            Some(self.load_from_path(path).with_context(|| {
                format!("Failed to load config from {}", path.display())
            })?)
        } else {
            self.find_config()?
        };

        // Start from the environment, then layer file values and flag
        // overrides on top.
        let mut config = ClientConfig::from_env();
        if let Some(raw) = raw {
            if let Some(api_key) = raw.api_key {
                config.api_key = Some(resolve_api_key(&api_key)?);
            }
            if let Some(base_url) = raw.base_url {
                config.base_url = base_url;
            }
            if let Some(api_version) = raw.api_version {
                config.api_version = api_version;
            }
            if let Some(model) = raw.model {
                config.default_model = model;
            }
        }

        if let Some(api_key) = &self.api_key_override {
            config.api_key = Some(api_key.clone());
        }
        if let Some(base_url) = &self.base_url_override {
            config.base_url = base_url.clone();
        }
        if let Some(model) = &self.model_override {
            config.default_model = model.clone();
        }

        Ok(config)
    }

    fn find_config(&self) -> Result<Option<RawConfig>> {
        let mut candidates = vec![PathBuf::from("genloop.json")];
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join("genloop").join("config.json"));
        }

        for candidate in candidates {
            if candidate.is_file() {
                tracing::debug!(path = %candidate.display(), "loading configuration file");
                return Ok(Some(self.load_from_path(&candidate)?));
            }
        }
        Ok(None)
    }

    fn load_from_path(&self, path: &Path) -> Result<RawConfig> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Invalid configuration in {}", path.display()))
    }
}

/// Resolve an `env:VAR_NAME` reference to its value
fn resolve_api_key(raw: &str) -> Result<String> {
    if let Some(variable) = raw.strip_prefix("env:") {
        std::env::var(variable)
            .with_context(|| format!("Environment variable {} is not set", variable))
    } else {
        Ok(raw.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_plain_api_key() {
        assert_eq!(resolve_api_key("abc123").unwrap(), "abc123");
    }

    #[test]
    fn test_resolve_env_api_key() {
        std::env::set_var("GENLOOP_TEST_KEY", "from-env");
        assert_eq!(resolve_api_key("env:GENLOOP_TEST_KEY").unwrap(), "from-env");
        std::env::remove_var("GENLOOP_TEST_KEY");
    }

    #[test]
    fn test_flag_overrides_win() {
        let loader = CliConfigLoader::new()
            .with_api_key_override(Some("flag-key".to_string()))
            .with_model_override(Some("flag-model".to_string()));
        let config = loader.load().unwrap();
        assert_eq!(config.api_key.as_deref(), Some("flag-key"));
        assert_eq!(config.default_model, "flag-model");
    }
}
