//! Request structures and per-call configuration

use crate::error::{ConfigError, Result};
use crate::model::content::Content;
use crate::tools::Tool;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Sampling and length options for one generation call
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,

    /// Temperature for generation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Top-p sampling parameter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    /// Top-k sampling parameter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,

    /// Stop sequences
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,

    /// Number of candidates to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate_count: Option<u32>,
}

/// Configuration for the automatic tool-calling loop
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionCallingConfig {
    /// Disable automatic execution entirely
    ///
    /// The first response is returned as-is; requested calls are left to the
    /// caller to execute and resubmit.
    #[serde(default)]
    pub disable: bool,

    /// Total remote-call budget for one invocation, inclusive of the first
    /// call. Must be at least 1.
    pub maximum_remote_calls: u32,

    /// Skip retaining the per-turn transcript on the final response
    #[serde(default)]
    pub ignore_call_history: bool,
}

impl Default for FunctionCallingConfig {
    fn default() -> Self {
        Self {
            disable: false,
            maximum_remote_calls: 10,
            ignore_call_history: false,
        }
    }
}

impl FunctionCallingConfig {
    /// Check configuration invariants
    pub fn validate(&self) -> Result<()> {
        if self.maximum_remote_calls < 1 {
            return Err(ConfigError::InvalidValue {
                field: "maximum_remote_calls".to_string(),
                value: self.maximum_remote_calls.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// A caller-facing content generation request
///
/// Collects the conversation history, the tools in play and the per-call
/// configuration. Built once per call; the orchestration loop owns its own
/// copy of the history from there on.
#[derive(Clone, Default)]
pub struct GenerateContentRequest {
    /// Model to use; falls back to the client's default when absent
    pub model: Option<String>,

    /// Conversation history, oldest first
    pub contents: Vec<Content>,

    /// Tools available to the model
    pub tools: Vec<Arc<dyn Tool>>,

    /// Sampling options
    pub generation: Option<GenerationConfig>,

    /// Automatic tool-calling configuration
    pub function_calling: FunctionCallingConfig,
}

impl GenerateContentRequest {
    /// Create a request from existing conversation history
    pub fn new(contents: Vec<Content>) -> Self {
        Self {
            contents,
            ..Default::default()
        }
    }

    /// Create a request from a single user prompt
    pub fn from_text<S: Into<String>>(prompt: S) -> Self {
        Self::new(vec![Content::user(prompt)])
    }

    /// Set the model
    pub fn with_model<S: Into<String>>(mut self, model: S) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Add one tool
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    /// Add several tools
    pub fn with_tools<I>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Tool>>,
    {
        self.tools.extend(tools);
        self
    }

    /// Set sampling options
    pub fn with_generation(mut self, generation: GenerationConfig) -> Self {
        self.generation = Some(generation);
        self
    }

    /// Set the automatic tool-calling configuration
    pub fn with_function_calling(mut self, config: FunctionCallingConfig) -> Self {
        self.function_calling = config;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_calling_defaults() {
        let config = FunctionCallingConfig::default();
        assert!(!config.disable);
        assert_eq!(config.maximum_remote_calls, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_budget_is_invalid() {
        let config = FunctionCallingConfig {
            maximum_remote_calls: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_generation_config_serializes_camel_case() {
        let config = GenerationConfig {
            max_output_tokens: Some(1024),
            temperature: Some(0.5),
            ..Default::default()
        };
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["maxOutputTokens"], 1024);
        assert!(json.get("topP").is_none());
    }
}
