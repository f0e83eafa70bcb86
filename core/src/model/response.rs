//! Response structures

use crate::model::content::{Content, FunctionCall};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Reason why generation finished
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Generation completed naturally
    Stop,

    /// Hit the maximum token limit
    Length,

    /// Model decided to call a tool
    ToolCalls,

    /// Content was filtered
    ContentFilter,

    /// Other reason
    Other(String),
}

/// Usage statistics for a request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Usage {
    /// Number of tokens in the prompt
    pub prompt_tokens: u32,

    /// Number of tokens in the completion
    pub completion_tokens: u32,

    /// Total number of tokens
    pub total_tokens: u32,
}

/// One generated response candidate
///
/// Candidates are identified by their position in the response, not by any
/// identity of their own.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    /// The generated content
    pub content: Content,

    /// Why generation stopped for this candidate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,

    /// Accumulated metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

impl Candidate {
    /// Create a candidate from content alone
    pub fn new(content: Content) -> Self {
        Self {
            content,
            finish_reason: None,
            metadata: None,
        }
    }
}

/// A logical response from the model
///
/// In streaming mode this is also the fragment type: each fragment is a
/// partial response that the aggregator folds into a merged whole.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GenerateContentResponse {
    /// Candidates, indexed by position
    pub candidates: Vec<Candidate>,

    /// Usage statistics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,

    /// Model that produced this response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Transcript of the conversation accumulated across automatic
    /// tool-calling turns, for inspection and debugging
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub call_history: Vec<Content>,
}

impl GenerateContentResponse {
    /// Create a response holding a single candidate
    pub fn from_candidate(candidate: Candidate) -> Self {
        Self {
            candidates: vec![candidate],
            ..Default::default()
        }
    }

    /// Concatenated text of the first candidate
    pub fn text(&self) -> Option<String> {
        self.candidates.first().and_then(|c| c.content.text())
    }

    /// Function calls requested by the first candidate, in order
    pub fn function_calls(&self) -> Vec<&FunctionCall> {
        self.candidates
            .first()
            .map(|c| c.content.function_calls())
            .unwrap_or_default()
    }
}

/// Metadata for one listed model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    /// Resource name, e.g. `models/gemini-2.0-flash`
    pub name: String,

    /// Human readable name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Description of the model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Maximum number of input tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_token_limit: Option<u32>,

    /// Maximum number of output tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_token_limit: Option<u32>,

    /// When the model was created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,

    /// When the model was last updated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<DateTime<Utc>>,
}
