//! Conversation content structures

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role of a content producer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Caller-supplied input
    User,

    /// Model output
    Model,

    /// Locally executed tool results
    Tool,
}

/// A function call requested by the model
///
/// Only ever produced by the model collaborator, never constructed by
/// client code outside of tests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionCall {
    /// Name of the function to call
    pub name: String,

    /// Named arguments as a JSON object
    pub args: serde_json::Map<String, Value>,
}

impl FunctionCall {
    /// Create a new function call
    pub fn new<S: Into<String>>(name: S, args: serde_json::Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

/// The structured result of executing a function call
///
/// Carries exactly one of a success payload or an error message. The
/// constructors are the only way the exclusivity is established; the loop
/// sends either outcome back to the model rather than unwinding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionResponse {
    /// Name of the function this responds to
    pub name: String,

    /// Success payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<serde_json::Map<String, Value>>,

    /// Error message, when the invocation failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FunctionResponse {
    /// Create a successful response wrapping the returned value
    pub fn success<S: Into<String>>(name: S, value: Value) -> Self {
        let mut response = serde_json::Map::new();
        response.insert("result".to_string(), value);
        Self {
            name: name.into(),
            response: Some(response),
            error: None,
        }
    }

    /// Create an error response
    pub fn error<S: Into<String>, M: Into<String>>(name: S, message: M) -> Self {
        Self {
            name: name.into(),
            response: None,
            error: Some(message.into()),
        }
    }

    /// Whether this response carries an error
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// A block of content within a message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Part {
    /// Text content
    Text { text: String },

    /// A function call requested by the model
    FunctionCall { call: FunctionCall },

    /// The result of a locally executed function call
    FunctionResponse { response: FunctionResponse },

    /// Inline binary data
    InlineData {
        /// MIME type of the data
        mime_type: String,
        /// Data, base64 encoded
        data: String,
    },
}

impl Part {
    /// Create a text part
    pub fn text<S: Into<String>>(text: S) -> Self {
        Part::Text { text: text.into() }
    }

    /// Create a function call part
    pub fn function_call<S: Into<String>>(name: S, args: serde_json::Map<String, Value>) -> Self {
        Part::FunctionCall {
            call: FunctionCall::new(name, args),
        }
    }

    /// Create a function response part
    pub fn function_response(response: FunctionResponse) -> Self {
        Part::FunctionResponse { response }
    }

    /// Create an inline data part from raw bytes
    pub fn inline_bytes<S: Into<String>>(mime_type: S, data: &[u8]) -> Self {
        use base64::Engine;
        Part::InlineData {
            mime_type: mime_type.into(),
            data: base64::engine::general_purpose::STANDARD.encode(data),
        }
    }

    /// Text of this part, if it is a text part
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text { text } => Some(text),
            _ => None,
        }
    }

    /// Whether this part is a text part
    pub fn is_text(&self) -> bool {
        matches!(self, Part::Text { .. })
    }
}

/// One message in a conversation: a role plus an ordered part sequence
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Content {
    /// Role of the producer
    pub role: Role,

    /// Ordered parts
    pub parts: Vec<Part>,
}

impl Content {
    /// Create content with the given role and parts
    pub fn new(role: Role, parts: Vec<Part>) -> Self {
        Self { role, parts }
    }

    /// Create a user message from text
    pub fn user<S: Into<String>>(text: S) -> Self {
        Self::new(Role::User, vec![Part::text(text)])
    }

    /// Create a model message from text
    pub fn model<S: Into<String>>(text: S) -> Self {
        Self::new(Role::Model, vec![Part::text(text)])
    }

    /// Create a tool message from an ordered sequence of function responses
    pub fn tool(responses: Vec<FunctionResponse>) -> Self {
        Self::new(
            Role::Tool,
            responses.into_iter().map(Part::function_response).collect(),
        )
    }

    /// Concatenated text of all text parts, if any
    pub fn text(&self) -> Option<String> {
        let mut out = String::new();
        let mut found = false;
        for part in &self.parts {
            if let Part::Text { text } = part {
                out.push_str(text);
                found = true;
            }
        }
        found.then_some(out)
    }

    /// All function call parts, in order
    pub fn function_calls(&self) -> Vec<&FunctionCall> {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::FunctionCall { call } => Some(call),
                _ => None,
            })
            .collect()
    }

    /// Whether this content contains any function call parts
    pub fn has_function_calls(&self) -> bool {
        self.parts
            .iter()
            .any(|part| matches!(part, Part::FunctionCall { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_concatenates_parts() {
        let content = Content::new(
            Role::Model,
            vec![Part::text("The "), Part::text("sky is blue.")],
        );
        assert_eq!(content.text().as_deref(), Some("The sky is blue."));
    }

    #[test]
    fn test_function_calls_in_order() {
        let mut args = serde_json::Map::new();
        args.insert("location".to_string(), json!("Boston"));
        let content = Content::new(
            Role::Model,
            vec![
                Part::function_call("get_current_weather", args.clone()),
                Part::text("also some text"),
                Part::function_call("get_time", serde_json::Map::new()),
            ],
        );

        let calls = content.function_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].name, "get_current_weather");
        assert_eq!(calls[1].name, "get_time");
        assert!(content.has_function_calls());
    }

    #[test]
    fn test_part_serde_round_trip() {
        let part = Part::function_call("echo", serde_json::Map::new());
        let json = serde_json::to_string(&part).unwrap();
        assert!(json.contains("\"type\":\"function_call\""));
        let back: Part = serde_json::from_str(&json).unwrap();
        assert_eq!(back, part);
    }

    #[test]
    fn test_function_response_exclusivity() {
        let ok = FunctionResponse::success("f", json!("sunny"));
        assert!(!ok.is_error());
        assert_eq!(ok.response.unwrap()["result"], json!("sunny"));

        let err = FunctionResponse::error("f", "boom");
        assert!(err.is_error());
        assert!(err.response.is_none());
    }
}
