//! HTTP transport implementation
//!
//! Wire marshaling lives here and nowhere else: the camelCase wire structs
//! below are converted to and from the crate's own content types at this
//! boundary. Failures surface as opaque transport errors; no retries.

use crate::config::ClientConfig;
use crate::error::{Result, TransportError};
use crate::model::content::{Content, FunctionCall, FunctionResponse, Part, Role};
use crate::model::request::GenerationConfig;
use crate::model::response::{Candidate, FinishReason, GenerateContentResponse, Usage};
use crate::model::transport::{GenerateRequest, ListPage, ListRequest, ModelTransport, ResponseStream};
use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// reqwest-backed transport
pub struct HttpTransport {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    api_version: String,
}

impl HttpTransport {
    /// Create a transport from a client configuration
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let api_key = config.require_api_key()?.to_string();
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(TransportError::from)?;
        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
        })
    }

    fn generate_url(&self, model: &str, streaming: bool) -> String {
        // Accept both bare names and full `models/...` resource names.
        let model = model.strip_prefix("models/").unwrap_or(model);
        let method = if streaming {
            "streamGenerateContent"
        } else {
            "generateContent"
        };
        let mut url = format!(
            "{}/{}/models/{}:{}",
            self.base_url, self.api_version, model, method
        );
        if streaming {
            url.push_str("?alt=sse");
        }
        url
    }

    fn list_url(&self, request: &ListRequest) -> Result<String> {
        let raw = format!("{}/{}/{}", self.base_url, self.api_version, request.resource);
        let mut url = url::Url::parse(&raw).map_err(|e| TransportError::Network {
            message: format!("invalid list URL '{}': {}", raw, e),
        })?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(page_size) = request.page_size {
                query.append_pair("pageSize", &page_size.to_string());
            }
            if let Some(page_token) = &request.page_token {
                query.append_pair("pageToken", page_token);
            }
            if let Some(filter) = &request.filter {
                query.append_pair("filter", filter);
            }
        }
        Ok(url.into())
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let response = builder
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| TransportError::Network {
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(TransportError::Api { status, message }.into());
        }
        Ok(response)
    }
}

#[async_trait]
impl ModelTransport for HttpTransport {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateContentResponse> {
        let request_id = Uuid::new_v4();
        tracing::debug!(%request_id, model = %request.model, "sending generate request");

        let url = self.generate_url(&request.model, false);
        let wire = build_wire_request(&request);
        let response = self.send(self.client.post(&url).json(&wire)).await?;

        let body: WireResponse = response.json().await.map_err(|e| TransportError::Decode {
            message: format!("failed to parse response: {}", e),
        })?;
        Ok(body.into_response())
    }

    async fn generate_stream(&self, request: GenerateRequest) -> Result<ResponseStream> {
        let request_id = Uuid::new_v4();
        tracing::debug!(%request_id, model = %request.model, "sending streaming generate request");

        let url = self.generate_url(&request.model, true);
        let wire = build_wire_request(&request);
        let response = self.send(self.client.post(&url).json(&wire)).await?;

        let stream = async_stream::try_stream! {
            let mut decoder = SseDecoder::default();
            let mut bytes = response.bytes_stream();
            while let Some(chunk) = bytes.next().await {
                let chunk = chunk.map_err(|e| TransportError::Network {
                    message: e.to_string(),
                })?;
                for payload in decoder.push(&chunk) {
                    let wire: WireResponse =
                        serde_json::from_str(&payload).map_err(|e| TransportError::Decode {
                            message: format!("failed to parse stream fragment: {}", e),
                        })?;
                    yield wire.into_response();
                }
            }
        };
        Ok(Box::pin(stream))
    }

    async fn list(&self, request: ListRequest) -> Result<ListPage> {
        let url = self.list_url(&request)?;
        tracing::debug!(resource = %request.resource, "sending list request");
        let response = self.send(self.client.get(&url)).await?;

        let body: Value = response.json().await.map_err(|e| TransportError::Decode {
            message: format!("failed to parse list response: {}", e),
        })?;
        let items = body
            .get(request.resource.as_str())
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let next_page_token = body
            .get("nextPageToken")
            .and_then(Value::as_str)
            .map(String::from);
        Ok(ListPage {
            items,
            next_page_token,
        })
    }
}

/// Incremental decoder for `data:` lines in an SSE byte stream
///
/// Payloads may be split across arbitrary chunk boundaries; only complete
/// lines are emitted.
#[derive(Default)]
struct SseDecoder {
    buffer: String,
}

impl SseDecoder {
    fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.push_str(&String::from_utf8_lossy(chunk));
        let mut payloads = Vec::new();
        while let Some(position) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=position).collect();
            let line = line.trim();
            if let Some(data) = line.strip_prefix("data:") {
                let data = data.trim();
                if !data.is_empty() && data != "[DONE]" {
                    payloads.push(data.to_string());
                }
            }
        }
        payloads
    }
}

// ---------------------------------------------------------------------------
// Wire structures
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireRequest<'a> {
    contents: Vec<WireContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<&'a GenerationConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireTool {
    function_declarations: Vec<WireFunctionDeclaration>,
}

#[derive(Debug, Serialize)]
struct WireFunctionDeclaration {
    name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    description: String,
    parameters: Value,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct WireContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<WirePart>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct WirePart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<WireBlob>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_call: Option<WireFunctionCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_response: Option<WireFunctionResponse>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct WireBlob {
    mime_type: String,
    data: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct WireFunctionCall {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    args: Option<Value>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct WireFunctionResponse {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    response: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct WireResponse {
    candidates: Vec<WireCandidate>,
    usage_metadata: Option<WireUsage>,
    model_version: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct WireCandidate {
    content: Option<WireContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct WireUsage {
    prompt_token_count: u32,
    candidates_token_count: u32,
    total_token_count: u32,
}

fn build_wire_request<'a>(request: &'a GenerateRequest) -> WireRequest<'a> {
    let tools = if request.tools.is_empty() {
        Vec::new()
    } else {
        vec![WireTool {
            function_declarations: request
                .tools
                .iter()
                .map(|declaration| WireFunctionDeclaration {
                    name: declaration.name.clone(),
                    description: declaration.description.clone(),
                    parameters: declaration.parameters.to_json_value(),
                })
                .collect(),
        }]
    };
    WireRequest {
        contents: request.contents.iter().map(content_to_wire).collect(),
        tools,
        generation_config: request.generation.as_ref(),
    }
}

fn content_to_wire(content: &Content) -> WireContent {
    let role = match content.role {
        Role::User => "user",
        Role::Model => "model",
        Role::Tool => "tool",
    };
    WireContent {
        role: Some(role.to_string()),
        parts: content.parts.iter().map(part_to_wire).collect(),
    }
}

fn part_to_wire(part: &Part) -> WirePart {
    let mut wire = WirePart::default();
    match part {
        Part::Text { text } => wire.text = Some(text.clone()),
        Part::InlineData { mime_type, data } => {
            wire.inline_data = Some(WireBlob {
                mime_type: mime_type.clone(),
                data: data.clone(),
            });
        }
        Part::FunctionCall { call } => {
            wire.function_call = Some(WireFunctionCall {
                name: call.name.clone(),
                args: Some(Value::Object(call.args.clone())),
            });
        }
        Part::FunctionResponse { response } => {
            let payload = match (&response.response, &response.error) {
                (Some(map), _) => Value::Object(map.clone()),
                (None, Some(error)) => serde_json::json!({ "error": error }),
                (None, None) => Value::Object(serde_json::Map::new()),
            };
            wire.function_response = Some(WireFunctionResponse {
                name: response.name.clone(),
                response: Some(payload),
            });
        }
    }
    wire
}

fn wire_to_part(wire: WirePart) -> Option<Part> {
    if let Some(text) = wire.text {
        return Some(Part::Text { text });
    }
    if let Some(blob) = wire.inline_data {
        return Some(Part::InlineData {
            mime_type: blob.mime_type,
            data: blob.data,
        });
    }
    if let Some(call) = wire.function_call {
        let args = match call.args {
            Some(Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        };
        return Some(Part::FunctionCall {
            call: FunctionCall::new(call.name, args),
        });
    }
    if let Some(response) = wire.function_response {
        let payload = match response.response {
            Some(Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        };
        return Some(Part::FunctionResponse {
            response: FunctionResponse {
                name: response.name,
                response: Some(payload),
                error: None,
            },
        });
    }
    None
}

fn wire_to_content(wire: WireContent) -> Content {
    let role = match wire.role.as_deref() {
        Some("user") => Role::User,
        Some("tool") => Role::Tool,
        _ => Role::Model,
    };
    Content::new(role, wire.parts.into_iter().filter_map(wire_to_part).collect())
}

fn parse_finish_reason(reason: &str) -> FinishReason {
    match reason {
        "STOP" => FinishReason::Stop,
        "MAX_TOKENS" => FinishReason::Length,
        "SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" => {
            FinishReason::ContentFilter
        }
        other => FinishReason::Other(other.to_string()),
    }
}

impl WireCandidate {
    fn into_candidate(self) -> Candidate {
        let content = self
            .content
            .map(wire_to_content)
            .unwrap_or_else(|| Content::new(Role::Model, Vec::new()));
        Candidate {
            content,
            finish_reason: self.finish_reason.as_deref().map(parse_finish_reason),
            metadata: None,
        }
    }
}

impl WireResponse {
    fn into_response(self) -> GenerateContentResponse {
        GenerateContentResponse {
            candidates: self
                .candidates
                .into_iter()
                .map(WireCandidate::into_candidate)
                .collect(),
            usage: self.usage_metadata.map(|usage| Usage {
                prompt_tokens: usage.prompt_token_count,
                completion_tokens: usage.candidates_token_count,
                total_tokens: usage.total_token_count,
            }),
            model: self.model_version,
            call_history: Vec::new(),
        }
    }
}
