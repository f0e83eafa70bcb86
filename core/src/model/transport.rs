//! Transport trait: the single network-facing collaborator interface

use crate::error::Result;
use crate::model::content::Content;
use crate::model::request::GenerationConfig;
use crate::model::response::GenerateContentResponse;
use crate::tools::FunctionDeclaration;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

/// A finite, ordered sequence of response fragments
pub type ResponseStream = Pin<Box<dyn Stream<Item = Result<GenerateContentResponse>> + Send>>;

/// A fully resolved generation request at the transport boundary
///
/// Everything above the transport has already been applied: the model name
/// is concrete and the tool declarations are in emission order.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// Concrete model name
    pub model: String,

    /// Conversation history, oldest first
    pub contents: Vec<Content>,

    /// Tool declarations, in registration order
    pub tools: Vec<FunctionDeclaration>,

    /// Sampling options
    pub generation: Option<GenerationConfig>,
}

/// A page fetch request at the transport boundary
#[derive(Debug, Clone)]
pub struct ListRequest {
    /// Listed resource collection, e.g. `models`
    pub resource: String,

    /// Requested page size
    pub page_size: Option<u32>,

    /// Opaque cursor from a previous page, absent for the first page
    pub page_token: Option<String>,

    /// Server-side filter expression
    pub filter: Option<String>,
}

/// One fetched page of a listed resource
#[derive(Debug, Clone, Default)]
pub struct ListPage {
    /// Raw items of this page
    pub items: Vec<serde_json::Value>,

    /// Cursor for the next page; absent when no further pages exist
    pub next_page_token: Option<String>,
}

/// Trait for model-service transports
///
/// The only component that touches the network. Failures are opaque to the
/// rest of the crate and are propagated unchanged; retry policy, when any,
/// lives behind this interface.
#[async_trait]
pub trait ModelTransport: Send + Sync {
    /// Execute one buffered generation exchange
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateContentResponse>;

    /// Execute one streaming generation exchange
    async fn generate_stream(&self, request: GenerateRequest) -> Result<ResponseStream>;

    /// Fetch one page of a listed resource
    async fn list(&self, request: ListRequest) -> Result<ListPage>;
}
