//! Asynchronous client surface

use crate::config::ClientConfig;
use crate::error::Result;
use crate::model::http::HttpTransport;
use crate::model::request::GenerateContentRequest;
use crate::model::response::{GenerateContentResponse, ModelInfo};
use crate::model::transport::{ModelTransport, ResponseStream};
use crate::orchestrator::ConversationLoop;
use crate::pager::{AsyncPageFetcher, AsyncPager, ListConfig};
use crate::tools::ToolRegistry;
use std::sync::Arc;

/// Asynchronous client for a generative model service
///
/// The cooperative operating mode: every network-touching operation is an
/// await point. The blocking mode lives in [`crate::blocking`]; both share
/// this implementation through the transport capability.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn ModelTransport>,
    config: ClientConfig,
}

impl Client {
    /// Create a client backed by the HTTP transport
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(&config)?);
        Ok(Self { transport, config })
    }

    /// Create a client over a custom transport
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn ModelTransport>) -> Self {
        Self { transport, config }
    }

    /// The client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn transport(&self) -> Arc<dyn ModelTransport> {
        self.transport.clone()
    }

    fn conversation(&self, request: &GenerateContentRequest) -> Result<(ConversationLoop, String)> {
        let model = request
            .model
            .clone()
            .unwrap_or_else(|| self.config.default_model.clone());
        let registry = Arc::new(ToolRegistry::from_tools(request.tools.iter().cloned())?);
        let conversation = ConversationLoop::new(
            self.transport.clone(),
            registry,
            request.function_calling.clone(),
        )?;
        Ok((conversation, model))
    }

    /// Generate content, executing requested tool calls automatically
    pub async fn generate_content(
        &self,
        request: GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let (conversation, model) = self.conversation(&request)?;
        conversation
            .run(&model, request.contents, request.generation)
            .await
    }

    /// Generate content as a lazy, finite, non-restartable fragment stream
    pub async fn generate_content_stream(
        &self,
        request: GenerateContentRequest,
    ) -> Result<ResponseStream> {
        let (conversation, model) = self.conversation(&request)?;
        Ok(conversation.run_stream(model, request.contents, request.generation))
    }

    /// List available models with default options
    pub async fn list_models(&self) -> Result<AsyncPager<ModelInfo>> {
        self.list_models_with(ListConfig::default()).await
    }

    /// List available models, fetching the first page eagerly
    pub async fn list_models_with(&self, config: ListConfig) -> Result<AsyncPager<ModelInfo>> {
        let transport = self.transport.clone();
        let fetcher: AsyncPageFetcher = Arc::new(move |request| {
            let transport = transport.clone();
            Box::pin(async move { transport.list(request).await })
        });
        let mut pager = AsyncPager::new("models", config, fetcher);
        pager.next_page().await?;
        Ok(pager)
    }
}
