//! Blocking client surface
//!
//! The second operating mode: identical semantics to the asynchronous
//! [`crate::Client`], with every network-touching operation blocking the
//! calling thread. The mode is selected by constructing this client; there
//! is no global flag. Internally a private current-thread runtime drives the
//! shared implementation, the same arrangement `reqwest::blocking` uses.

use crate::config::ClientConfig;
use crate::error::Result;
use crate::model::request::GenerateContentRequest;
use crate::model::response::{GenerateContentResponse, ModelInfo};
use crate::model::transport::ResponseStream;
use crate::pager::{ListConfig, PageFetcher, Pager};
use futures::StreamExt;
use std::sync::Arc;

/// Blocking client for a generative model service
pub struct Client {
    inner: crate::client::Client,
    runtime: Arc<tokio::runtime::Runtime>,
}

impl Client {
    /// Create a blocking client backed by the HTTP transport
    pub fn new(config: ClientConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self {
            inner: crate::client::Client::new(config)?,
            runtime: Arc::new(runtime),
        })
    }

    /// Wrap an existing asynchronous client
    pub fn from_async(inner: crate::client::Client) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self {
            inner,
            runtime: Arc::new(runtime),
        })
    }

    /// Generate content, executing requested tool calls automatically
    pub fn generate_content(
        &self,
        request: GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        self.runtime.block_on(self.inner.generate_content(request))
    }

    /// Generate content as a blocking fragment iterator
    pub fn generate_content_stream(
        &self,
        request: GenerateContentRequest,
    ) -> Result<ResponseIterator> {
        let stream = self
            .runtime
            .block_on(self.inner.generate_content_stream(request))?;
        Ok(ResponseIterator {
            stream,
            runtime: self.runtime.clone(),
        })
    }

    /// List available models with default options
    pub fn list_models(&self) -> Result<Pager<ModelInfo>> {
        self.list_models_with(ListConfig::default())
    }

    /// List available models, fetching the first page eagerly
    pub fn list_models_with(&self, config: ListConfig) -> Result<Pager<ModelInfo>> {
        let transport = self.inner.transport();
        let runtime = self.runtime.clone();
        let fetcher: PageFetcher =
            Arc::new(move |request| runtime.block_on(transport.list(request)));
        let mut pager = Pager::new("models", config, fetcher);
        pager.next_page()?;
        Ok(pager)
    }
}

/// Blocking iterator over a streamed response
///
/// Finite and non-restartable, like the stream it wraps. Dropping it mid
/// iteration cancels the underlying stream at its next suspension point.
pub struct ResponseIterator {
    stream: ResponseStream,
    runtime: Arc<tokio::runtime::Runtime>,
}

impl Iterator for ResponseIterator {
    type Item = Result<GenerateContentResponse>;

    fn next(&mut self) -> Option<Self::Item> {
        self.runtime.block_on(self.stream.next())
    }
}
