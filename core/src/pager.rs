//! Cursor-based pagination
//!
//! [`AsyncPager`] and [`Pager`] share the same semantics over any "list"
//! style endpoint: one buffered page at a time, an opaque cursor, and an
//! explicit exhaustion signal. The only difference is whether the page fetch
//! is an await point or a blocking call. Instances assume single-writer
//! access; iterating consumes items and is not restartable — listing again
//! requires constructing a new pager from the original request.

use crate::error::{Error, PagerError, Result};
use crate::model::transport::{ListPage, ListRequest};
use futures::future::BoxFuture;
use futures::Stream;
use serde::de::DeserializeOwned;
use std::pin::Pin;
use std::sync::Arc;

/// Immutable listing options, fixed at pager construction
#[derive(Debug, Clone, Default)]
pub struct ListConfig {
    /// Requested page size; the service may return fewer items
    pub page_size: Option<u32>,

    /// Server-side filter expression
    pub filter: Option<String>,
}

impl ListConfig {
    /// Create a config with the given page size
    pub fn with_page_size(page_size: u32) -> Self {
        Self {
            page_size: Some(page_size),
            ..Default::default()
        }
    }
}

/// Asynchronous page fetch operation
pub type AsyncPageFetcher =
    Arc<dyn Fn(ListRequest) -> BoxFuture<'static, Result<ListPage>> + Send + Sync>;

/// Blocking page fetch operation
pub type PageFetcher = Arc<dyn Fn(ListRequest) -> Result<ListPage> + Send + Sync>;

/// Asynchronous cursor-driven iterator over a listed resource
pub struct AsyncPager<T> {
    resource: String,
    config: ListConfig,
    fetcher: AsyncPageFetcher,
    page: Vec<T>,
    offset: usize,
    page_token: Option<String>,
    started: bool,
}

impl<T: DeserializeOwned> AsyncPager<T> {
    /// Create a pager; no fetch happens until the first page is requested
    pub fn new<S: Into<String>>(resource: S, config: ListConfig, fetcher: AsyncPageFetcher) -> Self {
        Self {
            resource: resource.into(),
            config,
            fetcher,
            page: Vec::new(),
            offset: 0,
            page_token: None,
            started: false,
        }
    }

    /// Name of the listed resource
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// The currently buffered page
    pub fn page(&self) -> &[T] {
        &self.page
    }

    /// Page size fixed at construction
    pub fn page_size(&self) -> Option<u32> {
        self.config.page_size
    }

    fn request(&self) -> ListRequest {
        ListRequest {
            resource: self.resource.clone(),
            page_size: self.config.page_size,
            page_token: self.page_token.clone(),
            filter: self.config.filter.clone(),
        }
    }

    fn ingest(&mut self, fetched: ListPage) -> Result<()> {
        self.offset += self.page.len();
        self.page = fetched
            .items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(Error::from))
            .collect::<Result<Vec<T>>>()?;
        self.page_token = fetched.next_page_token;
        self.started = true;
        Ok(())
    }

    async fn fetch_next(&mut self) -> Result<()> {
        if self.started && self.page_token.is_none() {
            return Err(PagerError::Exhausted.into());
        }
        tracing::debug!(resource = %self.resource, "fetching next page");
        let fetched = (self.fetcher)(self.request()).await?;
        self.ingest(fetched)
    }

    /// Discard the buffered page and fetch the next one
    ///
    /// Fails with the exhausted condition when no cursor remains.
    pub async fn next_page(&mut self) -> Result<&[T]> {
        self.fetch_next().await?;
        Ok(&self.page)
    }

    /// Get the item at a zero-based global index across all pages
    ///
    /// Fetches forward until the index is covered or the cursor is
    /// exhausted; an index outside what the cursor can still cover is out of
    /// range.
    pub async fn get(&mut self, index: usize) -> Result<&T> {
        if !self.started {
            self.fetch_next().await?;
        }
        while index >= self.offset + self.page.len() && self.page_token.is_some() {
            self.fetch_next().await?;
        }
        let total = self.offset + self.page.len();
        if index < self.offset || index >= total {
            return Err(PagerError::OutOfRange { index, total }.into());
        }
        Ok(&self.page[index - self.offset])
    }

    /// Consume the pager into a lazy stream over all remaining items
    pub fn into_stream(mut self) -> Pin<Box<dyn Stream<Item = Result<T>> + Send>>
    where
        T: Send + 'static,
    {
        Box::pin(async_stream::try_stream! {
            if !self.started {
                self.fetch_next().await?;
            }
            loop {
                let items = std::mem::take(&mut self.page);
                self.offset += items.len();
                for item in items {
                    yield item;
                }
                if self.page_token.is_none() {
                    break;
                }
                self.fetch_next().await?;
            }
        })
    }
}

/// Blocking cursor-driven iterator over a listed resource
///
/// Identical semantics to [`AsyncPager`]; the fetch operation blocks the
/// calling thread instead of suspending.
pub struct Pager<T> {
    resource: String,
    config: ListConfig,
    fetcher: PageFetcher,
    page: Vec<T>,
    offset: usize,
    cursor: usize,
    page_token: Option<String>,
    started: bool,
}

impl<T: DeserializeOwned> Pager<T> {
    /// Create a pager; no fetch happens until the first page is requested
    pub fn new<S: Into<String>>(resource: S, config: ListConfig, fetcher: PageFetcher) -> Self {
        Self {
            resource: resource.into(),
            config,
            fetcher,
            page: Vec::new(),
            offset: 0,
            cursor: 0,
            page_token: None,
            started: false,
        }
    }

    /// Name of the listed resource
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// The currently buffered page
    pub fn page(&self) -> &[T] {
        &self.page
    }

    /// Page size fixed at construction
    pub fn page_size(&self) -> Option<u32> {
        self.config.page_size
    }

    fn fetch_next(&mut self) -> Result<()> {
        if self.started && self.page_token.is_none() {
            return Err(PagerError::Exhausted.into());
        }
        tracing::debug!(resource = %self.resource, "fetching next page");
        let request = ListRequest {
            resource: self.resource.clone(),
            page_size: self.config.page_size,
            page_token: self.page_token.clone(),
            filter: self.config.filter.clone(),
        };
        let fetched = (self.fetcher)(request)?;
        self.offset += self.page.len();
        self.page = fetched
            .items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(Error::from))
            .collect::<Result<Vec<T>>>()?;
        self.page_token = fetched.next_page_token;
        self.cursor = 0;
        self.started = true;
        Ok(())
    }

    /// Discard the buffered page and fetch the next one
    pub fn next_page(&mut self) -> Result<&[T]> {
        self.fetch_next()?;
        Ok(&self.page)
    }

    /// Get the item at a zero-based global index across all pages
    pub fn get(&mut self, index: usize) -> Result<&T> {
        if !self.started {
            self.fetch_next()?;
        }
        while index >= self.offset + self.page.len() && self.page_token.is_some() {
            self.fetch_next()?;
        }
        let total = self.offset + self.page.len();
        if index < self.offset || index >= total {
            return Err(PagerError::OutOfRange { index, total }.into());
        }
        Ok(&self.page[index - self.offset])
    }
}

impl<T: DeserializeOwned + Clone> Iterator for Pager<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.started {
            if let Err(error) = self.fetch_next() {
                return Some(Err(error));
            }
        }
        while self.cursor >= self.page.len() {
            if self.page_token.is_none() {
                return None;
            }
            if let Err(error) = self.fetch_next() {
                return Some(Err(error));
            }
        }
        let item = self.page[self.cursor].clone();
        self.cursor += 1;
        Some(Ok(item))
    }
}
