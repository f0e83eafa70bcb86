//! Streaming response aggregation

use crate::error::Result;
use crate::model::content::{Content, Part};
use crate::model::response::{Candidate, GenerateContentResponse};
use crate::model::transport::ResponseStream;
use futures::StreamExt;

/// Folds an ordered sequence of response fragments into one merged response
///
/// Merge rules, applied per candidate index (fragments always address a
/// stable candidate position):
/// - adjacent text parts concatenate in arrival order;
/// - non-text parts arrive whole within a single fragment and are appended
///   as-is;
/// - usage, model and finish_reason take the most recent non-null value.
#[derive(Default)]
pub struct StreamAggregator {
    merged: GenerateContentResponse,
    saw_fragment: bool,
}

impl StreamAggregator {
    /// Create an empty aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one fragment into the merged response
    pub fn absorb(&mut self, fragment: &GenerateContentResponse) {
        self.saw_fragment = true;

        if fragment.usage.is_some() {
            self.merged.usage = fragment.usage.clone();
        }
        if fragment.model.is_some() {
            self.merged.model = fragment.model.clone();
        }

        for (index, candidate) in fragment.candidates.iter().enumerate() {
            while self.merged.candidates.len() <= index {
                self.merged.candidates.push(Candidate::new(Content::new(
                    candidate.content.role,
                    Vec::new(),
                )));
            }
            let merged = &mut self.merged.candidates[index];

            for part in &candidate.content.parts {
                match (merged.content.parts.last_mut(), part) {
                    (Some(Part::Text { text: previous }), Part::Text { text }) => {
                        previous.push_str(text);
                    }
                    _ => merged.content.parts.push(part.clone()),
                }
            }

            if candidate.finish_reason.is_some() {
                merged.finish_reason = candidate.finish_reason.clone();
            }
            if let Some(metadata) = &candidate.metadata {
                let target = merged.metadata.get_or_insert_with(Default::default);
                for (key, value) in metadata {
                    target.insert(key.clone(), value.clone());
                }
            }
        }
    }

    /// Whether any fragment has been absorbed
    pub fn is_empty(&self) -> bool {
        !self.saw_fragment
    }

    /// Consume the aggregator, returning the merged response
    pub fn finish(self) -> GenerateContentResponse {
        self.merged
    }

    /// Drain an entire fragment stream into one merged response
    ///
    /// For callers that want streaming semantics from the transport without
    /// incremental consumption.
    pub async fn collect(mut stream: ResponseStream) -> Result<GenerateContentResponse> {
        let mut aggregator = StreamAggregator::new();
        while let Some(fragment) = stream.next().await {
            aggregator.absorb(&fragment?);
        }
        Ok(aggregator.finish())
    }
}
