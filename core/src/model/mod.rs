//! Content types, transport abstractions and streaming aggregation

pub mod content;
pub mod http;
pub mod request;
pub mod response;
pub mod stream;
pub mod transport;

pub use content::{Content, FunctionCall, FunctionResponse, Part, Role};
pub use http::HttpTransport;
pub use request::{FunctionCallingConfig, GenerateContentRequest, GenerationConfig};
pub use response::{Candidate, FinishReason, GenerateContentResponse, ModelInfo, Usage};
pub use stream::StreamAggregator;
pub use transport::{GenerateRequest, ListPage, ListRequest, ModelTransport, ResponseStream};
