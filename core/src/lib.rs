//! # genloop Core
//!
//! Core library for genloop - a client-side orchestration layer for
//! generative model services.
//!
//! This library turns a single logical request (generate content, optionally
//! using tools, optionally streamed, optionally paginated listings) into the
//! correct sequence of network exchanges: automatic tool-calling turns under
//! a strict call budget, streaming fragment aggregation, and cursor-based
//! pagination, behind both an asynchronous and a blocking client surface.

// Core modules
pub mod blocking;
pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod orchestrator;
pub mod pager;
pub mod tools;

// Re-export commonly used types
pub use client::Client;
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use model::{
    Candidate, Content, FinishReason, FunctionCall, FunctionCallingConfig, FunctionResponse,
    GenerateContentRequest, GenerateContentResponse, GenerationConfig, ModelInfo, ModelTransport,
    Part, ResponseStream, Role, StreamAggregator, Usage,
};
pub use orchestrator::ConversationLoop;
pub use pager::{AsyncPager, ListConfig, Pager};
pub use tools::{
    DeclaredFunction, FunctionDeclaration, FunctionTool, Schema, SchemaBuilder, SchemaKind, Tool,
    ToolRegistry,
};

/// Current version of the genloop-core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing for the library
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

/// Initialize tracing with a specific debug mode
pub fn init_tracing_with_debug(debug: bool) {
    let filter = if debug { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .init();
}
