//! Error types and handling for genloop

use thiserror::Error;

/// Result type alias for genloop operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for genloop
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Schema construction errors
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Tool registry and invocation errors
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Pagination errors
    #[error("Pager error: {0}")]
    Pager(#[from] PagerError),

    /// Transport errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No API key configured")]
    MissingApiKey,

    #[error("Invalid value for '{field}': {value}")]
    InvalidValue { field: String, value: String },
}

/// Errors raised while building a parameter schema
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Unsupported parameter type: {type_name}")]
    Unsupported { type_name: String },

    #[error("Required property '{name}' is not declared")]
    UnknownRequired { name: String },

    #[error("Parameters of function '{name}' must be an object schema")]
    NonObjectParameters { name: String },
}

/// Tool registry and invocation errors
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Duplicate tool: {name}")]
    Duplicate { name: String },

    #[error("Unknown tool: {name}")]
    Unknown { name: String },

    #[error("Tool '{name}' has no bound implementation")]
    NotCallable { name: String },

    #[error("Tool '{name}' failed: {message}")]
    Invocation { name: String, message: String },
}

/// Pagination conditions
///
/// `Exhausted` is an expected terminal condition, not an application
/// failure. Callers check for it to end iteration.
#[derive(Error, Debug)]
pub enum PagerError {
    #[error("No further pages")]
    Exhausted,

    #[error("Index {index} is out of range ({total} items)")]
    OutOfRange { index: usize, total: usize },
}

/// Transport errors
///
/// Opaque to the rest of the crate: nothing above the transport interprets
/// or retries them.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Failed to decode response: {message}")]
    Decode { message: String },
}

impl Error {
    /// Whether this error is the expected end-of-pagination signal
    pub fn is_pagination_exhausted(&self) -> bool {
        matches!(self, Error::Pager(PagerError::Exhausted))
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Generic(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Generic(msg.to_string())
    }
}
