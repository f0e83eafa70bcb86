//! Tool system: schemas, declarations, registry and execution

pub mod base;
pub mod executor;
pub mod registry;
pub mod schema;

pub use base::{get_arg, DeclaredFunction, FunctionDeclaration, FunctionTool, Tool, ToolArgs};
pub use executor::FunctionCallExecutor;
pub use registry::ToolRegistry;
pub use schema::{ParamType, Schema, SchemaBuilder, SchemaKind};
