//! Base tool traits and structures

use crate::error::{Result, SchemaError, ToolError};
use crate::tools::schema::{Schema, SchemaKind};
use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Arguments passed to a tool invocation, keyed by parameter name
pub type ToolArgs = serde_json::Map<String, Value>;

/// Declarative description of one callable function
///
/// Immutable once registered. `parameters` is always an object schema whose
/// invariants have been checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    /// Name of the function, unique within a registry
    pub name: String,

    /// Description of what the function does
    pub description: String,

    /// Parameter schema
    pub parameters: Schema,
}

impl FunctionDeclaration {
    /// Create a declaration, validating the parameter schema
    pub fn new<S: Into<String>>(
        name: S,
        description: S,
        parameters: Schema,
    ) -> std::result::Result<Self, SchemaError> {
        let name = name.into();
        if parameters.kind != SchemaKind::Object {
            return Err(SchemaError::NonObjectParameters { name });
        }
        parameters.validate()?;
        Ok(Self {
            name,
            description: description.into(),
            parameters,
        })
    }
}

/// Trait for all tools
///
/// A tool is a named capability described by a declaration. Tools that carry
/// an implementation (`is_callable`) participate in automatic function
/// calling; schema-only tools leave execution to the caller.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the declaration for this tool
    fn declaration(&self) -> &FunctionDeclaration;

    /// Get the name of the tool
    fn name(&self) -> &str {
        &self.declaration().name
    }

    /// Whether this tool has a bound implementation
    fn is_callable(&self) -> bool {
        true
    }

    /// Invoke the tool with named arguments
    async fn call(&self, args: ToolArgs) -> Result<Value>;
}

type Handler = Box<dyn Fn(ToolArgs) -> BoxFuture<'static, Result<Value>> + Send + Sync>;

/// A declaration bound to a native implementation
///
/// The automatic-mode tool: the model requests it by name and the
/// orchestration loop executes it locally.
pub struct FunctionTool {
    declaration: FunctionDeclaration,
    handler: Handler,
}

impl FunctionTool {
    /// Bind a declaration to an async handler
    pub fn new<F, Fut>(declaration: FunctionDeclaration, handler: F) -> Self
    where
        F: Fn(ToolArgs) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<Value>> + Send + 'static,
    {
        Self {
            declaration,
            handler: Box::new(move |args| Box::pin(handler(args))),
        }
    }

    /// Bind a declaration to a synchronous handler
    pub fn from_fn<F>(declaration: FunctionDeclaration, handler: F) -> Self
    where
        F: Fn(ToolArgs) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            declaration,
            handler: Box::new(move |args| {
                let output = handler(args);
                Box::pin(async move { output })
            }),
        }
    }
}

#[async_trait]
impl Tool for FunctionTool {
    fn declaration(&self) -> &FunctionDeclaration {
        &self.declaration
    }

    async fn call(&self, args: ToolArgs) -> Result<Value> {
        (self.handler)(args).await
    }
}

/// A schema-only tool with no bound implementation
///
/// Declaring one puts the whole request into manual mode: the model may
/// still ask for it, but the raw call parts are returned to the caller for
/// execution and resubmission.
pub struct DeclaredFunction {
    declaration: FunctionDeclaration,
}

impl DeclaredFunction {
    /// Wrap a bare declaration
    pub fn new(declaration: FunctionDeclaration) -> Self {
        Self { declaration }
    }
}

#[async_trait]
impl Tool for DeclaredFunction {
    fn declaration(&self) -> &FunctionDeclaration {
        &self.declaration
    }

    fn is_callable(&self) -> bool {
        false
    }

    async fn call(&self, _args: ToolArgs) -> Result<Value> {
        Err(ToolError::NotCallable {
            name: self.declaration.name.clone(),
        }
        .into())
    }
}

/// Extract a typed argument by name
pub fn get_arg<T>(args: &ToolArgs, key: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let value = args.get(key).ok_or_else(|| ToolError::Invocation {
        name: key.to_string(),
        message: format!("Missing argument: {}", key),
    })?;
    serde_json::from_value(value.clone()).map_err(|_| {
        ToolError::Invocation {
            name: key.to_string(),
            message: format!("Invalid argument type for: {}", key),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::schema::SchemaBuilder;
    use serde_json::json;

    fn weather_declaration() -> FunctionDeclaration {
        FunctionDeclaration::new(
            "get_current_weather",
            "Get the current weather for a city",
            SchemaBuilder::new()
                .param::<String>("location", "The city to look up")
                .build()
                .unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_declaration_requires_object_parameters() {
        let result = FunctionDeclaration::new("bad", "", Schema::string());
        assert!(matches!(
            result,
            Err(SchemaError::NonObjectParameters { name }) if name == "bad"
        ));
    }

    #[tokio::test]
    async fn test_function_tool_invokes_handler() {
        let tool = FunctionTool::from_fn(weather_declaration(), |args| {
            let location: String = get_arg(&args, "location")?;
            Ok(json!(format!("sunny in {}", location)))
        });

        assert!(tool.is_callable());
        assert_eq!(tool.name(), "get_current_weather");

        let mut args = ToolArgs::new();
        args.insert("location".to_string(), json!("Boston"));
        let result = tool.call(args).await.unwrap();
        assert_eq!(result, json!("sunny in Boston"));
    }

    #[tokio::test]
    async fn test_declared_function_is_not_callable() {
        let tool = DeclaredFunction::new(weather_declaration());
        assert!(!tool.is_callable());
        let result = tool.call(ToolArgs::new()).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_get_arg_missing() {
        let args = ToolArgs::new();
        let result: Result<String> = get_arg(&args, "location");
        assert!(result.is_err());
    }
}
