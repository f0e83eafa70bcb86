//! Tool registry

use crate::error::{Result, ToolError};
use crate::tools::base::{FunctionDeclaration, Tool};
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of the tools in play for one request
///
/// Keyed by name, with registration order preserved: declarations are
/// emitted to the model in the order the caller supplied them, and that
/// order affects model behavior deterministically.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a sequence of tools
    pub fn from_tools<I>(tools: I) -> Result<Self>
    where
        I: IntoIterator<Item = Arc<dyn Tool>>,
    {
        let mut registry = Self::new();
        for tool in tools {
            registry.register(tool)?;
        }
        Ok(registry)
    }

    /// Register a tool
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        let name = tool.name().to_string();
        if self.index.contains_key(&name) {
            return Err(ToolError::Duplicate { name }.into());
        }
        self.index.insert(name, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    /// Resolve a tool by name
    pub fn resolve(&self, name: &str) -> Result<&Arc<dyn Tool>> {
        self.index
            .get(name)
            .map(|&i| &self.tools[i])
            .ok_or_else(|| {
                ToolError::Unknown {
                    name: name.to_string(),
                }
                .into()
            })
    }

    /// Emit all declarations in registration order
    pub fn declarations(&self) -> Vec<FunctionDeclaration> {
        self.tools
            .iter()
            .map(|tool| tool.declaration().clone())
            .collect()
    }

    /// Whether every registered tool has a bound implementation
    pub fn all_callable(&self) -> bool {
        self.tools.iter().all(|tool| tool.is_callable())
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::base::{DeclaredFunction, FunctionTool};
    use crate::tools::schema::SchemaBuilder;
    use serde_json::json;

    fn declaration(name: &str) -> FunctionDeclaration {
        FunctionDeclaration::new(
            name.to_string(),
            String::new(),
            SchemaBuilder::new().build().unwrap(),
        )
        .unwrap()
    }

    fn callable(name: &str) -> Arc<dyn Tool> {
        Arc::new(FunctionTool::from_fn(declaration(name), |_| Ok(json!(null))))
    }

    #[test]
    fn test_registration_order_is_preserved() {
        let mut registry = ToolRegistry::new();
        registry.register(callable("zulu")).unwrap();
        registry.register(callable("alpha")).unwrap();
        registry.register(callable("mike")).unwrap();

        let names: Vec<String> = registry
            .declarations()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["zulu", "alpha", "mike"]);
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = ToolRegistry::new();
        registry.register(callable("echo")).unwrap();
        let result = registry.register(callable("echo"));
        assert!(matches!(
            result,
            Err(crate::error::Error::Tool(ToolError::Duplicate { name })) if name == "echo"
        ));
    }

    #[test]
    fn test_resolve_unknown_fails() {
        let registry = ToolRegistry::new();
        let result = registry.resolve("missing");
        assert!(matches!(
            result,
            Err(crate::error::Error::Tool(ToolError::Unknown { name })) if name == "missing"
        ));
    }

    #[test]
    fn test_all_callable() {
        let mut registry = ToolRegistry::new();
        registry.register(callable("bound")).unwrap();
        assert!(registry.all_callable());

        registry
            .register(Arc::new(DeclaredFunction::new(declaration("manual"))))
            .unwrap();
        assert!(!registry.all_callable());
    }
}
