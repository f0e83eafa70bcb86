//! Function call execution

use crate::model::content::{FunctionCall, FunctionResponse};
use crate::tools::registry::ToolRegistry;
use futures::future::join_all;

/// Executes model-requested function calls against a registry
///
/// Execution never fails the overall call: an unknown name or a failing
/// implementation becomes a structured error response that the remote model,
/// not the local caller, consumes. Transport failures elsewhere in the loop
/// remain fatal; nothing here touches them.
pub struct FunctionCallExecutor<'a> {
    registry: &'a ToolRegistry,
}

impl<'a> FunctionCallExecutor<'a> {
    /// Create an executor over the given registry
    pub fn new(registry: &'a ToolRegistry) -> Self {
        Self { registry }
    }

    /// Execute a single requested call
    pub async fn execute(&self, call: &FunctionCall) -> FunctionResponse {
        let tool = match self.registry.resolve(&call.name) {
            Ok(tool) => tool,
            Err(_) => {
                tracing::warn!(name = %call.name, "model requested an unknown function");
                return FunctionResponse::error(
                    &call.name,
                    format!("unknown function: {}", call.name),
                );
            }
        };

        match tool.call(call.args.clone()).await {
            Ok(value) => FunctionResponse::success(&call.name, value),
            Err(error) => {
                tracing::debug!(name = %call.name, %error, "tool invocation failed");
                FunctionResponse::error(&call.name, error.to_string())
            }
        }
    }

    /// Execute several calls from one turn
    ///
    /// Independent calls run concurrently; the returned responses are in the
    /// same order as the originating calls, because the remote protocol
    /// pairs calls and responses positionally.
    pub async fn execute_all(&self, calls: &[FunctionCall]) -> Vec<FunctionResponse> {
        join_all(calls.iter().map(|call| self.execute(call))).await
    }
}
