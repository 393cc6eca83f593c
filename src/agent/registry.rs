//! Tool descriptors and the registry that executes them.

use crate::error::{Result, SvarError};
use crate::llm::ToolDefinition;
use futures::future::BoxFuture;
use std::sync::Arc;
use tracing::{debug, info};

/// Async handler invoked with the parsed JSON arguments of a tool call.
pub type ToolHandler =
    Arc<dyn Fn(serde_json::Value) -> BoxFuture<'static, Result<String>> + Send + Sync>;

/// An invocable capability advertised to the model.
///
/// Immutable once registered; the registry owns the only copy.
#[derive(Clone)]
pub struct Tool {
    name: String,
    description: String,
    parameters: serde_json::Value,
    handler: ToolHandler,
}

impl Tool {
    /// Create a tool descriptor.
    ///
    /// `parameters` is the JSON schema of the arguments the handler expects.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
        handler: ToolHandler,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            handler,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// The declarative shape advertised to the completion service.
    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: self.parameters.clone(),
        }
    }
}

impl std::fmt::Debug for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Catalog of tools, looked up by name when the model requests a call.
///
/// Registration order is preserved so the definitions advertised to the
/// model are stable across runs. The registry is populated once during
/// construction and read-only afterwards.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: Vec<Tool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Re-registering a name replaces the earlier entry.
    pub fn register(&mut self, tool: Tool) {
        info!("Registering tool: {}", tool.name());
        match self.tools.iter().position(|t| t.name == tool.name) {
            Some(idx) => self.tools[idx] = tool,
            None => self.tools.push(tool),
        }
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.iter().find(|t| t.name == name)
    }

    /// Iterate tools in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Tool> {
        self.tools.iter()
    }

    /// Tool definitions in registration order, shaped for advertisement.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(Tool::definition).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute a tool by name with raw JSON arguments from the model.
    ///
    /// Fails with `UnknownTool` for unregistered names and with
    /// `MalformedArguments` when the payload is not valid JSON; a failure
    /// raised by the handler itself is wrapped as `ToolExecution`.
    pub async fn execute(&self, name: &str, raw_arguments: &str) -> Result<String> {
        let tool = self
            .get(name)
            .ok_or_else(|| SvarError::UnknownTool(name.to_string()))?;

        let args: serde_json::Value = serde_json::from_str(raw_arguments).map_err(|e| {
            SvarError::MalformedArguments {
                name: name.to_string(),
                message: e.to_string(),
            }
        })?;

        debug!("Executing tool: {}", name);

        (tool.handler)(args)
            .await
            .map_err(|e| SvarError::ToolExecution {
                name: name.to_string(),
                source: Box::new(e),
            })
    }
}
