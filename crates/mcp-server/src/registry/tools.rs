//! Registry of invocable tools

use async_trait::async_trait;
use indexmap::IndexMap;
use jsonschema::JSONSchema;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use super::error::RegistryError;
use crate::protocol::{McpError, McpTool, ToolCallResult};

/// Executes a registered tool
///
/// Domain failures belong in a [`ToolCallResult::error`]. `Err` is only for
/// faults the server itself cannot recover from.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, arguments: Value) -> Result<ToolCallResult, McpError>;
}

/// Where a tool reports arguments that fail its input schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Reject the call with an InvalidParams protocol error
    #[default]
    Protocol,
    /// Answer with `isError: true` content
    Domain,
}

struct ToolEntry {
    tool: McpTool,
    validator: JSONSchema,
    mode: ValidationMode,
    handler: Arc<dyn ToolHandler>,
}

impl ToolEntry {
    fn violations(&self, arguments: &Value) -> Vec<String> {
        match self.validator.validate(arguments) {
            Ok(()) => Vec::new(),
            Err(errors) => errors.map(|e| e.to_string()).collect(),
        }
    }
}

/// Registry for tools, keyed by name in registration order
#[derive(Default)]
pub struct ToolRegistry {
    entries: RwLock<IndexMap<String, Arc<ToolEntry>>>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool; its input schema is compiled once here
    pub async fn register(
        &self,
        tool: McpTool,
        mode: ValidationMode,
        handler: Arc<dyn ToolHandler>,
    ) -> Result<(), RegistryError> {
        let invalid_schema = |reason: String| RegistryError::InvalidSchema {
            tool: tool.name.clone(),
            reason,
        };

        let schema = serde_json::to_value(&tool.input_schema)
            .map_err(|e| invalid_schema(e.to_string()))?;
        let validator = JSONSchema::compile(&schema).map_err(|e| invalid_schema(e.to_string()))?;

        let mut entries = self.entries.write().await;
        if entries.contains_key(&tool.name) {
            return Err(RegistryError::DuplicateTool(tool.name));
        }

        info!("Registered tool {} ({:?} validation)", tool.name, mode);
        entries.insert(
            tool.name.clone(),
            Arc::new(ToolEntry {
                tool,
                validator,
                mode,
                handler,
            }),
        );
        Ok(())
    }

    /// List all tools in registration order
    pub async fn list(&self) -> Vec<McpTool> {
        let entries = self.entries.read().await;
        entries.values().map(|e| e.tool.clone()).collect()
    }

    /// Number of registered tools
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Invoke a tool by name
    ///
    /// Missing arguments validate as an empty object.
    pub async fn call(
        &self,
        name: &str,
        arguments: Option<Value>,
    ) -> Result<ToolCallResult, McpError> {
        let entry = self
            .entries
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| {
                McpError::invalid_params(format!("Tool not found: {}", name))
                    .with_data(json!({ "tool": name }))
            })?;

        let arguments = arguments.unwrap_or_else(|| json!({}));

        let violations = entry.violations(&arguments);
        if !violations.is_empty() {
            debug!("Arguments for {} failed validation: {:?}", name, violations);
            return match entry.mode {
                ValidationMode::Protocol => Err(McpError::invalid_params(format!(
                    "Invalid arguments for tool {}",
                    name
                ))
                .with_data(json!({ "tool": name, "errors": violations }))),
                ValidationMode::Domain => Ok(ToolCallResult::error(format!(
                    "Invalid arguments: {}",
                    violations.join("; ")
                ))),
            };
        }

        let result = entry.handler.call(arguments).await?;

        if result.content.is_empty() {
            error!("Tool {} returned no content", name);
            return Err(McpError::internal_error(format!(
                "Tool {} returned no content",
                name
            )));
        }

        Ok(result)
    }
}
