//! MCP request handler

use futures::future::join_all;
use futures::FutureExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::capabilities::ServerCapabilities;
use super::codec::{self, DecodeError, Incoming};
use super::types::*;
use crate::registry::{ResourceRegistry, ToolRegistry};

/// Default upper bound for a single tool call
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(30);

/// Routes requests to capability negotiation and the registries
///
/// Takes `&self` everywhere so one handler can serve concurrent requests.
pub struct RequestHandler {
    server_info: ServerInfo,
    resources: Option<Arc<ResourceRegistry>>,
    tools: Option<Arc<ToolRegistry>>,
    tool_timeout: Duration,
}

impl RequestHandler {
    /// Create a handler with no registries attached
    pub fn new(server_info: ServerInfo) -> Self {
        Self {
            server_info,
            resources: None,
            tools: None,
            tool_timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }

    /// Attach a resource registry
    pub fn with_resources(mut self, resources: Arc<ResourceRegistry>) -> Self {
        self.resources = Some(resources);
        self
    }

    /// Attach a tool registry
    pub fn with_tools(mut self, tools: Arc<ToolRegistry>) -> Self {
        self.tools = Some(tools);
        self
    }

    /// Set the timeout applied to each `tools/call`
    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = timeout;
        self
    }

    /// Capabilities derived from the attached registries
    pub fn capabilities(&self) -> ServerCapabilities {
        ServerCapabilities::for_registries(self.resources.is_some(), self.tools.is_some())
    }

    /// Handle a raw payload, returning the bytes to send back (if any)
    pub async fn handle_payload(&self, bytes: &[u8]) -> Option<Vec<u8>> {
        match codec::decode_payload(bytes) {
            Err(e) => {
                warn!("Rejected payload: {}", e.error.message);
                Some(codec::encode(&e.into_response()))
            }
            Ok(Incoming::Single(decoded)) => self
                .handle_decoded(decoded)
                .await
                .map(|response| codec::encode(&response)),
            Ok(Incoming::Batch(items)) => {
                debug!("Handling batch of {}", items.len());
                let responses: Vec<McpResponse> =
                    join_all(items.into_iter().map(|item| self.handle_decoded(item)))
                        .await
                        .into_iter()
                        .flatten()
                        .collect();

                if responses.is_empty() {
                    None
                } else {
                    Some(codec::encode_batch(&responses))
                }
            }
        }
    }

    async fn handle_decoded(
        &self,
        decoded: Result<McpRequest, DecodeError>,
    ) -> Option<McpResponse> {
        match decoded {
            Ok(request) => self.handle(request).await,
            Err(e) => {
                debug!("Invalid envelope: {}", e.error.message);
                Some(e.into_response())
            }
        }
    }

    /// Handle a decoded request
    ///
    /// Returns exactly one response for a request and none for a
    /// notification.
    pub async fn handle(&self, request: McpRequest) -> Option<McpResponse> {
        let McpRequest {
            method, params, id, ..
        } = request;

        let Some(id) = id else {
            self.handle_notification(&method, params).await;
            return None;
        };

        debug!("Handling request: {}", method);

        let result = self.route_isolated(&method, params).await;

        Some(match result {
            Ok(result) => McpResponse::success(id, result),
            Err(error) => {
                debug!("Request {} failed: {}", method, error);
                McpResponse::failure(id, error)
            }
        })
    }

    async fn handle_notification(&self, method: &str, params: Option<Value>) {
        match method {
            "notifications/initialized" | "initialized" => {
                info!("Client initialized");
            }
            "notifications/cancelled" => {
                debug!("Request cancelled");
            }
            _ => {
                // Notifications are executed but never answered
                debug!("Received notification: {}", method);
                if let Err(e) = self.route_isolated(method, params).await {
                    debug!("Notification {} failed: {}", method, e);
                }
            }
        }
    }

    /// Route a call, turning a panicking handler into an InternalError
    async fn route_isolated(&self, method: &str, params: Option<Value>) -> Result<Value, McpError> {
        AssertUnwindSafe(self.route(method, params))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| {
                let message = panic_message(&*panic);
                error!("Handler for {} panicked: {}", method, message);
                Err(McpError::internal_error(format!("Handler panicked: {}", message)))
            })
    }

    async fn route(&self, method: &str, params: Option<Value>) -> Result<Value, McpError> {
        match method {
            "initialize" => self.handle_initialize(params),
            "ping" => Ok(json!({})),
            "resources/list" => self.handle_resources_list().await,
            "resources/read" => self.handle_resources_read(params).await,
            "tools/list" => self.handle_tools_list().await,
            "tools/call" => self.handle_tools_call(params).await,
            _ => Err(McpError::method_not_found(method)),
        }
    }

    /// Handle initialize request
    fn handle_initialize(&self, params: Option<Value>) -> Result<Value, McpError> {
        let params: InitializeParams = match params {
            Some(params) => parse_params(params)?,
            None => InitializeParams::default(),
        };

        match &params.client_info {
            Some(client) => info!(
                "Initializing session with client: {} v{} (protocol {})",
                client.name,
                client.version,
                params.protocol_version.as_deref().unwrap_or("unspecified")
            ),
            None => info!("Initializing session with anonymous client"),
        }

        to_result(InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: self.capabilities(),
            server_info: self.server_info.clone(),
        })
    }

    /// Handle resources/list request
    async fn handle_resources_list(&self) -> Result<Value, McpError> {
        let resources = self.resource_registry("resources/list")?;
        to_result(ResourcesListResult {
            resources: resources.list().await,
        })
    }

    /// Handle resources/read request
    async fn handle_resources_read(&self, params: Option<Value>) -> Result<Value, McpError> {
        let resources = self.resource_registry("resources/read")?;
        let params: ResourceReadParams = require_params(params)?;

        let contents = resources.read(&params.uri).await?;
        to_result(ResourceReadResult { contents })
    }

    /// Handle tools/list request
    async fn handle_tools_list(&self) -> Result<Value, McpError> {
        let tools = self.tool_registry("tools/list")?;
        to_result(ToolsListResult {
            tools: tools.list().await,
        })
    }

    /// Handle tools/call request
    async fn handle_tools_call(&self, params: Option<Value>) -> Result<Value, McpError> {
        let tools = self.tool_registry("tools/call")?;
        let params: ToolCallParams = require_params(params)?;

        debug!("Calling tool: {}", params.name);

        let call = tools.call(&params.name, params.arguments);
        let result = tokio::time::timeout(self.tool_timeout, call)
            .await
            .map_err(|_| {
                error!(
                    "Tool {} timed out after {:?}",
                    params.name, self.tool_timeout
                );
                McpError::internal_error(format!("Tool {} timed out", params.name)).with_data(
                    json!({
                        "tool": params.name,
                        "timeoutMs": self.tool_timeout.as_millis() as u64,
                    }),
                )
            })??;

        if result.is_error() {
            warn!("Tool {} reported a failure", params.name);
        }

        to_result(result)
    }

    fn resource_registry(&self, method: &str) -> Result<&ResourceRegistry, McpError> {
        self.resources
            .as_deref()
            .ok_or_else(|| McpError::method_not_found(method))
    }

    fn tool_registry(&self, method: &str) -> Result<&ToolRegistry, McpError> {
        self.tools
            .as_deref()
            .ok_or_else(|| McpError::method_not_found(method))
    }
}

fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T, McpError> {
    serde_json::from_value(params).map_err(|e| McpError::invalid_params(e.to_string()))
}

fn require_params<T: DeserializeOwned>(params: Option<Value>) -> Result<T, McpError> {
    params
        .map(parse_params)
        .transpose()?
        .ok_or_else(|| McpError::invalid_params("Missing params"))
}

fn to_result<T: Serialize>(result: T) -> Result<Value, McpError> {
    serde_json::to_value(result).map_err(|e| McpError::internal_error(e.to_string()))
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
