//! Main MCP server orchestration

use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use crate::protocol::{RequestHandler, ServerInfo};
use crate::registry::{RegistryError, ResourceRegistry, ToolRegistry};
use crate::resources::register_builtin_resources;
use crate::tools::register_builtin_tools;
use crate::transport::{HttpTransport, StdioTransport};
use sensor_core::{AccountStore, MailSender, MeasurementStore, Settings};

/// Server mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServerMode {
    /// Newline-delimited JSON on stdin/stdout
    #[default]
    Stdio,
    /// JSON-RPC over HTTP POST
    Http { addr: SocketAddr },
}

/// External services the built-in tools and resources reach
#[derive(Clone)]
pub struct Collaborators {
    pub measurements: Arc<dyn MeasurementStore>,
    pub accounts: Arc<dyn AccountStore>,
    pub mailer: Arc<dyn MailSender>,
}

/// MCP server
pub struct McpServer {
    handler: Arc<RequestHandler>,
    mode: ServerMode,
}

impl McpServer {
    /// Create a server around an already configured handler
    pub fn new(handler: Arc<RequestHandler>) -> Self {
        Self {
            handler,
            mode: ServerMode::default(),
        }
    }

    /// Build the registries with every built-in tool and resource
    pub async fn build(
        settings: &Settings,
        collaborators: &Collaborators,
    ) -> Result<Self, RegistryError> {
        let server_info = ServerInfo::new(settings.server_name.as_str());

        let tools = Arc::new(ToolRegistry::new());
        register_builtin_tools(&tools, collaborators).await?;

        let resources = Arc::new(ResourceRegistry::new());
        register_builtin_resources(&resources, collaborators, &server_info, Some(tools.clone()))
            .await?;

        info!(
            "Server ready with {} tools and {} resources",
            tools.len().await,
            resources.len().await
        );

        let handler = RequestHandler::new(server_info)
            .with_resources(resources)
            .with_tools(tools)
            .with_tool_timeout(settings.tool_timeout());

        Ok(Self::new(Arc::new(handler)))
    }

    /// Set the server mode
    pub fn with_mode(mut self, mode: ServerMode) -> Self {
        self.mode = mode;
        self
    }

    /// Shared request handler
    pub fn handler(&self) -> Arc<RequestHandler> {
        self.handler.clone()
    }

    /// Run the server
    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        match self.mode {
            ServerMode::Stdio => {
                info!("Starting MCP server in stdio mode");
                let transport = StdioTransport::new(self.handler.clone());
                transport.run().await
            }
            ServerMode::Http { addr } => {
                info!("Starting MCP server in HTTP mode on {}", addr);
                let transport = HttpTransport::new(self.handler.clone(), addr);
                transport.run().await
            }
        }
    }
}
