//! # mcp-server
//!
//! JSON-RPC 2.0 MCP (Model Context Protocol) server exposing sensor
//! measurements, accounts and authentication mail as resources and tools.
//! Supports both stdio and HTTP transports.

pub mod protocol;
pub mod registry;
pub mod resources;
mod server;
pub mod tools;
pub mod transport;

pub use protocol::{McpError, McpRequest, McpResponse, RequestHandler, ServerCapabilities};
pub use registry::{RegistryError, ResourceRegistry, ToolRegistry, ValidationMode};
pub use server::{Collaborators, McpServer, ServerMode};
pub use transport::{HttpTransport, StdioTransport};
