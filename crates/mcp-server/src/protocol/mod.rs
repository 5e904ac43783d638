//! MCP protocol types and handling

mod capabilities;
pub mod codec;
mod handler;
mod types;

pub use capabilities::{ResourcesCapability, ServerCapabilities, ToolsCapability};
pub use handler::{RequestHandler, DEFAULT_TOOL_TIMEOUT};
pub use types::*;
