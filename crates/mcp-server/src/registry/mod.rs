//! Resource and tool registries

mod error;
mod resources;
mod tools;

pub use error::RegistryError;
pub use resources::{ResourceHandler, ResourceRegistry, TextResource};
pub use tools::{ToolHandler, ToolRegistry, ValidationMode};
