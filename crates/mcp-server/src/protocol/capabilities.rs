//! Server capabilities

use serde::{Deserialize, Serialize};

/// Server capabilities advertised during initialization
///
/// An absent block means the capability is unsupported.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerCapabilities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolsCapability>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourcesCapability>,
}

impl ServerCapabilities {
    /// Build capabilities from which registries are attached
    pub fn for_registries(has_resources: bool, has_tools: bool) -> Self {
        Self {
            tools: has_tools.then(ToolsCapability::default),
            resources: has_resources.then(ResourcesCapability::default),
        }
    }
}

/// Tools capability
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsCapability {
    pub list_changed: bool,
}

/// Resources capability
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcesCapability {
    pub subscribe: bool,
    pub list_changed: bool,
}
