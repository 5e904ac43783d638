//! `server://info` resource

use async_trait::async_trait;
use serde_json::json;
use std::sync::{Arc, Weak};

use crate::protocol::{McpError, Resource, ResourceContent, ServerInfo, MCP_VERSION};
use crate::registry::{ResourceHandler, ResourceRegistry, ToolRegistry};

const URI: &str = "server://info";

/// Server identity with the tools and resources it currently offers
pub struct ServerInfoResource {
    info: ServerInfo,
    tools: Option<Arc<ToolRegistry>>,
    // Weak, since this resource lives inside the registry it counts
    resources: Option<Weak<ResourceRegistry>>,
}

impl ServerInfoResource {
    pub fn new(info: ServerInfo) -> Self {
        Self {
            info,
            tools: None,
            resources: None,
        }
    }

    pub fn with_tools(mut self, tools: Arc<ToolRegistry>) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn with_resources(mut self, resources: &Arc<ResourceRegistry>) -> Self {
        self.resources = Some(Arc::downgrade(resources));
        self
    }

    pub fn definition() -> Resource {
        Resource {
            uri: URI.to_string(),
            name: "Server information".to_string(),
            description: Some("Server name, version, tool and resource counts".to_string()),
            mime_type: "application/json".to_string(),
        }
    }
}

#[async_trait]
impl ResourceHandler for ServerInfoResource {
    async fn read(&self, resource: &Resource) -> Result<Vec<ResourceContent>, McpError> {
        let tools: Vec<String> = match &self.tools {
            Some(tools) => tools.list().await.into_iter().map(|t| t.name).collect(),
            None => Vec::new(),
        };
        let resource_count = match self.resources.as_ref().and_then(Weak::upgrade) {
            Some(resources) => resources.len().await,
            None => 0,
        };

        let body = json!({
            "name": self.info.name,
            "version": self.info.version,
            "protocolVersion": MCP_VERSION,
            "toolCount": tools.len(),
            "resourceCount": resource_count,
            "tools": tools,
        });

        Ok(vec![ResourceContent::text(
            &resource.uri,
            &resource.mime_type,
            body.to_string(),
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[tokio::test]
    async fn test_read_without_registries() {
        let resource = ServerInfoResource::new(ServerInfo::new("tank-monitor"));

        let contents = resource
            .read(&ServerInfoResource::definition())
            .await
            .unwrap();
        let value: Value = serde_json::from_str(contents[0].text.as_deref().unwrap()).unwrap();
        assert_eq!(value["name"], "tank-monitor");
        assert_eq!(value["protocolVersion"], MCP_VERSION);
        assert_eq!(value["tools"], json!([]));
        assert_eq!(value["toolCount"], 0);
        assert_eq!(value["resourceCount"], 0);
    }

    #[tokio::test]
    async fn test_counts_include_itself() {
        let resources = Arc::new(ResourceRegistry::new());
        let handler = ServerInfoResource::new(ServerInfo::new("tank-monitor"))
            .with_tools(Arc::new(ToolRegistry::new()))
            .with_resources(&resources);
        resources
            .register(ServerInfoResource::definition(), Arc::new(handler))
            .await
            .unwrap();

        let contents = resources.read(URI).await.unwrap();
        let value: Value = serde_json::from_str(contents[0].text.as_deref().unwrap()).unwrap();
        assert_eq!(value["toolCount"], 0);
        assert_eq!(value["resourceCount"], 1);
    }
}
