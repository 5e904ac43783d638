//! Registry of URI-addressed resources

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info};
use url::Url;

use super::error::RegistryError;
use crate::protocol::{McpError, Resource, ResourceContent};

/// Produces the contents of a registered resource
#[async_trait]
pub trait ResourceHandler: Send + Sync {
    /// Read the resource; must yield at least one content part
    async fn read(&self, resource: &Resource) -> Result<Vec<ResourceContent>, McpError>;
}

/// Resource with fixed text contents
pub struct TextResource {
    text: String,
}

impl TextResource {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl ResourceHandler for TextResource {
    async fn read(&self, resource: &Resource) -> Result<Vec<ResourceContent>, McpError> {
        Ok(vec![ResourceContent::text(
            &resource.uri,
            &resource.mime_type,
            &self.text,
        )])
    }
}

struct ResourceEntry {
    resource: Resource,
    handler: Arc<dyn ResourceHandler>,
}

/// Registry for resources, keyed by URI in registration order
#[derive(Default)]
pub struct ResourceRegistry {
    entries: RwLock<IndexMap<String, Arc<ResourceEntry>>>,
}

impl ResourceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource
    pub async fn register(
        &self,
        resource: Resource,
        handler: Arc<dyn ResourceHandler>,
    ) -> Result<(), RegistryError> {
        Url::parse(&resource.uri).map_err(|e| RegistryError::InvalidUri {
            uri: resource.uri.clone(),
            reason: e.to_string(),
        })?;

        let mut entries = self.entries.write().await;
        if entries.contains_key(&resource.uri) {
            return Err(RegistryError::DuplicateResource(resource.uri));
        }

        info!("Registered resource {}", resource.uri);
        entries.insert(
            resource.uri.clone(),
            Arc::new(ResourceEntry { resource, handler }),
        );
        Ok(())
    }

    /// List all resources in registration order
    pub async fn list(&self) -> Vec<Resource> {
        let entries = self.entries.read().await;
        entries.values().map(|e| e.resource.clone()).collect()
    }

    /// Number of registered resources
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Read a resource by URI
    pub async fn read(&self, uri: &str) -> Result<Vec<ResourceContent>, McpError> {
        // Clone the entry out so the lock is not held while the handler runs
        let entry = self
            .entries
            .read()
            .await
            .get(uri)
            .cloned()
            .ok_or_else(|| {
                McpError::invalid_params(format!("Resource not found: {}", uri))
                    .with_data(json!({ "uri": uri }))
            })?;

        debug!("Reading resource {}", uri);
        let contents = entry.handler.read(&entry.resource).await?;

        if contents.is_empty() {
            error!("Resource {} produced no contents", uri);
            return Err(McpError::internal_error(format!(
                "Resource {} produced no contents",
                uri
            )));
        }

        if let Some(stray) = contents.iter().find(|c| !c.uri.starts_with(uri)) {
            error!("Resource {} produced contents for {}", uri, stray.uri);
            return Err(McpError::internal_error(format!(
                "Resource {} produced contents for a different URI: {}",
                uri, stray.uri
            )));
        }

        Ok(contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::error_codes;

    struct EmptyResource;

    #[async_trait]
    impl ResourceHandler for EmptyResource {
        async fn read(&self, _resource: &Resource) -> Result<Vec<ResourceContent>, McpError> {
            Ok(Vec::new())
        }
    }

    struct StrayResource;

    #[async_trait]
    impl ResourceHandler for StrayResource {
        async fn read(&self, resource: &Resource) -> Result<Vec<ResourceContent>, McpError> {
            Ok(vec![ResourceContent::text(
                "other://x",
                &resource.mime_type,
                "elsewhere",
            )])
        }
    }

    fn resource(uri: &str) -> Resource {
        Resource {
            uri: uri.to_string(),
            name: uri.to_string(),
            description: None,
            mime_type: "text/plain".to_string(),
        }
    }

    #[tokio::test]
    async fn test_list_in_registration_order() {
        let registry = ResourceRegistry::new();
        for uri in ["sensor://b/last", "sensor://a/last", "server://info"] {
            registry
                .register(resource(uri), Arc::new(TextResource::new("x")))
                .await
                .unwrap();
        }

        let first: Vec<String> = registry.list().await.into_iter().map(|r| r.uri).collect();
        assert_eq!(first, vec!["sensor://b/last", "sensor://a/last", "server://info"]);

        let second: Vec<String> = registry.list().await.into_iter().map(|r| r.uri).collect();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_read_text_resource() {
        let registry = ResourceRegistry::new();
        registry
            .register(resource("server://motd"), Arc::new(TextResource::new("hello")))
            .await
            .unwrap();

        let contents = registry.read("server://motd").await.unwrap();
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0].text.as_deref(), Some("hello"));
        assert_eq!(contents[0].mime_type, "text/plain");
    }

    #[tokio::test]
    async fn test_unknown_uri_is_invalid_params() {
        let registry = ResourceRegistry::new();

        let err = registry.read("sensor://abc/last").await.unwrap_err();
        assert_eq!(err.code, error_codes::INVALID_PARAMS);
        assert!(err.message.contains("sensor://abc/last"));
    }

    #[tokio::test]
    async fn test_empty_contents_is_internal_error() {
        let registry = ResourceRegistry::new();
        registry
            .register(resource("server://empty"), Arc::new(EmptyResource))
            .await
            .unwrap();

        let err = registry.read("server://empty").await.unwrap_err();
        assert_eq!(err.code, error_codes::INTERNAL_ERROR);
    }

    #[tokio::test]
    async fn test_rejects_duplicate_and_relative_uris() {
        let registry = ResourceRegistry::new();
        registry
            .register(resource("server://info"), Arc::new(TextResource::new("a")))
            .await
            .unwrap();

        assert_eq!(
            registry
                .register(resource("server://info"), Arc::new(TextResource::new("b")))
                .await,
            Err(RegistryError::DuplicateResource("server://info".to_string()))
        );
        assert!(matches!(
            registry
                .register(resource("no-scheme"), Arc::new(TextResource::new("c")))
                .await,
            Err(RegistryError::InvalidUri { .. })
        ));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_contents_for_other_uri_is_internal_error() {
        let registry = ResourceRegistry::new();
        registry
            .register(resource("server://stray"), Arc::new(StrayResource))
            .await
            .unwrap();

        let err = registry.read("server://stray").await.unwrap_err();
        assert_eq!(err.code, error_codes::INTERNAL_ERROR);
        assert!(err.message.contains("other://x"));
    }
}
