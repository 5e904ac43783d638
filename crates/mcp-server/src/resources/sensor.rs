//! `sensor://{deviceId}/last` resources

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::error;

use crate::protocol::{McpError, Resource, ResourceContent};
use crate::registry::ResourceHandler;
use sensor_core::{MeasurementStore, Sensor};

const MIME_TYPE: &str = "application/json";

/// Latest measurement of one device as JSON
///
/// A device that never reported yields `"measurement": null` rather than an
/// error, since the resource itself exists.
pub struct LastMeasurementResource {
    device_id: String,
    store: Arc<dyn MeasurementStore>,
}

impl LastMeasurementResource {
    pub fn new(device_id: String, store: Arc<dyn MeasurementStore>) -> Self {
        Self { device_id, store }
    }

    pub fn uri(device_id: &str) -> String {
        format!("sensor://{}/last", device_id)
    }

    pub fn definition(sensor: &Sensor) -> Resource {
        Resource {
            uri: Self::uri(&sensor.device_id),
            name: format!("{} (last measurement)", sensor.name),
            description: Some(format!(
                "Most recent measurement of device {}",
                sensor.device_id
            )),
            mime_type: MIME_TYPE.to_string(),
        }
    }
}

#[async_trait]
impl ResourceHandler for LastMeasurementResource {
    async fn read(&self, resource: &Resource) -> Result<Vec<ResourceContent>, McpError> {
        let measurement = self.store.get_last(&self.device_id).await.map_err(|e| {
            error!("Reading {} failed: {}", resource.uri, e);
            McpError::internal_error(format!("Measurement lookup failed: {}", e))
        })?;

        let body = json!({
            "deviceId": self.device_id,
            "measurement": measurement,
        });

        Ok(vec![ResourceContent::text(
            &resource.uri,
            MIME_TYPE,
            body.to_string(),
        )])
    }
}
