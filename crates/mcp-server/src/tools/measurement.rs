//! `lookup-measurement` tool

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error};

use super::{pretty, string_arg};
use crate::protocol::{McpError, McpInputSchema, McpTool, ToolCallResult};
use crate::registry::{ToolHandler, ValidationMode};
use sensor_core::MeasurementStore;

/// Returns the latest measurement reported by a device
pub struct LookupMeasurementTool {
    store: Arc<dyn MeasurementStore>,
}

impl LookupMeasurementTool {
    pub const NAME: &'static str = "lookup-measurement";

    /// A malformed device id is a client bug, not a lookup outcome
    pub const VALIDATION: ValidationMode = ValidationMode::Protocol;

    pub fn new(store: Arc<dyn MeasurementStore>) -> Self {
        Self { store }
    }

    pub fn definition() -> McpTool {
        McpTool {
            name: Self::NAME.to_string(),
            description: "Get the most recent measurement (distance, battery voltage, signal \
                          strength) reported by a sensor device"
                .to_string(),
            input_schema: McpInputSchema::required_strings(&[(
                "deviceId",
                "Identifier the device reports its measurements under",
            )]),
        }
    }
}

#[async_trait]
impl ToolHandler for LookupMeasurementTool {
    async fn call(&self, arguments: Value) -> Result<ToolCallResult, McpError> {
        let Some(device_id) = string_arg(&arguments, "deviceId") else {
            return Ok(ToolCallResult::error("Missing deviceId"));
        };

        debug!("Looking up last measurement of {}", device_id);

        Ok(match self.store.get_last(device_id).await {
            Ok(Some(measurement)) => ToolCallResult::text(pretty(&measurement)),
            Ok(None) => ToolCallResult::error(format!(
                "No measurement recorded for device '{}'",
                device_id
            )),
            Err(e) => {
                error!("Measurement lookup for {} failed: {}", device_id, e);
                ToolCallResult::error(format!("Measurement lookup failed: {}", e))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use sensor_core::{InMemoryMeasurementStore, Measurement, Result as SensorResult, SensorError};
    use serde_json::json;

    struct BrokenStore;

    #[async_trait]
    impl MeasurementStore for BrokenStore {
        async fn get_last(&self, _device_id: &str) -> SensorResult<Option<Measurement>> {
            Err(SensorError::StorageError("time-series database unreachable".to_string()))
        }
    }

    async fn tool_with_reading() -> LookupMeasurementTool {
        let store = InMemoryMeasurementStore::new();
        store
            .record(Measurement {
                device_id: "dev-1".to_string(),
                timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 6, 30, 0).unwrap(),
                distance_mm: 1234,
                battery_volts: 3.61,
                rssi_dbm: -88,
            })
            .await;
        LookupMeasurementTool::new(Arc::new(store))
    }

    #[tokio::test]
    async fn test_returns_latest_measurement() {
        let tool = tool_with_reading().await;

        let result = tool.call(json!({"deviceId": "dev-1"})).await.unwrap();
        assert!(!result.is_error());

        let crate::protocol::ToolContent::Text { text } = &result.content[0];
        let value: Value = serde_json::from_str(text).unwrap();
        assert_eq!(value["distanceMm"], 1234);
        assert_eq!(value["deviceId"], "dev-1");
    }

    #[tokio::test]
    async fn test_missing_measurement_is_domain_error() {
        let tool = tool_with_reading().await;

        let result = tool.call(json!({"deviceId": "dev-2"})).await.unwrap();
        assert!(result.is_error());
        assert_eq!(
            result.content,
            vec![crate::protocol::ToolContent::Text {
                text: "No measurement recorded for device 'dev-2'".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_store_fault_is_domain_error() {
        let tool = LookupMeasurementTool::new(Arc::new(BrokenStore));

        let result = tool.call(json!({"deviceId": "dev-1"})).await.unwrap();
        assert!(result.is_error());
    }
}
