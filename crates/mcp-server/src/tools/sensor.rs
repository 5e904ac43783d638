//! Sensor and sensor-alarm tools
//!
//! Missing or disabled accounts, sensors and alarms are ordinary answers
//! here and come back as `isError` content.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error};

use super::{pretty, string_arg};
use crate::protocol::{McpError, McpInputSchema, McpTool, ToolCallResult};
use crate::registry::{ToolHandler, ValidationMode};
use sensor_core::{AccountStore, Lookup, SensorError};

fn store_fault(what: &str, id: &str, err: SensorError) -> ToolCallResult {
    error!("Looking up {} {} failed: {}", what, id, err);
    ToolCallResult::error(format!("Could not look up {} '{}': {}", what, id, err))
}

/// Unwrap a lookup or turn it into `isError` content
macro_rules! found_or_return {
    ($lookup:expr) => {
        match $lookup {
            Lookup::Found(value) => value,
            failure => {
                let message = failure
                    .failure_message()
                    .unwrap_or_else(|| "Lookup failed".to_string());
                return Ok(ToolCallResult::error(message));
            }
        }
    };
}

/// Returns a sensor together with its owning account
pub struct GetSensorTool {
    accounts: Arc<dyn AccountStore>,
}

impl GetSensorTool {
    pub const NAME: &'static str = "get-sensor";
    pub const VALIDATION: ValidationMode = ValidationMode::Domain;

    pub fn new(accounts: Arc<dyn AccountStore>) -> Self {
        Self { accounts }
    }

    pub fn definition() -> McpTool {
        McpTool {
            name: Self::NAME.to_string(),
            description: "Get a sensor and the account it belongs to".to_string(),
            input_schema: McpInputSchema::required_strings(&[("sensorId", "Sensor identifier")]),
        }
    }
}

#[async_trait]
impl ToolHandler for GetSensorTool {
    async fn call(&self, arguments: Value) -> Result<ToolCallResult, McpError> {
        let Some(sensor_id) = string_arg(&arguments, "sensorId") else {
            return Ok(ToolCallResult::error("Missing sensorId"));
        };

        debug!("Getting sensor {}", sensor_id);

        let sensor = match self.accounts.sensor(sensor_id).await {
            Ok(lookup) => found_or_return!(lookup),
            Err(e) => return Ok(store_fault("sensor", sensor_id, e)),
        };

        let account = match self.accounts.account(&sensor.account_id).await {
            Ok(lookup) => found_or_return!(lookup),
            Err(e) => return Ok(store_fault("account", &sensor.account_id, e)),
        };

        Ok(ToolCallResult::text(pretty(&json!({
            "sensor": sensor,
            "account": { "id": account.id, "name": account.name },
        }))))
    }
}

/// Lists the alarms configured on a sensor
pub struct ListSensorAlarmsTool {
    accounts: Arc<dyn AccountStore>,
}

impl ListSensorAlarmsTool {
    pub const NAME: &'static str = "list-sensor-alarms";
    pub const VALIDATION: ValidationMode = ValidationMode::Domain;

    pub fn new(accounts: Arc<dyn AccountStore>) -> Self {
        Self { accounts }
    }

    pub fn definition() -> McpTool {
        McpTool {
            name: Self::NAME.to_string(),
            description: "List the alarms configured on a sensor, including disabled ones"
                .to_string(),
            input_schema: McpInputSchema::required_strings(&[("sensorId", "Sensor identifier")]),
        }
    }
}

#[async_trait]
impl ToolHandler for ListSensorAlarmsTool {
    async fn call(&self, arguments: Value) -> Result<ToolCallResult, McpError> {
        let Some(sensor_id) = string_arg(&arguments, "sensorId") else {
            return Ok(ToolCallResult::error("Missing sensorId"));
        };

        let alarms = match self.accounts.sensor_alarms(sensor_id).await {
            Ok(lookup) => found_or_return!(lookup),
            Err(e) => return Ok(store_fault("sensor", sensor_id, e)),
        };

        if alarms.is_empty() {
            return Ok(ToolCallResult::text(format!(
                "Sensor '{}' has no alarms",
                sensor_id
            )));
        }

        Ok(ToolCallResult::text(pretty(&alarms)))
    }
}

/// Returns a single sensor alarm
pub struct GetSensorAlarmTool {
    accounts: Arc<dyn AccountStore>,
}

impl GetSensorAlarmTool {
    pub const NAME: &'static str = "get-sensor-alarm";
    pub const VALIDATION: ValidationMode = ValidationMode::Domain;

    pub fn new(accounts: Arc<dyn AccountStore>) -> Self {
        Self { accounts }
    }

    pub fn definition() -> McpTool {
        McpTool {
            name: Self::NAME.to_string(),
            description: "Get a sensor alarm by id".to_string(),
            input_schema: McpInputSchema::required_strings(&[("alarmId", "Alarm identifier")]),
        }
    }
}

#[async_trait]
impl ToolHandler for GetSensorAlarmTool {
    async fn call(&self, arguments: Value) -> Result<ToolCallResult, McpError> {
        let Some(alarm_id) = string_arg(&arguments, "alarmId") else {
            return Ok(ToolCallResult::error("Missing alarmId"));
        };

        let alarm = match self.accounts.alarm(alarm_id).await {
            Ok(lookup) => found_or_return!(lookup),
            Err(e) => return Ok(store_fault("sensor alarm", alarm_id, e)),
        };

        Ok(ToolCallResult::text(pretty(&alarm)))
    }
}
