//! Built-in sensor tools

mod mail;
mod measurement;
mod sensor;

pub use mail::SendAuthenticationMailTool;
pub use measurement::LookupMeasurementTool;
pub use sensor::{GetSensorAlarmTool, GetSensorTool, ListSensorAlarmsTool};

use serde_json::Value;
use std::sync::Arc;

use crate::registry::{RegistryError, ToolRegistry};
use crate::server::Collaborators;

/// Register every built-in tool, in a fixed order
pub async fn register_builtin_tools(
    registry: &ToolRegistry,
    collaborators: &Collaborators,
) -> Result<(), RegistryError> {
    let lookup = LookupMeasurementTool::new(collaborators.measurements.clone());
    registry
        .register(
            LookupMeasurementTool::definition(),
            LookupMeasurementTool::VALIDATION,
            Arc::new(lookup),
        )
        .await?;

    let get_sensor = GetSensorTool::new(collaborators.accounts.clone());
    registry
        .register(
            GetSensorTool::definition(),
            GetSensorTool::VALIDATION,
            Arc::new(get_sensor),
        )
        .await?;

    let list_alarms = ListSensorAlarmsTool::new(collaborators.accounts.clone());
    registry
        .register(
            ListSensorAlarmsTool::definition(),
            ListSensorAlarmsTool::VALIDATION,
            Arc::new(list_alarms),
        )
        .await?;

    let get_alarm = GetSensorAlarmTool::new(collaborators.accounts.clone());
    registry
        .register(
            GetSensorAlarmTool::definition(),
            GetSensorAlarmTool::VALIDATION,
            Arc::new(get_alarm),
        )
        .await?;

    let send_mail = SendAuthenticationMailTool::new(collaborators.mailer.clone());
    registry
        .register(
            SendAuthenticationMailTool::definition(),
            SendAuthenticationMailTool::VALIDATION,
            Arc::new(send_mail),
        )
        .await?;

    Ok(())
}

/// Read a string argument, already guaranteed present by the input schema
fn string_arg<'a>(arguments: &'a Value, name: &str) -> Option<&'a str> {
    arguments.get(name).and_then(Value::as_str)
}

/// Pretty-print a value as tool output
fn pretty(value: &impl serde::Serialize) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("<unserializable: {}>", e))
}
