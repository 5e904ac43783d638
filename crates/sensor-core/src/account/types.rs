//! Account type definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// A customer account owning one or more sensors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Unique identifier
    pub id: String,

    /// Contact address, also used for authentication mail
    pub email: String,

    /// Display name
    pub name: String,

    /// Disabled accounts keep their data but cannot be used
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

/// A distance sensor bound to a physical device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sensor {
    /// Unique identifier
    pub id: String,

    /// Owning account
    pub account_id: String,

    /// Identifier reported by the device in its measurements
    pub device_id: String,

    /// Human-readable name (e.g., "Rain tank north")
    pub name: String,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

/// What a sensor alarm watches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmKind {
    /// Distance to the surface rose above the threshold (level dropped)
    DistanceAbove,
    /// Distance to the surface fell below the threshold (level rose)
    DistanceBelow,
    /// Battery voltage fell below the threshold
    BatteryBelow,
    /// No measurement for longer than the threshold (in minutes)
    DataMissing,
}

/// Threshold alarm configured on a sensor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorAlarm {
    pub id: String,
    pub sensor_id: String,
    pub kind: AlarmKind,
    pub threshold: f64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Kind of entity a lookup refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Account,
    Sensor,
    SensorAlarm,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Account => write!(f, "Account"),
            Entity::Sensor => write!(f, "Sensor"),
            Entity::SensorAlarm => write!(f, "Sensor alarm"),
        }
    }
}

/// Outcome of a store lookup
///
/// Missing and disabled entities are ordinary outcomes, not errors.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    NotFound { entity: Entity, id: String },
    Disabled { entity: Entity, id: String },
}

impl<T> Lookup<T> {
    pub fn not_found(entity: Entity, id: impl Into<String>) -> Self {
        Lookup::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn disabled(entity: Entity, id: impl Into<String>) -> Self {
        Lookup::Disabled {
            entity,
            id: id.into(),
        }
    }

    /// Map the found value, keeping the failure variants
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Lookup::Found(value) => Lookup::Found(f(value)),
            Lookup::NotFound { entity, id } => Lookup::NotFound { entity, id },
            Lookup::Disabled { entity, id } => Lookup::Disabled { entity, id },
        }
    }

    /// Get the found value, if any
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            _ => None,
        }
    }

    /// Describe a failed lookup; `None` when the value was found
    pub fn failure_message(&self) -> Option<String> {
        match self {
            Lookup::Found(_) => None,
            Lookup::NotFound { entity, id } => Some(format!("{} '{}' not found", entity, id)),
            Lookup::Disabled { entity, id } => Some(format!("{} '{}' is disabled", entity, id)),
        }
    }
}
