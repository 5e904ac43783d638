//! Measurement type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single reading reported by a distance sensor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    /// Device that produced the reading
    pub device_id: String,

    /// When the reading was taken
    pub timestamp: DateTime<Utc>,

    /// Distance from the sensor to the surface, in millimetres
    pub distance_mm: u32,

    /// Battery voltage at the time of the reading
    pub battery_volts: f64,

    /// Radio signal strength of the uplink
    pub rssi_dbm: i32,
}
