//! Measurement store trait and in-memory backend

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use super::types::Measurement;
use crate::error::Result;

/// Trait for measurement backends
#[async_trait]
pub trait MeasurementStore: Send + Sync {
    /// Get the most recent measurement of a device, if it ever reported one
    async fn get_last(&self, device_id: &str) -> Result<Option<Measurement>>;
}

/// Keeps the latest measurement per device in memory
#[derive(Default)]
pub struct InMemoryMeasurementStore {
    latest: RwLock<HashMap<String, Measurement>>,
}

impl InMemoryMeasurementStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a measurement; older readings than the stored one are ignored
    pub async fn record(&self, measurement: Measurement) {
        let mut latest = self.latest.write().await;

        match latest.get(&measurement.device_id) {
            Some(current) if current.timestamp > measurement.timestamp => {
                debug!(
                    "Ignoring stale measurement for {} at {}",
                    measurement.device_id, measurement.timestamp
                );
            }
            _ => {
                latest.insert(measurement.device_id.clone(), measurement);
            }
        }
    }
}

#[async_trait]
impl MeasurementStore for InMemoryMeasurementStore {
    async fn get_last(&self, device_id: &str) -> Result<Option<Measurement>> {
        Ok(self.latest.read().await.get(device_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn reading(device_id: &str, minute: u32, distance_mm: u32) -> Measurement {
        Measurement {
            device_id: device_id.to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap(),
            distance_mm,
            battery_volts: 3.6,
            rssi_dbm: -97,
        }
    }

    #[tokio::test]
    async fn test_keeps_latest_reading() {
        let store = InMemoryMeasurementStore::new();

        store.record(reading("dev-1", 10, 1200)).await;
        store.record(reading("dev-1", 20, 1100)).await;
        store.record(reading("dev-1", 5, 1900)).await;

        let last = store.get_last("dev-1").await.unwrap().unwrap();
        assert_eq!(last.distance_mm, 1100);
    }

    #[tokio::test]
    async fn test_unknown_device_is_absent() {
        let store = InMemoryMeasurementStore::new();
        assert!(store.get_last("dev-404").await.unwrap().is_none());
    }

    #[test]
    fn test_wire_names() {
        let value = serde_json::to_value(reading("dev-1", 0, 800)).unwrap();
        assert_eq!(value["deviceId"], "dev-1");
        assert_eq!(value["distanceMm"], 800);
        assert_eq!(value["rssiDbm"], -97);
        assert!(value["timestamp"].as_str().unwrap().starts_with("2024-05-01T12:00:00"));
    }
}
