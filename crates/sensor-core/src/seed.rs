//! Seed data for the in-memory stores
//!
//! A JSON fixture holding accounts, sensors, alarms and measurements, loaded
//! at startup so the server has something to serve without a database.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::account::{Account, InMemoryAccountStore, Sensor, SensorAlarm};
use crate::error::{Result, SensorError};
use crate::measurement::{InMemoryMeasurementStore, Measurement};

/// Contents of a seed file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SeedData {
    pub accounts: Vec<Account>,
    pub sensors: Vec<Sensor>,
    pub alarms: Vec<SensorAlarm>,
    pub measurements: Vec<Measurement>,
}

impl SeedData {
    /// Load seed data from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let seed: SeedData = serde_json::from_str(&contents)?;
        Ok(seed)
    }

    /// Populate the stores, accounts first so references resolve
    pub async fn apply(
        &self,
        accounts: &InMemoryAccountStore,
        measurements: &InMemoryMeasurementStore,
    ) -> Result<()> {
        for account in &self.accounts {
            accounts.add_account(account.clone()).await;
        }

        for sensor in &self.sensors {
            accounts
                .add_sensor(sensor.clone())
                .await
                .map_err(|e| SensorError::InvalidSeed(e.to_string()))?;
        }

        for alarm in &self.alarms {
            accounts
                .add_alarm(alarm.clone())
                .await
                .map_err(|e| SensorError::InvalidSeed(e.to_string()))?;
        }

        for measurement in &self.measurements {
            measurements.record(measurement.clone()).await;
        }

        info!(
            "Seeded {} accounts, {} sensors, {} alarms, {} measurements",
            self.accounts.len(),
            self.sensors.len(),
            self.alarms.len(),
            self.measurements.len()
        );

        Ok(())
    }
}
