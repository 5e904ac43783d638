//! Account store trait and in-memory backend

use async_trait::async_trait;
use indexmap::IndexMap;
use tokio::sync::RwLock;
use tracing::debug;

use super::types::{Account, Entity, Lookup, Sensor, SensorAlarm};
use crate::error::{Result, SensorError};

/// Trait for account, sensor and sensor-alarm backends
///
/// `Err` is reserved for infrastructure faults; missing or disabled entities
/// are reported as [`Lookup`] variants.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Look up an account by id
    async fn account(&self, id: &str) -> Result<Lookup<Account>>;

    /// Look up a sensor by id
    async fn sensor(&self, id: &str) -> Result<Lookup<Sensor>>;

    /// Look up a single sensor alarm by id
    async fn alarm(&self, id: &str) -> Result<Lookup<SensorAlarm>>;

    /// List the alarms of an enabled sensor, in insertion order
    async fn sensor_alarms(&self, sensor_id: &str) -> Result<Lookup<Vec<SensorAlarm>>>;

    /// List all sensors, in insertion order
    async fn sensors(&self) -> Result<Vec<Sensor>>;
}

/// Account store kept entirely in memory
#[derive(Default)]
pub struct InMemoryAccountStore {
    accounts: RwLock<IndexMap<String, Account>>,
    sensors: RwLock<IndexMap<String, Sensor>>,
    alarms: RwLock<IndexMap<String, SensorAlarm>>,
}

impl InMemoryAccountStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an account
    pub async fn add_account(&self, account: Account) {
        debug!("Adding account {}", account.id);
        self.accounts
            .write()
            .await
            .insert(account.id.clone(), account);
    }

    /// Insert or replace a sensor; its account must already exist
    pub async fn add_sensor(&self, sensor: Sensor) -> Result<()> {
        if !self.accounts.read().await.contains_key(&sensor.account_id) {
            return Err(SensorError::StorageError(format!(
                "Sensor {} references unknown account {}",
                sensor.id, sensor.account_id
            )));
        }

        debug!("Adding sensor {} (device {})", sensor.id, sensor.device_id);
        self.sensors.write().await.insert(sensor.id.clone(), sensor);
        Ok(())
    }

    /// Insert or replace an alarm; its sensor must already exist
    pub async fn add_alarm(&self, alarm: SensorAlarm) -> Result<()> {
        if !self.sensors.read().await.contains_key(&alarm.sensor_id) {
            return Err(SensorError::StorageError(format!(
                "Alarm {} references unknown sensor {}",
                alarm.id, alarm.sensor_id
            )));
        }

        self.alarms.write().await.insert(alarm.id.clone(), alarm);
        Ok(())
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn account(&self, id: &str) -> Result<Lookup<Account>> {
        let accounts = self.accounts.read().await;
        Ok(match accounts.get(id) {
            None => Lookup::not_found(Entity::Account, id),
            Some(account) if !account.enabled => Lookup::disabled(Entity::Account, id),
            Some(account) => Lookup::Found(account.clone()),
        })
    }

    async fn sensor(&self, id: &str) -> Result<Lookup<Sensor>> {
        let sensors = self.sensors.read().await;
        Ok(match sensors.get(id) {
            None => Lookup::not_found(Entity::Sensor, id),
            Some(sensor) if !sensor.enabled => Lookup::disabled(Entity::Sensor, id),
            Some(sensor) => Lookup::Found(sensor.clone()),
        })
    }

    async fn alarm(&self, id: &str) -> Result<Lookup<SensorAlarm>> {
        let alarms = self.alarms.read().await;
        Ok(match alarms.get(id) {
            None => Lookup::not_found(Entity::SensorAlarm, id),
            Some(alarm) if !alarm.enabled => Lookup::disabled(Entity::SensorAlarm, id),
            Some(alarm) => Lookup::Found(alarm.clone()),
        })
    }

    async fn sensor_alarms(&self, sensor_id: &str) -> Result<Lookup<Vec<SensorAlarm>>> {
        let sensor = self.sensor(sensor_id).await?;
        let alarms = self.alarms.read().await;

        Ok(sensor.map(|sensor| {
            alarms
                .values()
                .filter(|alarm| alarm.sensor_id == sensor.id)
                .cloned()
                .collect()
        }))
    }

    async fn sensors(&self) -> Result<Vec<Sensor>> {
        Ok(self.sensors.read().await.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AlarmKind;

    fn account(id: &str, enabled: bool) -> Account {
        Account {
            id: id.to_string(),
            email: format!("{}@example.com", id),
            name: id.to_uppercase(),
            enabled,
        }
    }

    fn sensor(id: &str, account_id: &str, enabled: bool) -> Sensor {
        Sensor {
            id: id.to_string(),
            account_id: account_id.to_string(),
            device_id: format!("dev-{}", id),
            name: format!("Sensor {}", id),
            enabled,
        }
    }

    fn alarm(id: &str, sensor_id: &str, enabled: bool) -> SensorAlarm {
        SensorAlarm {
            id: id.to_string(),
            sensor_id: sensor_id.to_string(),
            kind: AlarmKind::DistanceAbove,
            threshold: 1500.0,
            enabled,
        }
    }

    async fn test_store() -> InMemoryAccountStore {
        let store = InMemoryAccountStore::new();
        store.add_account(account("alice", true)).await;
        store.add_account(account("bob", false)).await;
        store.add_sensor(sensor("s1", "alice", true)).await.unwrap();
        store.add_sensor(sensor("s2", "alice", false)).await.unwrap();
        store.add_alarm(alarm("a1", "s1", true)).await.unwrap();
        store.add_alarm(alarm("a2", "s1", false)).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_account_lookup_variants() {
        let store = test_store().await;

        assert_eq!(
            store.account("alice").await.unwrap().found().map(|a| a.id),
            Some("alice".to_string())
        );
        assert_eq!(
            store.account("bob").await.unwrap(),
            Lookup::disabled(Entity::Account, "bob")
        );
        assert_eq!(
            store.account("carol").await.unwrap(),
            Lookup::not_found(Entity::Account, "carol")
        );
    }

    #[tokio::test]
    async fn test_sensor_alarms_requires_enabled_sensor() {
        let store = test_store().await;

        let alarms = store.sensor_alarms("s1").await.unwrap().found().unwrap();
        assert_eq!(alarms.len(), 2);
        assert_eq!(alarms[0].id, "a1");

        assert_eq!(
            store.sensor_alarms("s2").await.unwrap(),
            Lookup::disabled(Entity::Sensor, "s2")
        );
        assert_eq!(
            store.sensor_alarms("nope").await.unwrap(),
            Lookup::not_found(Entity::Sensor, "nope")
        );
    }

    #[tokio::test]
    async fn test_alarm_lookup() {
        let store = test_store().await;

        assert!(store.alarm("a1").await.unwrap().found().is_some());
        assert_eq!(
            store.alarm("a2").await.unwrap(),
            Lookup::disabled(Entity::SensorAlarm, "a2")
        );
    }

    #[tokio::test]
    async fn test_rejects_dangling_references() {
        let store = test_store().await;

        assert!(store.add_sensor(sensor("s3", "ghost", true)).await.is_err());
        assert!(store.add_alarm(alarm("a3", "ghost", true)).await.is_err());
    }

    #[tokio::test]
    async fn test_sensors_in_insertion_order() {
        let store = test_store().await;

        let ids: Vec<String> = store
            .sensors()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec!["s1", "s2"]);
    }
}
