//! Accounts, sensors and sensor alarms

mod store;
mod types;

pub use store::{AccountStore, InMemoryAccountStore};
pub use types::{Account, AlarmKind, Entity, Lookup, Sensor, SensorAlarm};
