//! # sensor-core
//!
//! Collaborator boundary for the sensor MCP server:
//! - Latest-measurement lookup by device identifier
//! - Account, sensor and sensor-alarm store with tagged lookups
//! - Outbound authentication mail
//! - Settings persisted as a plain JSON file

pub mod account;
pub mod error;
pub mod mail;
pub mod measurement;
pub mod seed;
pub mod settings;

pub use account::{
    Account, AccountStore, AlarmKind, Entity, InMemoryAccountStore, Lookup, Sensor, SensorAlarm,
};
pub use error::{Result, SensorError};
pub use mail::{LoggingMailSender, MailSender, SentMail};
pub use measurement::{InMemoryMeasurementStore, Measurement, MeasurementStore};
pub use seed::SeedData;
pub use settings::{HttpSettings, MailSettings, Settings, SettingsManager};
