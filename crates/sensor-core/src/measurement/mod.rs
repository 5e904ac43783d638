//! Sensor measurements

mod store;
mod types;

pub use store::{InMemoryMeasurementStore, MeasurementStore};
pub use types::Measurement;
