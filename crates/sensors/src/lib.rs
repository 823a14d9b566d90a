//! # Sensors
//!
//! Sensor Source variants.
//!
//! Responsibilities:
//! - Read raw telemetry text from a serial device
//! - Replay a recorded line file in fixed-size slices
//! - Generate synthetic telemetry without hardware
//! - Build the configured variant behind the unified `SensorSource` trait

pub mod device;
pub mod error;
pub mod factory;
pub mod replay;
pub mod synthetic;

pub use contracts::{SensorKind, SensorSource};
pub use device::DeviceSensor;
pub use error::{Result, SensorError};
pub use factory::build_sensor_source;
pub use replay::ReplaySensor;
pub use synthetic::SyntheticSensor;
