//! Sensor factory - builds the configured `SensorSource` variant

use contracts::{SensorConfig, SensorSource};
use tracing::{info, instrument};

use crate::device::DeviceSensor;
use crate::error::Result;
use crate::replay::ReplaySensor;
use crate::synthetic::SyntheticSensor;

/// Build the sensor source selected by configuration
///
/// # Errors
/// Replay files are read eagerly, so a missing recording fails here rather
/// than on the first fetch. Device ports open lazily and never fail here.
#[instrument(name = "build_sensor_source", skip(config), fields(kind = %config.kind()))]
pub fn build_sensor_source(config: &SensorConfig) -> Result<Box<dyn SensorSource>> {
    let source: Box<dyn SensorSource> = match config {
        SensorConfig::Device(device) => {
            info!(port = %device.port, baud_rate = device.baud_rate, "using serial device sensor");
            Box::new(DeviceSensor::new(device.clone()))
        }
        SensorConfig::Replay(replay) => Box::new(ReplaySensor::from_config(replay)?),
        SensorConfig::Synthetic(synthetic) => {
            info!(shape = ?synthetic.shape, seed = ?synthetic.seed, "using synthetic sensor");
            Box::new(SyntheticSensor::new(synthetic))
        }
    };
    Ok(source)
}
