//! SensorSource trait - Sensor data source abstraction
//!
//! Decouples the Periodic Writer from the concrete sensor. Physical devices,
//! file replay and synthetic generators all expose the same pull API.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sensor source variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    /// Serial character device
    Device,
    /// Pre-recorded text file
    Replay,
    /// Random generator, no I/O
    Synthetic,
}

impl SensorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Device => "device",
            Self::Replay => "replay",
            Self::Synthetic => "synthetic",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sensor data source trait
///
/// # Design Principles
///
/// 1. **Pull model**: the caller decides the cadence, the source never blocks
///    longer than its own bounded read timeout
/// 2. **Infallible fetch**: I/O hiccups are logged inside the source and show
///    up as empty or partial text, so the writer loop never stops on them
/// 3. **No parsing**: the returned text is raw, possibly several lines
///
/// # Example
///
/// ```ignore
/// let mut sensor: Box<dyn SensorSource> = sensors::build_sensor_source(&config)?;
/// let chunk = sensor.fetch();
/// for line in chunk.lines() {
///     buffer.append(line)?;
/// }
/// ```
pub trait SensorSource: Send {
    /// Source variant (used for logging/metrics)
    fn kind(&self) -> SensorKind;

    /// Return whatever raw text is currently available, possibly empty
    fn fetch(&mut self) -> String;
}
