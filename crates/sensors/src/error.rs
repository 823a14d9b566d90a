//! Sensor construction errors
//!
//! Fetch itself never fails; these only surface while building a source.

use std::path::PathBuf;

use thiserror::Error;

/// Sensor specific error
#[derive(Debug, Error)]
pub enum SensorError {
    /// Replay file could not be loaded
    #[error("failed to load replay file '{}': {source}", path.display())]
    ReplayLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serial device could not be opened
    #[error("failed to open serial device '{port}': {message}")]
    DeviceOpen { port: String, message: String },
}

impl SensorError {
    /// Create replay load error
    pub fn replay_load(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReplayLoad {
            path: path.into(),
            source,
        }
    }

    /// Create device open error
    pub fn device_open(port: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DeviceOpen {
            port: port.into(),
            message: message.into(),
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, SensorError>;
