//! Device Sensor - 从串口读取原始遥测文本
//!
//! The port is opened lazily and kept across fetches. A fetch reads until the
//! line goes quiet for one read timeout, then decodes lossily.

use std::io::{ErrorKind, Read};

use bytes::BytesMut;
use contracts::{DeviceConfig, SensorKind, SensorSource};
use serialport::SerialPort;
use tracing::{debug, trace, warn};

use crate::error::{Result, SensorError};

/// Read chunk size
const READ_CHUNK: usize = 1024;

/// Upper bound on bytes collected by a single fetch
const MAX_FETCH_BYTES: usize = 64 * 1024;

/// Serial device sensor
pub struct DeviceSensor {
    config: DeviceConfig,
    port: Option<Box<dyn SerialPort>>,
}

impl DeviceSensor {
    /// Create device sensor (the port opens on first fetch)
    pub fn new(config: DeviceConfig) -> Self {
        Self { config, port: None }
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    fn open(&self) -> Result<Box<dyn SerialPort>> {
        serialport::new(&self.config.port, self.config.baud_rate)
            .timeout(self.config.read_timeout())
            .open()
            .map_err(|e| SensorError::device_open(&self.config.port, e.to_string()))
    }
}

impl SensorSource for DeviceSensor {
    fn kind(&self) -> SensorKind {
        SensorKind::Device
    }

    fn fetch(&mut self) -> String {
        if self.port.is_none() {
            match self.open() {
                Ok(port) => {
                    debug!(port = %self.config.port, baud_rate = self.config.baud_rate, "serial device opened");
                    self.port = Some(port);
                }
                Err(e) => {
                    warn!(error = %e, "serial device unavailable");
                    return String::new();
                }
            }
        }

        let Some(port) = self.port.as_mut() else {
            return String::new();
        };
        let outcome = read_until_idle(port.as_mut(), MAX_FETCH_BYTES);

        if let Some(e) = outcome.error {
            warn!(
                port = %self.config.port,
                error = %e,
                bytes = outcome.bytes.len(),
                "serial read failed, port will be reopened"
            );
            self.port = None;
        }

        trace!(port = %self.config.port, bytes = outcome.bytes.len(), "serial fetch");
        decode_lossy(&outcome.bytes)
    }
}

/// Bytes collected by one fetch plus the error that ended it, if any
pub(crate) struct ReadOutcome {
    pub bytes: BytesMut,
    pub error: Option<std::io::Error>,
}

/// Read until timeout, EOF, error or `limit` bytes
///
/// A timeout is the normal end of a fetch, not an error.
pub(crate) fn read_until_idle<R: Read + ?Sized>(reader: &mut R, limit: usize) -> ReadOutcome {
    let mut bytes = BytesMut::with_capacity(READ_CHUNK);
    let mut chunk = [0u8; READ_CHUNK];

    while bytes.len() < limit {
        match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => bytes.extend_from_slice(&chunk[..n]),
            Err(e) if e.kind() == ErrorKind::TimedOut => break,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                return ReadOutcome {
                    bytes,
                    error: Some(e),
                }
            }
        }
    }

    ReadOutcome { bytes, error: None }
}

/// Decode with U+FFFD substitution for invalid sequences
pub(crate) fn decode_lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
