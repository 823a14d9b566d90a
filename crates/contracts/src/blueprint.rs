//! StationBlueprint - Config Loader output
//!
//! Describes one ground station run: which sensor to read, where to buffer raw
//! lines, how often to write and poll, and how the watermark is checkpointed.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{BufferKind, SensorKind};

/// Config version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete station configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationBlueprint {
    /// Config version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Sensor source selection
    pub sensor: SensorConfig,

    /// Buffer backing selection
    pub buffer: BufferConfig,

    /// Periodic Writer cadence
    #[serde(default)]
    pub writer: WriterConfig,

    /// Line format and poll timeout
    #[serde(default)]
    pub poller: PollerConfig,

    /// Scheduling loop settings
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

/// Sensor source selection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SensorConfig {
    Device(DeviceConfig),
    Replay(ReplayConfig),
    Synthetic(SyntheticConfig),
}

impl SensorConfig {
    pub fn kind(&self) -> SensorKind {
        match self {
            Self::Device(_) => SensorKind::Device,
            Self::Replay(_) => SensorKind::Replay,
            Self::Synthetic(_) => SensorKind::Synthetic,
        }
    }
}

/// Serial device settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Device path (e.g. "/dev/ttyUSB0")
    pub port: String,

    /// Baud rate
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// Read timeout; a fetch ends once no byte arrives for this long
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

impl DeviceConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

fn default_baud_rate() -> u32 {
    9600
}

fn default_read_timeout_ms() -> u64 {
    2000
}

/// File replay settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Recorded line file
    pub path: PathBuf,

    /// Lines served per fetch
    #[serde(default = "default_lines_per_fetch")]
    pub lines_per_fetch: usize,
}

fn default_lines_per_fetch() -> usize {
    10
}

/// Synthetic generator settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyntheticConfig {
    /// Line shape to emit
    #[serde(default)]
    pub shape: SyntheticShape,

    /// RNG seed (None = entropy)
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Line shape emitted by the synthetic generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyntheticShape {
    /// `<iso-datetime>,<temperature>,<altitude>`
    #[default]
    Climate,
    /// `$$SIS-<id>,<seq>,<date>,<time>,...`
    GpsSentence,
}

impl SyntheticShape {
    /// Line format the poller needs to read this shape
    pub fn line_format(&self) -> LineFormat {
        match self {
            Self::Climate => LineFormat::ClimateCsv,
            Self::GpsSentence => LineFormat::GpsSentence,
        }
    }
}

/// Buffer backing selection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BufferConfig {
    File(FileBufferConfig),
    Memory(MemoryBufferConfig),
}

impl BufferConfig {
    pub fn kind(&self) -> BufferKind {
        match self {
            Self::File(_) => BufferKind::File,
            Self::Memory(_) => BufferKind::Memory,
        }
    }
}

/// Append-only file buffer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileBufferConfig {
    /// Log file path
    pub path: PathBuf,
}

/// In-memory queue settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryBufferConfig {
    /// Queue capacity (None = unbounded)
    #[serde(default)]
    pub capacity: Option<usize>,
}

/// Periodic Writer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriterConfig {
    /// Pause between fetches
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl WriterConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
        }
    }
}

/// Raw line format understood by the poller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineFormat {
    /// `$$SIS` GPS sentences, time-of-day stamps
    #[default]
    GpsSentence,
    /// `<iso-datetime>,<temperature>,<altitude>` rows
    ClimateCsv,
}

impl LineFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GpsSentence => "gps_sentence",
            Self::ClimateCsv => "climate_csv",
        }
    }
}

/// Watermark Poller settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    /// Line format of buffered entries
    #[serde(default)]
    pub format: LineFormat,

    /// Upper bound on one poll; slower polls count as failed
    #[serde(default = "default_poll_timeout_ms")]
    pub timeout_ms: u64,
}

impl PollerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            format: LineFormat::default(),
            timeout_ms: default_poll_timeout_ms(),
        }
    }
}

/// Scheduling loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Pause between polls
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Extra wait after a failed poll
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Watermark checkpoint file (None = in memory only)
    #[serde(default)]
    pub checkpoint_path: Option<PathBuf>,
}

impl ScheduleConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            retry_delay_ms: default_retry_delay_ms(),
            checkpoint_path: None,
        }
    }
}

fn default_interval_ms() -> u64 {
    10_000
}

fn default_poll_timeout_ms() -> u64 {
    10_000
}

fn default_retry_delay_ms() -> u64 {
    5_000
}
