//! TelemetryRecord - Line Parser output
//!
//! One observation decoded from a raw sensor line. Immutable once built.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Time-of-day wire format. Hour and minute may arrive without leading zeros.
pub const TIME_OF_DAY_FORMAT: &str = "%H:%M:%S";

/// Datetime format accepted in addition to ISO-8601 `T` separated stamps
const SPACED_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Timestamp text that could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid timestamp '{text}'")]
pub struct TimeParseError {
    pub text: String,
}

impl TimeParseError {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}

/// Parsed instant of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Moment {
    /// Time of day only (GPS sentences)
    TimeOfDay(NaiveTime),
    /// Full naive datetime (climate rows)
    DateTime(NaiveDateTime),
}

impl Moment {
    /// Time-of-day component
    pub fn time_of_day(&self) -> NaiveTime {
        match self {
            Self::TimeOfDay(time) => *time,
            Self::DateTime(datetime) => datetime.time(),
        }
    }
}

/// Record timestamp
///
/// Keeps the text exactly as received (`9:40:28` stays `9:40:28`) next to
/// its parsed [`Moment`]. Serialized as the raw text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordTime {
    raw: String,
    moment: Moment,
}

impl RecordTime {
    /// Parse either a datetime or a time-of-day stamp
    pub fn parse(text: &str) -> Result<Self, TimeParseError> {
        Self::parse_datetime(text).or_else(|_| Self::parse_time_of_day(text))
    }

    /// Parse a time-of-day stamp (`H:M:S`)
    pub fn parse_time_of_day(text: &str) -> Result<Self, TimeParseError> {
        let text = text.trim();
        let time = NaiveTime::parse_from_str(text, TIME_OF_DAY_FORMAT)
            .map_err(|_| TimeParseError::new(text))?;
        Ok(Self {
            raw: text.to_string(),
            moment: Moment::TimeOfDay(time),
        })
    }

    /// Parse a naive ISO datetime (`T` or space separated, optional fraction)
    pub fn parse_datetime(text: &str) -> Result<Self, TimeParseError> {
        let text = text.trim();
        let datetime = NaiveDateTime::from_str(text)
            .or_else(|_| NaiveDateTime::parse_from_str(text, SPACED_DATETIME_FORMAT))
            .map_err(|_| TimeParseError::new(text))?;
        Ok(Self {
            raw: text.to_string(),
            moment: Moment::DateTime(datetime),
        })
    }

    /// Text as received
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn moment(&self) -> Moment {
        self.moment
    }

    /// Strictly later than `other`
    ///
    /// Two datetimes compare fully. Any pair involving a time-of-day stamp
    /// compares on time of day alone, so a sequence crossing midnight is
    /// misordered.
    pub fn is_after(&self, other: &RecordTime) -> bool {
        match (self.moment, other.moment) {
            (Moment::DateTime(a), Moment::DateTime(b)) => a > b,
            (a, b) => a.time_of_day() > b.time_of_day(),
        }
    }
}

impl fmt::Display for RecordTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<RecordTime> for String {
    fn from(time: RecordTime) -> Self {
        time.raw
    }
}

impl TryFrom<String> for RecordTime {
    type Error = TimeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

/// One telemetry observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    /// Record timestamp
    pub time: RecordTime,

    /// Sequence number assigned by the sensor (GPS sentences only)
    pub data_point: Option<u64>,

    /// Measured values
    pub payload: TelemetryPayload,
}

/// Record payload, one variant per sensor generation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TelemetryPayload {
    /// GPS position from `$$SIS` sentences
    Gps(GpsReading),
    /// Temperature/altitude from climate rows
    Climate(ClimateReading),
}

/// GPS position
///
/// Without a satellite lock the coordinates are NaN and the altitude is 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsReading {
    /// Latitude (degrees)
    pub latitude: f64,

    /// Longitude (degrees)
    pub longitude: f64,

    /// Altitude (metres)
    pub altitude: i64,
}

impl GpsReading {
    /// Reading for a sensor reporting no GPS lock
    pub fn no_fix() -> Self {
        Self {
            latitude: f64::NAN,
            longitude: f64::NAN,
            altitude: 0,
        }
    }

    pub fn has_fix(&self) -> bool {
        !self.latitude.is_nan() && !self.longitude.is_nan()
    }
}

/// Temperature and altitude sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClimateReading {
    /// Temperature (degrees Celsius)
    pub temperature: i64,

    /// Altitude (metres)
    pub altitude: i64,
}
