//! Watermark and TelemetryBatch - Watermark Poller output
//!
//! The watermark crosses the Scheduling Loop boundary as plain text; an empty
//! string means "deliver everything available".

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{RecordTime, TelemetryRecord, TimeParseError};

/// Newest record time already delivered
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Watermark(Option<RecordTime>);

impl Watermark {
    /// No watermark: everything is new
    pub fn empty() -> Self {
        Self(None)
    }

    /// Watermark positioned at `time`
    pub fn at(time: RecordTime) -> Self {
        Self(Some(time))
    }

    /// Parse the boundary representation (empty or whitespace = no watermark)
    pub fn parse(text: &str) -> Result<Self, TimeParseError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Self::empty());
        }
        RecordTime::parse(text).map(Self::at)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    pub fn time(&self) -> Option<&RecordTime> {
        self.0.as_ref()
    }

    /// Whether a record stamped `time` lies beyond this watermark
    pub fn admits(&self, time: &RecordTime) -> bool {
        match &self.0 {
            None => true,
            Some(mark) => time.is_after(mark),
        }
    }

    /// Boundary text, empty when unset
    pub fn as_str(&self) -> &str {
        self.0.as_ref().map(RecordTime::as_str).unwrap_or("")
    }
}

impl fmt::Display for Watermark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Watermark> for String {
    fn from(watermark: Watermark) -> Self {
        watermark.0.map(String::from).unwrap_or_default()
    }
}

impl TryFrom<String> for Watermark {
    type Error = TimeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

/// Result of one poll
///
/// Records are in arrival order, which need not be timestamp order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryBatch {
    /// Watermark to pass to the next poll
    pub last_read: Watermark,

    /// Newly accepted records
    pub read_records: Vec<TelemetryRecord>,
}

impl TelemetryBatch {
    pub fn len(&self) -> usize {
        self.read_records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_records.is_empty()
    }
}

/// Line accounting for one poll
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollReport {
    /// Lines handed over by the buffer
    pub drained: usize,
    /// Empty lines skipped without parsing
    pub blank: usize,
    /// Lines dropped by the parser
    pub unparseable: usize,
    /// Parsed records at or before the input watermark
    pub stale: usize,
    /// Records placed in the batch
    pub accepted: usize,
}

impl PollReport {
    /// Every drained line is accounted for exactly once
    pub fn is_balanced(&self) -> bool {
        self.blank + self.unparseable + self.stale + self.accepted == self.drained
    }
}
