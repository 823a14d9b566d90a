//! Line parsers, one per record generation
//!
//! A parser either returns a complete record or fails; a record is never
//! partially filled.

use std::sync::Arc;

use contracts::{
    ClimateReading, GpsReading, LineFormat, RecordTime, TelemetryPayload, TelemetryRecord,
};

use crate::error::ParseError;

/// Field separator shared by both formats
const SEPARATOR: char = ',';

/// Raw line → record
pub trait LineParser: Send + Sync {
    /// Format handled by this parser
    fn format(&self) -> LineFormat;

    /// Parse one raw line (without terminator)
    fn parse_line(&self, line: &str) -> Result<TelemetryRecord, ParseError>;
}

/// Parser matching the configured format
pub fn parser_for(format: LineFormat) -> Arc<dyn LineParser> {
    match format {
        LineFormat::GpsSentence => Arc::new(GpsSentenceParser),
        LineFormat::ClimateCsv => Arc::new(ClimateCsvParser),
    }
}

/// `$$SIS-<id>,<seq>,<date>,<time>,...` sentences
///
/// Token layout:
///
/// | index | content |
/// |---|---|
/// | 0 | station tag (ignored) |
/// | 1 | sequence number |
/// | 2 | date (ignored) |
/// | 3 | time of day `H:M:S` |
/// | 4, 5 | latitude, longitude |
/// | 7 | altitude |
///
/// Lines with fewer than 6 tokens report no GPS lock.
#[derive(Debug, Clone, Copy, Default)]
pub struct GpsSentenceParser;

impl GpsSentenceParser {
    const MIN_FIELDS: usize = 4;
    const FIX_FIELDS: usize = 6;
    const ALTITUDE_INDEX: usize = 7;

    /// Parse pre-split tokens
    pub fn parse_fields(&self, fields: &[&str]) -> Result<TelemetryRecord, ParseError> {
        if fields.len() < Self::MIN_FIELDS {
            return Err(ParseError::TooFewFields {
                expected: Self::MIN_FIELDS,
                found: fields.len(),
            });
        }

        let data_point = fields[1]
            .trim()
            .parse::<u64>()
            .map_err(|_| ParseError::BadSequence(fields[1].to_string()))?;
        let time = RecordTime::parse_time_of_day(fields[3])?;

        let reading = if fields.len() < Self::FIX_FIELDS {
            GpsReading::no_fix()
        } else {
            let altitude = fields
                .get(Self::ALTITUDE_INDEX)
                .ok_or(ParseError::TooFewFields {
                    expected: Self::ALTITUDE_INDEX + 1,
                    found: fields.len(),
                })?;

            GpsReading {
                latitude: parse_coordinate(fields[4])?,
                longitude: parse_coordinate(fields[5])?,
                altitude: altitude
                    .trim()
                    .parse()
                    .map_err(|_| ParseError::BadAltitude(altitude.to_string()))?,
            }
        };

        Ok(TelemetryRecord {
            time,
            data_point: Some(data_point),
            payload: TelemetryPayload::Gps(reading),
        })
    }
}

impl LineParser for GpsSentenceParser {
    fn format(&self) -> LineFormat {
        LineFormat::GpsSentence
    }

    fn parse_line(&self, line: &str) -> Result<TelemetryRecord, ParseError> {
        let fields: Vec<&str> = line.trim().split(SEPARATOR).collect();
        self.parse_fields(&fields)
    }
}

fn parse_coordinate(text: &str) -> Result<f64, ParseError> {
    text.trim()
        .parse()
        .map_err(|_| ParseError::BadCoordinate(text.to_string()))
}

/// `<iso-datetime>,<temperature>,<altitude>` rows
///
/// Extra trailing fields are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClimateCsvParser;

impl ClimateCsvParser {
    const MIN_FIELDS: usize = 3;
}

impl LineParser for ClimateCsvParser {
    fn format(&self) -> LineFormat {
        LineFormat::ClimateCsv
    }

    fn parse_line(&self, line: &str) -> Result<TelemetryRecord, ParseError> {
        let fields: Vec<&str> = line.trim().split(SEPARATOR).collect();
        if fields.len() < Self::MIN_FIELDS {
            return Err(ParseError::TooFewFields {
                expected: Self::MIN_FIELDS,
                found: fields.len(),
            });
        }

        let time = RecordTime::parse_datetime(fields[0])?;
        let temperature = fields[1]
            .trim()
            .parse()
            .map_err(|_| ParseError::BadTemperature(fields[1].to_string()))?;
        let altitude = fields[2]
            .trim()
            .parse()
            .map_err(|_| ParseError::BadAltitude(fields[2].to_string()))?;

        Ok(TelemetryRecord {
            time,
            data_point: None,
            payload: TelemetryPayload::Climate(ClimateReading {
                temperature,
                altitude,
            }),
        })
    }
}
