//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Time Model
//! - GPS sentences carry a time-of-day stamp (`H:M:S`, no date, no timezone)
//! - Climate CSV rows carry a naive ISO datetime
//! - A [`Watermark`] is the newest [`RecordTime`] already delivered; records are
//!   compared on the same day when either side lacks a date

mod blueprint;
mod buffer;
mod error;
mod record;
mod sensor_source;
mod watermark;

pub use blueprint::*;
pub use buffer::{BufferError, BufferKind, LineBuffer};
pub use error::*;
pub use record::*;
pub use sensor_source::{SensorKind, SensorSource};
pub use watermark::{PollReport, TelemetryBatch, Watermark};
