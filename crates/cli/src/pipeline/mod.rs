//! Station orchestration module.

mod checkpoint;
mod orchestrator;
mod scheduler;
mod stats;

pub use orchestrator::{Station, StationConfig};
pub use stats::StationStats;
