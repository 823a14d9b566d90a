//! # Ingestion
//!
//! Producer side of the station: sensor text goes into a line buffer.
//!
//! Responsibilities:
//! - Buffer backings (append-only file log, in-process queue)
//! - Periodic Writer thread pulling from a `SensorSource` on a fixed cadence
//! - Cooperative shutdown through a shared `StopSignal`
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{build_buffer, PeriodicWriter, StopSignal};
//!
//! let buffer = build_buffer(&blueprint.buffer)?;
//! let source = sensors::build_sensor_source(&blueprint.sensor)?;
//!
//! let writer = PeriodicWriter::new(source, buffer.clone(), blueprint.writer.interval(), StopSignal::new());
//! let handle = writer.spawn()?;
//!
//! // ... poll the buffer ...
//!
//! let stats = handle.shutdown();
//! ```

mod buffer;
mod error;
mod metrics;
mod stop;
mod writer;

// Re-exports
pub use buffer::{build_buffer, FileLogBuffer, MemoryQueueBuffer};
pub use contracts::{BufferError, LineBuffer};
pub use error::{IngestionError, Result};
pub use metrics::{WriterMetrics, WriterStats};
pub use stop::StopSignal;
pub use writer::{PeriodicWriter, WriterHandle};
