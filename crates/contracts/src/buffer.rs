//! LineBuffer trait - holding area between the Periodic Writer and the Watermark Poller
//!
//! Entries are raw lines; the buffer never interprets them.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Buffer backing variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BufferKind {
    /// Append-only file, re-read in full on every drain
    File,
    /// In-process FIFO queue
    Memory,
}

impl BufferKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Memory => "memory",
        }
    }
}

impl fmt::Display for BufferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Buffer errors
#[derive(Debug, Error)]
pub enum BufferError {
    /// Backing storage I/O failure
    #[error("buffer io error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Bounded queue has no room for the line
    #[error("buffer full: capacity={capacity}")]
    Full { capacity: usize },

    /// Queue has been closed
    #[error("buffer closed")]
    Closed,

    /// `append_all` stopped part-way; the first `appended` lines are in
    #[error("append stopped after {appended} lines: {source}")]
    Partial {
        appended: usize,
        #[source]
        source: Box<BufferError>,
    },
}

impl BufferError {
    /// Create I/O error for the given backing path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap a failure that followed `appended` successful appends
    pub fn after(self, appended: usize) -> Self {
        if appended == 0 {
            return self;
        }
        Self::Partial {
            appended,
            source: Box::new(self),
        }
    }

    /// Lines accepted before the failure
    pub fn appended(&self) -> usize {
        match self {
            Self::Partial { appended, .. } => *appended,
            _ => 0,
        }
    }
}

/// FIFO line buffer
///
/// Implementations must tolerate `append` and `drain_all` being called
/// concurrently from different threads, and must never duplicate or drop a
/// line on their own. A line appended before `drain_all` starts is part of
/// that drain; a line appended during it may land in this drain or the next.
pub trait LineBuffer: Send + Sync {
    /// Backing variant (used for logging/metrics)
    fn kind(&self) -> BufferKind;

    /// Append one raw line (without its terminator)
    fn append(&self, line: &str) -> Result<(), BufferError>;

    /// Append lines in order, stopping at the first failure
    ///
    /// Lines before the failing one stay appended; the error reports how many
    /// through [`BufferError::appended`].
    fn append_all(&self, lines: &[&str]) -> Result<usize, BufferError> {
        for (appended, line) in lines.iter().enumerate() {
            self.append(line).map_err(|e| e.after(appended))?;
        }
        Ok(lines.len())
    }

    /// Yield every pending line in FIFO order
    fn drain_all(&self) -> Result<Vec<String>, BufferError>;
}
