//! Error types for CLI operations.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Poll did not finish within its timeout
    #[error("Poll timed out after {}ms", timeout.as_millis())]
    PollTimeout { timeout: Duration },

    /// Poll failed inside the poller
    #[error("Poll failed: {0}")]
    Poll(#[from] poller::PollError),

    /// Blocking poll task panicked or was cancelled
    #[error("Poll task aborted: {message}")]
    PollTask { message: String },

    /// Watermark checkpoint could not be read or written
    #[error("Checkpoint error on {}: {message}", path.display())]
    Checkpoint { path: PathBuf, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn checkpoint(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Checkpoint {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Short label for the poll failure metric
    pub fn poll_failure_reason(&self) -> &'static str {
        match self {
            Self::PollTimeout { .. } => "timeout",
            Self::Poll(e) => e.reason(),
            Self::PollTask { .. } => "task",
            Self::Checkpoint { .. } => "checkpoint",
            Self::ConfigNotFound { .. } | Self::Io(_) => "io",
        }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
