//! Watermark checkpoint - the polling loop's only persistent state.
//!
//! Stored as a small JSON document, replaced atomically (temp file + rename)
//! so a crash mid-write leaves the previous checkpoint intact.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use contracts::Watermark;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{CliError, Result};

/// On-disk checkpoint document
#[derive(Debug, Serialize, Deserialize)]
struct CheckpointRecord {
    last_read: Watermark,
    updated_at: DateTime<Utc>,
}

/// Watermark checkpoint file
#[derive(Debug, Clone)]
pub struct WatermarkCheckpoint {
    path: PathBuf,
}

impl WatermarkCheckpoint {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored watermark; a missing file yields an empty watermark
    pub fn load(&self) -> Result<Watermark> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no checkpoint, starting from empty watermark");
                return Ok(Watermark::empty());
            }
            Err(e) => return Err(CliError::checkpoint(&self.path, e)),
        };

        let record: CheckpointRecord =
            serde_json::from_str(&content).map_err(|e| CliError::checkpoint(&self.path, e))?;

        info!(
            path = %self.path.display(),
            last_read = %record.last_read,
            updated_at = %record.updated_at,
            "resuming from checkpoint"
        );
        Ok(record.last_read)
    }

    /// Replace the stored watermark
    pub fn save(&self, watermark: &Watermark) -> Result<()> {
        let record = CheckpointRecord {
            last_read: watermark.clone(),
            updated_at: Utc::now(),
        };
        let json =
            serde_json::to_vec_pretty(&record).map_err(|e| CliError::checkpoint(&self.path, e))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| CliError::checkpoint(&self.path, e))?;
        }

        let tmp = self.tmp_path();
        let write = || -> std::io::Result<()> {
            let mut file = File::create(&tmp)?;
            file.write_all(&json)?;
            file.sync_all()?;
            fs::rename(&tmp, &self.path)
        };
        write().map_err(|e| CliError::checkpoint(&self.path, e))?;

        debug!(path = %self.path.display(), last_read = %watermark, "checkpoint saved");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }
}
