//! Replay Sensor - 从录制文件回放传感器数据
//!
//! Loads a recorded line file once and serves it in fixed-size slices.
//! Past the end every fetch is empty; there is no wraparound.

use std::fs;
use std::path::{Path, PathBuf};

use contracts::{ReplayConfig, SensorKind, SensorSource};
use tracing::{debug, info};

use crate::error::{Result, SensorError};

/// Replay Sensor - serves recorded lines in order
#[derive(Debug)]
pub struct ReplaySensor {
    path: PathBuf,
    lines: Vec<String>,
    lines_per_fetch: usize,
    cursor: usize,
}

impl ReplaySensor {
    /// Load the recording at `path`
    pub fn load(path: &Path, lines_per_fetch: usize) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|e| SensorError::replay_load(path, e))?;
        let lines: Vec<String> = content.lines().map(str::to_string).collect();

        info!(
            path = %path.display(),
            lines = lines.len(),
            lines_per_fetch,
            "Loaded replay sensor"
        );

        Ok(Self::from_lines(path, lines, lines_per_fetch))
    }

    /// Load from replay configuration
    pub fn from_config(config: &ReplayConfig) -> Result<Self> {
        Self::load(&config.path, config.lines_per_fetch)
    }

    /// Build from lines already in memory
    pub fn from_lines(path: impl Into<PathBuf>, lines: Vec<String>, lines_per_fetch: usize) -> Self {
        Self {
            path: path.into(),
            lines,
            lines_per_fetch: lines_per_fetch.max(1),
            cursor: 0,
        }
    }

    /// Lines not yet served
    pub fn remaining(&self) -> usize {
        self.lines.len().saturating_sub(self.cursor)
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }
}

impl SensorSource for ReplaySensor {
    fn kind(&self) -> SensorKind {
        SensorKind::Replay
    }

    fn fetch(&mut self) -> String {
        let start = self.cursor.min(self.lines.len());
        let end = (start + self.lines_per_fetch).min(self.lines.len());
        self.cursor = self.cursor.saturating_add(self.lines_per_fetch);

        if start == end {
            return String::new();
        }

        debug!(
            path = %self.path.display(),
            from = start,
            to = end,
            "replay slice served"
        );

        let mut chunk = String::new();
        for line in &self.lines[start..end] {
            chunk.push_str(line);
            chunk.push('\n');
        }
        chunk
    }
}
