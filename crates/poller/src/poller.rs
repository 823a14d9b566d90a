//! Watermark Poller

use std::sync::Arc;

use contracts::{LineBuffer, LineFormat, PollReport, TelemetryBatch, Watermark};
use tracing::{debug, info, instrument, warn};

use crate::error::{PollError, Result};
use crate::parser::{parser_for, LineParser};

/// Drains a buffer and returns the records newer than a watermark
///
/// Stateless apart from the buffer: the caller owns the watermark and must
/// feed each returned `last_read` into the next poll.
#[derive(Clone)]
pub struct WatermarkPoller {
    buffer: Arc<dyn LineBuffer>,
    parser: Arc<dyn LineParser>,
}

impl WatermarkPoller {
    pub fn new(buffer: Arc<dyn LineBuffer>, parser: Arc<dyn LineParser>) -> Self {
        Self { buffer, parser }
    }

    /// Poller using the built-in parser for `format`
    pub fn for_format(buffer: Arc<dyn LineBuffer>, format: LineFormat) -> Self {
        Self::new(buffer, parser_for(format))
    }

    pub fn format(&self) -> LineFormat {
        self.parser.format()
    }

    /// Poll with the watermark in its text form (empty = no watermark)
    pub fn poll_text(&self, last_read: &str) -> Result<TelemetryBatch> {
        let watermark = Watermark::parse(last_read).map_err(PollError::InvalidWatermark)?;
        self.poll(&watermark)
    }

    /// Poll the buffer once
    pub fn poll(&self, watermark: &Watermark) -> Result<TelemetryBatch> {
        self.poll_with_report(watermark).map(|(batch, _)| batch)
    }

    /// Poll the buffer once, with line accounting
    ///
    /// # Errors
    /// Only a buffer failure aborts the poll. Unparseable lines are logged
    /// and counted.
    #[instrument(
        name = "watermark_poll",
        skip(self, watermark),
        fields(watermark = %watermark, format = self.parser.format().as_str())
    )]
    pub fn poll_with_report(&self, watermark: &Watermark) -> Result<(TelemetryBatch, PollReport)> {
        let lines = self.buffer.drain_all()?;

        let mut report = PollReport {
            drained: lines.len(),
            ..Default::default()
        };
        let mut read_records = Vec::new();

        for line in &lines {
            if line.trim().is_empty() {
                report.blank += 1;
                continue;
            }

            match self.parser.parse_line(line) {
                Ok(record) if watermark.admits(&record.time) => read_records.push(record),
                Ok(_) => report.stale += 1,
                Err(e) => {
                    report.unparseable += 1;
                    debug!(line = %line, reason = e.reason(), error = %e, "unparseable line dropped");
                }
            }
        }
        report.accepted = read_records.len();

        if report.unparseable > 0 {
            warn!(
                unparseable = report.unparseable,
                drained = report.drained,
                "dropped unparseable lines"
            );
        }

        let last_read = read_records
            .last()
            .map(|record| Watermark::at(record.time.clone()))
            .unwrap_or_else(|| watermark.clone());

        info!(
            drained = report.drained,
            accepted = report.accepted,
            stale = report.stale,
            last_read = %last_read,
            "poll complete"
        );

        Ok((
            TelemetryBatch {
                last_read,
                read_records,
            },
            report,
        ))
    }
}

impl std::fmt::Debug for WatermarkPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatermarkPoller")
            .field("buffer", &self.buffer.kind())
            .field("format", &self.parser.format())
            .finish()
    }
}
