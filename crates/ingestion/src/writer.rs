//! Periodic Writer - sensor → buffer loop on its own thread
//!
//! Each iteration fetches once, appends the non-blank lines, then waits on the
//! stop signal for one interval. An in-flight fetch is never interrupted; the
//! signal is observed during the wait only.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use contracts::{LineBuffer, SensorKind, SensorSource};
use tracing::{debug, error, info, instrument, trace};

use crate::error::{IngestionError, Result};
use crate::metrics::{WriterMetrics, WriterStats};
use crate::stop::StopSignal;

/// Writer thread name
const THREAD_NAME: &str = "telemetry-writer";

/// Periodic Writer
pub struct PeriodicWriter {
    source: Box<dyn SensorSource>,
    buffer: Arc<dyn LineBuffer>,
    interval: Duration,
    stop: StopSignal,
    metrics: Arc<WriterMetrics>,
}

impl PeriodicWriter {
    /// Create writer
    ///
    /// # Arguments
    /// * `source` - Sensor to fetch from
    /// * `buffer` - Buffer shared with the poller
    /// * `interval` - Pause between fetches
    /// * `stop` - Signal ending the loop
    pub fn new(
        source: Box<dyn SensorSource>,
        buffer: Arc<dyn LineBuffer>,
        interval: Duration,
        stop: StopSignal,
    ) -> Self {
        Self {
            source,
            buffer,
            interval,
            stop,
            metrics: Arc::new(WriterMetrics::new()),
        }
    }

    pub fn metrics(&self) -> Arc<WriterMetrics> {
        self.metrics.clone()
    }

    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Run the loop on the current thread until the stop signal is set
    #[instrument(
        name = "periodic_writer",
        skip(self),
        fields(sensor = %self.source.kind(), buffer = %self.buffer.kind())
    )]
    pub fn run(mut self) -> WriterStats {
        info!(interval_ms = self.interval.as_millis() as u64, "periodic writer started");

        loop {
            self.tick();
            if self.stop.wait_timeout(self.interval) {
                break;
            }
        }

        let stats = self.metrics.snapshot();
        info!(
            fetches = stats.fetches,
            lines_appended = stats.lines_appended,
            append_failures = stats.append_failures,
            "periodic writer stopped"
        );
        stats
    }

    /// Start the loop on a named thread
    pub fn spawn(self) -> Result<WriterHandle> {
        let stop = self.stop.clone();
        let metrics = self.metrics.clone();
        let sensor = self.source.kind();

        let handle = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || self.run())
            .map_err(IngestionError::Spawn)?;

        debug!(sensor = %sensor, "writer thread spawned");

        Ok(WriterHandle {
            sensor,
            stop,
            metrics,
            handle,
        })
    }

    /// One fetch + append
    fn tick(&mut self) {
        let chunk = self.source.fetch();
        let lines: Vec<&str> = chunk.lines().filter(|l| !l.trim().is_empty()).collect();

        let sensor = self.source.kind();
        let buffer = self.buffer.kind();
        self.metrics.record_fetch(chunk.len(), lines.len());
        observability::record_sensor_fetch(sensor.as_str(), chunk.len());

        if lines.is_empty() {
            trace!("sensor returned no lines");
            return;
        }

        match self.buffer.append_all(&lines) {
            Ok(appended) => {
                self.metrics.record_appended(appended);
                observability::record_lines_appended(buffer.as_str(), appended);
                trace!(lines = appended, "lines appended");
            }
            Err(e) => {
                let appended = e.appended();
                if appended > 0 {
                    self.metrics.record_appended(appended);
                    observability::record_lines_appended(buffer.as_str(), appended);
                }
                self.metrics.record_append_failure();
                observability::record_append_failure(buffer.as_str());
                error!(
                    error = %e,
                    lines = lines.len(),
                    appended,
                    "buffer append failed"
                );
            }
        }
    }
}

/// Handle to a running writer thread
#[derive(Debug)]
pub struct WriterHandle {
    sensor: SensorKind,
    stop: StopSignal,
    metrics: Arc<WriterMetrics>,
    handle: JoinHandle<WriterStats>,
}

impl WriterHandle {
    pub fn sensor(&self) -> SensorKind {
        self.sensor
    }

    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Current counters, without stopping
    pub fn stats(&self) -> WriterStats {
        self.metrics.snapshot()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Trigger the stop signal and join the thread
    ///
    /// Returns once the last append has completed.
    pub fn shutdown(self) -> WriterStats {
        self.stop.trigger();

        match self.handle.join() {
            Ok(stats) => stats,
            Err(_) => {
                error!(sensor = %self.sensor, "writer thread panicked");
                self.metrics.snapshot()
            }
        }
    }
}
