//! Station orchestrator - wires sensor, buffer, writer and polling loop.
//!
//! Shutdown order is fixed: the polling loop stops first, then the writer's
//! stop signal is triggered and its thread joined, so the last append always
//! completes before the process exits.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::StationBlueprint;
use ingestion::{PeriodicWriter, StopSignal};
use poller::WatermarkPoller;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::scheduler::PollScheduler;
use super::StationStats;

/// Station configuration
#[derive(Debug, Clone)]
pub struct StationConfig {
    /// The station blueprint
    pub blueprint: StationBlueprint,

    /// Maximum number of poll attempts (None = unlimited)
    pub max_polls: Option<u64>,

    /// Run timeout (None = no timeout)
    pub timeout: Option<Duration>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main station orchestrator
pub struct Station {
    config: StationConfig,
}

impl Station {
    /// Create a new station with the given configuration
    pub fn new(config: StationConfig) -> Self {
        Self { config }
    }

    /// Run until `shutdown` is cancelled, the poll limit is hit or the
    /// timeout expires
    pub async fn run(self, shutdown: CancellationToken) -> Result<StationStats> {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::install_exporter(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        // Buffer + sensor
        let buffer = ingestion::build_buffer(&blueprint.buffer).context("Failed to open buffer")?;
        let source = sensors::build_sensor_source(&blueprint.sensor)
            .context("Failed to build sensor source")?;

        info!(
            sensor = %blueprint.sensor.kind(),
            buffer = %blueprint.buffer.kind(),
            format = blueprint.poller.format.as_str(),
            "Station components ready"
        );

        // Periodic Writer
        let writer = PeriodicWriter::new(
            source,
            buffer.clone(),
            blueprint.writer.interval(),
            StopSignal::new(),
        );
        let writer_handle = writer.spawn().context("Failed to start periodic writer")?;

        info!(
            interval_ms = blueprint.writer.interval_ms,
            "Periodic writer started"
        );

        // Polling loop
        let poller = WatermarkPoller::for_format(buffer, blueprint.poller.format);
        let scheduler = PollScheduler::new(poller, &blueprint.schedule, blueprint.poller.timeout())
            .with_max_polls(self.config.max_polls);

        let run_token = shutdown.child_token();
        let timer = self.config.timeout.map(|timeout| {
            let token = run_token.clone();
            tokio::spawn(async move {
                tokio::time::sleep(timeout).await;
                warn!(timeout_secs = timeout.as_secs(), "Station timed out");
                token.cancel();
            })
        });

        let outcome = scheduler.run(run_token).await;

        if let Some(timer) = timer {
            timer.abort();
        }

        // Shutdown: stop + join the writer whatever the loop returned
        info!("Stopping periodic writer...");
        let writer_stats = tokio::task::spawn_blocking(move || writer_handle.shutdown())
            .await
            .context("Failed to join periodic writer")?;

        let outcome = outcome.context("Polling loop failed")?;

        let stats = StationStats {
            poll_attempts: outcome.poll_attempts,
            records_delivered: outcome.records_delivered,
            last_watermark: outcome.last_watermark,
            duration: start_time.elapsed(),
            writer: writer_stats,
            poll_metrics: outcome.poll_metrics,
        };

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            records = stats.records_delivered,
            last_read = %stats.last_watermark,
            "Station shutdown complete"
        );

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{
        BufferConfig, ConfigVersion, FileBufferConfig, LineFormat, PollerConfig, ReplayConfig,
        ScheduleConfig, SensorConfig, WriterConfig,
    };
    use std::io::Write;

    #[tokio::test]
    async fn test_replay_station_delivers_every_line_once() {
        let dir = tempfile::tempdir().unwrap();

        let recording = dir.path().join("sample-data.csv");
        let mut file = std::fs::File::create(&recording).unwrap();
        for second in 0..25 {
            writeln!(file, "$$SIS-525,{second},21-5-24,9:40:{second:02},[NO GPS LOCK AVAILABLE]")
                .unwrap();
        }
        writeln!(file, "corrupted line").unwrap();

        let blueprint = StationBlueprint {
            version: ConfigVersion::V1,
            sensor: SensorConfig::Replay(ReplayConfig {
                path: recording,
                lines_per_fetch: 10,
            }),
            buffer: BufferConfig::File(FileBufferConfig {
                path: dir.path().join("buffer.csv"),
            }),
            writer: WriterConfig { interval_ms: 5 },
            poller: PollerConfig {
                format: LineFormat::GpsSentence,
                timeout_ms: 5_000,
            },
            schedule: ScheduleConfig {
                interval_ms: 20,
                retry_delay_ms: 10,
                checkpoint_path: Some(dir.path().join("watermark.json")),
            },
        };

        let stats = Station::new(StationConfig {
            blueprint,
            max_polls: Some(15),
            timeout: Some(Duration::from_secs(30)),
            metrics_port: None,
        })
        .run(CancellationToken::new())
        .await
        .unwrap();

        assert_eq!(stats.poll_attempts, 15);
        assert_eq!(stats.records_delivered, 25);
        assert_eq!(stats.last_watermark.as_str(), "9:40:24");
        assert_eq!(stats.writer.lines_appended, 26);
        assert!(stats.poll_metrics.total_unparseable >= 1);
    }
}
