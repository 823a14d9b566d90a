//! Polling loop - invokes the Watermark Poller on a fixed interval.
//!
//! Each poll runs on a blocking worker under a timeout. A successful poll
//! advances the watermark and checkpoints it; a failed or timed-out poll keeps
//! the watermark, waits `retry_delay`, and tries again on the next tick.

use std::time::{Duration, Instant};

use contracts::{PollReport, ScheduleConfig, TelemetryBatch, Watermark};
use observability::PollMetricsAggregator;
use poller::WatermarkPoller;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::checkpoint::WatermarkCheckpoint;
use crate::error::{CliError, Result};

/// What the loop did before it stopped
#[derive(Debug, Clone, Default)]
pub struct SchedulerOutcome {
    pub poll_attempts: u64,
    pub records_delivered: u64,
    pub last_watermark: Watermark,
    pub poll_metrics: PollMetricsAggregator,
}

/// Interval-driven poll loop
pub struct PollScheduler {
    poller: WatermarkPoller,
    interval: Duration,
    retry_delay: Duration,
    poll_timeout: Duration,
    checkpoint: Option<WatermarkCheckpoint>,
    max_polls: Option<u64>,
}

impl PollScheduler {
    pub fn new(poller: WatermarkPoller, schedule: &ScheduleConfig, poll_timeout: Duration) -> Self {
        Self {
            poller,
            interval: schedule.interval(),
            retry_delay: schedule.retry_delay(),
            poll_timeout,
            checkpoint: schedule.checkpoint_path.clone().map(WatermarkCheckpoint::new),
            max_polls: None,
        }
    }

    /// Stop after `max_polls` attempts (None = unlimited)
    pub fn with_max_polls(mut self, max_polls: Option<u64>) -> Self {
        self.max_polls = max_polls;
        self
    }

    /// Run until `shutdown` is cancelled or the poll limit is reached
    ///
    /// # Errors
    /// Fails only when an existing checkpoint cannot be read. Poll failures
    /// are retried, never returned.
    #[instrument(
        name = "poll_scheduler",
        skip(self, shutdown),
        fields(
            interval_ms = self.interval.as_millis() as u64,
            format = self.poller.format().as_str()
        )
    )]
    pub async fn run(self, shutdown: CancellationToken) -> Result<SchedulerOutcome> {
        let mut watermark = match &self.checkpoint {
            Some(checkpoint) => checkpoint.load()?,
            None => Watermark::empty(),
        };
        let mut outcome = SchedulerOutcome::default();

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(watermark = %watermark, max_polls = ?self.max_polls, "polling loop started");

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    info!("shutdown requested, leaving polling loop");
                    break;
                }
                _ = ticker.tick() => {}
            }

            outcome.poll_attempts += 1;
            let started = Instant::now();

            match self.poll_once(&watermark).await {
                Ok((batch, report)) => {
                    let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
                    observability::record_poll(&report, self.poller.format().as_str(), latency_ms);
                    outcome.poll_metrics.update(&report, latency_ms);
                    outcome.records_delivered += batch.len() as u64;

                    deliver(&batch);
                    watermark = batch.last_read;

                    if let Some(checkpoint) = &self.checkpoint {
                        if let Err(e) = checkpoint.save(&watermark) {
                            warn!(error = %e, "checkpoint save failed, watermark kept in memory");
                        }
                    }
                }
                Err(e) => {
                    let reason = e.poll_failure_reason();
                    observability::record_poll_failure(reason);
                    outcome.poll_metrics.record_failure();
                    warn!(
                        error = %e,
                        reason,
                        retry_delay_ms = self.retry_delay.as_millis() as u64,
                        "poll failed, will retry"
                    );

                    tokio::select! {
                        biased;
                        _ = shutdown.cancelled() => break,
                        _ = tokio::time::sleep(self.retry_delay) => {}
                    }
                }
            }

            if self.max_polls.is_some_and(|max| outcome.poll_attempts >= max) {
                info!(polls = outcome.poll_attempts, "reached max polls limit");
                break;
            }
        }

        outcome.last_watermark = watermark;
        Ok(outcome)
    }

    /// One poll on a blocking worker, bounded by the poll timeout
    ///
    /// A timed-out poll keeps running in the background; with a draining
    /// buffer its lines are lost to this loop.
    pub async fn poll_once(&self, watermark: &Watermark) -> Result<(TelemetryBatch, PollReport)> {
        let poller = self.poller.clone();
        let watermark = watermark.clone();
        let task = tokio::task::spawn_blocking(move || poller.poll_with_report(&watermark));

        match tokio::time::timeout(self.poll_timeout, task).await {
            Err(_) => Err(CliError::PollTimeout {
                timeout: self.poll_timeout,
            }),
            Ok(Err(join)) => Err(CliError::PollTask {
                message: join.to_string(),
            }),
            Ok(Ok(result)) => Ok(result?),
        }
    }
}

/// Hand a batch to the consumer (the structured log)
fn deliver(batch: &TelemetryBatch) {
    if batch.is_empty() {
        debug!(last_read = %batch.last_read, "no new records");
        return;
    }

    for record in &batch.read_records {
        debug!(
            time = %record.time,
            data_point = ?record.data_point,
            payload = ?record.payload,
            "record delivered"
        );
    }
    info!(records = batch.len(), last_read = %batch.last_read, "batch delivered");
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{BufferError, BufferKind, LineBuffer, LineFormat};
    use ingestion::{FileLogBuffer, MemoryQueueBuffer};
    use std::path::PathBuf;
    use std::sync::Arc;

    fn schedule(checkpoint_path: Option<PathBuf>) -> ScheduleConfig {
        ScheduleConfig {
            interval_ms: 10,
            retry_delay_ms: 10,
            checkpoint_path,
        }
    }

    fn sentence(seq: u64, time: &str) -> String {
        format!("$$SIS-525,{seq},21-5-24,{time},[NO GPS LOCK AVAILABLE]")
    }

    struct FailingBuffer;

    impl LineBuffer for FailingBuffer {
        fn kind(&self) -> BufferKind {
            BufferKind::File
        }

        fn append(&self, _line: &str) -> std::result::Result<(), BufferError> {
            Ok(())
        }

        fn drain_all(&self) -> std::result::Result<Vec<String>, BufferError> {
            Err(BufferError::io("/unavailable", std::io::Error::other("offline")))
        }
    }

    #[tokio::test]
    async fn test_runs_until_max_polls() {
        let buffer = Arc::new(MemoryQueueBuffer::unbounded());
        buffer.append(&sentence(1, "9:40:28")).unwrap();
        buffer.append(&sentence(2, "9:40:29")).unwrap();

        let poller = WatermarkPoller::for_format(buffer, LineFormat::GpsSentence);
        let outcome = PollScheduler::new(poller, &schedule(None), Duration::from_secs(5))
            .with_max_polls(Some(3))
            .run(CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome.poll_attempts, 3);
        assert_eq!(outcome.records_delivered, 2);
        assert_eq!(outcome.last_watermark.as_str(), "9:40:29");
        assert_eq!(outcome.poll_metrics.total_polls, 3);
        assert_eq!(outcome.poll_metrics.empty_polls, 2);
    }

    #[tokio::test]
    async fn test_checkpoint_resume_skips_delivered_records() {
        let dir = tempfile::tempdir().unwrap();
        let checkpoint_path = dir.path().join("watermark.json");
        let buffer = Arc::new(FileLogBuffer::open(dir.path().join("log.csv")).unwrap());
        buffer.append(&sentence(1, "9:40:28")).unwrap();

        let first = PollScheduler::new(
            WatermarkPoller::for_format(buffer.clone(), LineFormat::GpsSentence),
            &schedule(Some(checkpoint_path.clone())),
            Duration::from_secs(5),
        )
        .with_max_polls(Some(1))
        .run(CancellationToken::new())
        .await
        .unwrap();
        assert_eq!(first.records_delivered, 1);

        // Restart: the file still holds the delivered line
        buffer.append(&sentence(2, "9:40:40")).unwrap();
        let second = PollScheduler::new(
            WatermarkPoller::for_format(buffer, LineFormat::GpsSentence),
            &schedule(Some(checkpoint_path.clone())),
            Duration::from_secs(5),
        )
        .with_max_polls(Some(1))
        .run(CancellationToken::new())
        .await
        .unwrap();

        assert_eq!(second.records_delivered, 1);
        assert_eq!(second.last_watermark.as_str(), "9:40:40");
        assert_eq!(
            WatermarkCheckpoint::new(checkpoint_path).load().unwrap().as_str(),
            "9:40:40"
        );
    }

    #[tokio::test]
    async fn test_failures_are_retried_not_returned() {
        let poller = WatermarkPoller::for_format(Arc::new(FailingBuffer), LineFormat::GpsSentence);
        let outcome = PollScheduler::new(poller, &schedule(None), Duration::from_secs(5))
            .with_max_polls(Some(2))
            .run(CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome.poll_attempts, 2);
        assert_eq!(outcome.poll_metrics.failed_polls, 2);
        assert!(outcome.last_watermark.is_empty());
    }

    #[tokio::test]
    async fn test_cancellation_stops_loop() {
        let poller = WatermarkPoller::for_format(
            Arc::new(MemoryQueueBuffer::unbounded()),
            LineFormat::GpsSentence,
        );
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(
            PollScheduler::new(poller, &schedule(None), Duration::from_secs(5))
                .run(shutdown.clone()),
        );

        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown.cancel();

        let outcome = tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert!(outcome.poll_attempts >= 1);
    }

    #[tokio::test]
    async fn test_poll_once_surfaces_buffer_error() {
        let poller = WatermarkPoller::for_format(Arc::new(FailingBuffer), LineFormat::GpsSentence);
        let scheduler = PollScheduler::new(poller, &schedule(None), Duration::from_secs(5));

        let err = scheduler.poll_once(&Watermark::empty()).await.unwrap_err();
        assert_eq!(err.poll_failure_reason(), "buffer");
    }
}
