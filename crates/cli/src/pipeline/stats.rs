//! Station run statistics.

use std::time::Duration;

use contracts::Watermark;
use ingestion::WriterStats;
use observability::PollMetricsAggregator;

/// Statistics from a station run
#[derive(Debug, Clone, Default)]
pub struct StationStats {
    /// Poll attempts, successful or not
    pub poll_attempts: u64,

    /// Records delivered across all batches
    pub records_delivered: u64,

    /// Watermark at shutdown
    pub last_watermark: Watermark,

    /// Total duration of the run
    pub duration: Duration,

    /// Periodic Writer counters
    pub writer: WriterStats,

    /// Poll metrics aggregator
    pub poll_metrics: PollMetricsAggregator,
}

impl StationStats {
    /// Delivered records per second
    pub fn records_per_sec(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.records_delivered as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                     Station Statistics                       ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Poll attempts: {}", self.poll_attempts);
        println!("   ├─ Records delivered: {}", self.records_delivered);
        println!("   ├─ Records/s: {:.2}", self.records_per_sec());
        println!(
            "   └─ Last watermark: {}",
            if self.last_watermark.is_empty() {
                "(none)"
            } else {
                self.last_watermark.as_str()
            }
        );

        println!("\n📥 Periodic Writer");
        println!("   ├─ Sensor fetches: {}", self.writer.fetches);
        println!("   ├─ Empty fetches: {}", self.writer.empty_fetches);
        println!("   ├─ Bytes fetched: {}", self.writer.bytes_fetched);
        println!("   ├─ Lines appended: {}", self.writer.lines_appended);
        println!("   └─ Append failures: {}", self.writer.append_failures);

        let summary = self.poll_metrics.summary();

        println!("\n📈 Watermark Poller");
        println!(
            "   ├─ Polls: {} ok / {} empty / {} failed ({:.2}%)",
            summary.total_polls, summary.empty_polls, summary.failed_polls, summary.failure_rate
        );
        println!(
            "   ├─ Unparseable lines: {} ({:.2}%)",
            summary.total_unparseable, summary.unparseable_rate
        );
        println!("   ├─ Stale records: {}", summary.total_stale);
        println!("   ├─ Batch size: {}", summary.batch_size);
        println!("   └─ Poll latency (ms): {}", summary.poll_latency_ms);

        println!();
    }
}
