//! 遥测指标收集模块
//!
//! Prometheus 计数器 + 基于 PollReport 的内存聚合统计。

use contracts::PollReport;
use metrics::{counter, gauge, histogram};

/// 记录一次传感器读取
pub fn record_sensor_fetch(sensor: &str, bytes: usize) {
    counter!("telemetry_sensor_fetches_total", "sensor" => sensor.to_string()).increment(1);
    counter!("telemetry_sensor_bytes_total", "sensor" => sensor.to_string())
        .increment(bytes as u64);
}

/// 记录写入缓冲区的行数
pub fn record_lines_appended(buffer: &str, lines: usize) {
    counter!("telemetry_lines_appended_total", "buffer" => buffer.to_string())
        .increment(lines as u64);
}

/// 记录缓冲区写入失败
pub fn record_append_failure(buffer: &str) {
    counter!("telemetry_append_failures_total", "buffer" => buffer.to_string()).increment(1);
}

/// 从 PollReport 记录一次成功轮询
///
/// # Example
///
/// ```ignore
/// let (batch, report) = poller.poll_with_report(&watermark)?;
/// observability::metrics::record_poll(&report, "gps_sentence", elapsed_ms);
/// ```
pub fn record_poll(report: &PollReport, format: &str, latency_ms: f64) {
    counter!("telemetry_polls_total").increment(1);

    counter!("telemetry_lines_drained_total").increment(report.drained as u64);
    gauge!("telemetry_last_drain_lines").set(report.drained as f64);

    if report.unparseable > 0 {
        counter!("telemetry_unparseable_lines_total", "format" => format.to_string())
            .increment(report.unparseable as u64);
    }

    if report.stale > 0 {
        counter!("telemetry_stale_records_total").increment(report.stale as u64);
    }

    counter!("telemetry_records_accepted_total").increment(report.accepted as u64);
    histogram!("telemetry_batch_size").record(report.accepted as f64);
    histogram!("telemetry_poll_latency_ms").record(latency_ms);
}

/// 记录轮询失败 (reason: buffer / timeout / invalid_watermark / ...)
pub fn record_poll_failure(reason: &str) {
    counter!("telemetry_poll_failures_total", "reason" => reason.to_string()).increment(1);
}

/// 轮询指标聚合器
///
/// 在内存中聚合指标，便于运行结束时输出摘要。
#[derive(Debug, Clone, Default)]
pub struct PollMetricsAggregator {
    /// 成功轮询次数
    pub total_polls: u64,

    /// 无新记录的轮询次数
    pub empty_polls: u64,

    /// 失败轮询次数
    pub failed_polls: u64,

    /// 取出的总行数
    pub total_drained: u64,

    /// 接受的记录总数
    pub total_accepted: u64,

    /// 丢弃的不可解析行
    pub total_unparseable: u64,

    /// 水位线之前的旧记录
    pub total_stale: u64,

    /// 批大小统计
    pub batch_stats: RunningStats,

    /// 轮询耗时统计 (毫秒)
    pub latency_stats: RunningStats,
}

impl PollMetricsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(&mut self, report: &PollReport, latency_ms: f64) {
        self.total_polls += 1;
        if report.accepted == 0 {
            self.empty_polls += 1;
        }

        self.total_drained += report.drained as u64;
        self.total_accepted += report.accepted as u64;
        self.total_unparseable += report.unparseable as u64;
        self.total_stale += report.stale as u64;

        self.batch_stats.push(report.accepted as f64);
        self.latency_stats.push(latency_ms);
    }

    /// 记录一次失败轮询
    pub fn record_failure(&mut self) {
        self.failed_polls += 1;
    }

    /// 生成摘要报告
    pub fn summary(&self) -> MetricsSummary {
        let attempts = self.total_polls + self.failed_polls;
        MetricsSummary {
            total_polls: self.total_polls,
            empty_polls: self.empty_polls,
            failed_polls: self.failed_polls,
            total_accepted: self.total_accepted,
            total_unparseable: self.total_unparseable,
            total_stale: self.total_stale,
            failure_rate: if attempts > 0 {
                self.failed_polls as f64 / attempts as f64 * 100.0
            } else {
                0.0
            },
            unparseable_rate: if self.total_drained > 0 {
                self.total_unparseable as f64 / self.total_drained as f64 * 100.0
            } else {
                0.0
            },
            batch_size: StatsSummary::from(&self.batch_stats),
            poll_latency_ms: StatsSummary::from(&self.latency_stats),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_polls: u64,
    pub empty_polls: u64,
    pub failed_polls: u64,
    pub total_accepted: u64,
    pub total_unparseable: u64,
    pub total_stale: u64,
    pub failure_rate: f64,
    pub unparseable_rate: f64,
    pub batch_size: StatsSummary,
    pub poll_latency_ms: StatsSummary,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Poll Metrics Summary ===")?;
        writeln!(
            f,
            "Polls: {} ok, {} empty, {} failed ({:.2}%)",
            self.total_polls, self.empty_polls, self.failed_polls, self.failure_rate
        )?;
        writeln!(f, "Records accepted: {}", self.total_accepted)?;
        writeln!(
            f,
            "Unparseable lines: {} ({:.2}%)",
            self.total_unparseable, self.unparseable_rate
        )?;
        writeln!(f, "Stale records: {}", self.total_stale)?;
        writeln!(f, "Batch size: {}", self.batch_size)?;
        writeln!(f, "Poll latency (ms): {}", self.poll_latency_ms)?;
        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 样本方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
