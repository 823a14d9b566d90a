//! # Observability
//!
//! 采集站的日志与指标。
//!
//! 日志统一写 stderr，stdout 只留给 `poll` / `info` 等命令的输出。
//! 指标全部以 `telemetry_` 为前缀，只有 `run` 命令会安装 Prometheus
//! exporter；未安装时 `record_*` 调用都是空操作。
//!
//! | 指标 | 类型 | 标签 | 来源 |
//! |------|------|------|------|
//! | `telemetry_sensor_fetches_total` | counter | sensor | writer 每次读取传感器 |
//! | `telemetry_sensor_bytes_total` | counter | sensor | 读取到的字节数 |
//! | `telemetry_lines_appended_total` | counter | buffer | 写入 buffer 的行数 (含部分失败前已写入的行) |
//! | `telemetry_append_failures_total` | counter | buffer | 追加失败次数 |
//! | `telemetry_polls_total` | counter | | 成功轮询 |
//! | `telemetry_lines_drained_total` | counter | | 轮询读出的行 |
//! | `telemetry_unparseable_lines_total` | counter | format | 解析失败被丢弃的行 |
//! | `telemetry_stale_records_total` | counter | | 不晚于 watermark 的记录 |
//! | `telemetry_records_accepted_total` | counter | | 交付的记录 |
//! | `telemetry_poll_failures_total` | counter | reason | 轮询失败 |
//! | `telemetry_last_drain_lines` | gauge | | 最近一次读出的行数 |
//! | `telemetry_batch_size` | histogram | | 每批交付的记录数 |
//! | `telemetry_poll_latency_ms` | histogram | | 轮询耗时 |
//!
//! ```ignore
//! observability::init_with_config(ObservabilityConfig::from_verbosity(false, 1, LogFormat::Compact))?;
//! observability::install_exporter(9000)?;
//!
//! let (batch, report) = poller.poll_with_report(&watermark)?;
//! observability::record_poll(&report, poller.format().as_str(), elapsed_ms);
//! ```

pub mod metrics;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub use crate::metrics::{
    record_append_failure, record_lines_appended, record_poll, record_poll_failure,
    record_sensor_fetch, MetricsSummary, PollMetricsAggregator, RunningStats, StatsSummary,
};

/// Kind of a station metric, as exported to Prometheus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
    Histogram,
}

/// Every metric the station records: (name, kind, description)
pub const STATION_METRICS: &[(&str, MetricKind, &str)] = &[
    ("telemetry_sensor_fetches_total", MetricKind::Counter, "Sensor reads performed by the writer"),
    ("telemetry_sensor_bytes_total", MetricKind::Counter, "Bytes returned by sensor reads"),
    ("telemetry_lines_appended_total", MetricKind::Counter, "Lines accepted by the buffer"),
    ("telemetry_append_failures_total", MetricKind::Counter, "Buffer appends that failed"),
    ("telemetry_polls_total", MetricKind::Counter, "Successful watermark polls"),
    ("telemetry_lines_drained_total", MetricKind::Counter, "Lines read out of the buffer by polls"),
    ("telemetry_unparseable_lines_total", MetricKind::Counter, "Drained lines dropped as unparseable"),
    ("telemetry_stale_records_total", MetricKind::Counter, "Records at or before the watermark"),
    ("telemetry_records_accepted_total", MetricKind::Counter, "Records delivered past the watermark"),
    ("telemetry_poll_failures_total", MetricKind::Counter, "Polls that returned an error"),
    ("telemetry_last_drain_lines", MetricKind::Gauge, "Lines read by the most recent poll"),
    ("telemetry_batch_size", MetricKind::Histogram, "Records per delivered batch"),
    ("telemetry_poll_latency_ms", MetricKind::Histogram, "Poll duration in milliseconds"),
];

/// 日志配置
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub log_format: LogFormat,
    /// Prometheus 端口 (None = 不导出)
    pub metrics_port: Option<u16>,
    /// `RUST_LOG` 未设置时使用的过滤指令
    pub default_log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self::from_verbosity(false, 0, LogFormat::default())
    }
}

impl ObservabilityConfig {
    /// Map `-q` / `-v` flags onto a filter level, without an exporter
    pub fn from_verbosity(quiet: bool, verbose: u8, log_format: LogFormat) -> Self {
        let level = match (quiet, verbose) {
            (true, _) => "warn",
            (false, 0) => "info",
            (false, 1) => "debug",
            (false, _) => "trace",
        };
        Self {
            log_format,
            metrics_port: None,
            default_log_level: level.to_string(),
        }
    }
}

/// 日志格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON 结构化日志，带线程与源码位置
    Json,
    Pretty,
    /// 紧凑单行格式 (默认)
    #[default]
    Compact,
}

/// 初始化 tracing，并在 `metrics_port` 为 Some 时安装 exporter
///
/// `RUST_LOG` 优先于 `default_log_level`。
pub fn init_with_config(config: ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_log_level));

    let fmt_layer = match config.log_format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        LogFormat::Pretty => fmt::layer().pretty().with_writer(std::io::stderr).boxed(),
        LogFormat::Compact => fmt::layer().compact().with_writer(std::io::stderr).boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    if let Some(port) = config.metrics_port {
        install_exporter(port)?;
    }

    tracing::debug!(
        log_format = ?config.log_format,
        level = %config.default_log_level,
        "Logging initialized"
    );
    Ok(())
}

/// 在 0.0.0.0:<port> 上安装 Prometheus exporter 并登记指标说明
pub fn install_exporter(port: u16) -> Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
        .with_context(|| format!("Failed to install Prometheus exporter on port {port}"))?;
    describe_metrics();

    tracing::info!(port, metrics = STATION_METRICS.len(), "Prometheus exporter listening");
    Ok(())
}

/// Attach `# HELP` text to every station metric
pub fn describe_metrics() {
    for &(name, kind, help) in STATION_METRICS {
        match kind {
            MetricKind::Counter => ::metrics::describe_counter!(name, help),
            MetricKind::Gauge => ::metrics::describe_gauge!(name, help),
            MetricKind::Histogram => ::metrics::describe_histogram!(name, help),
        }
    }
}
