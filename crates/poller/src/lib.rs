//! # Poller
//!
//! 水位线轮询：取出缓冲区全部行，解析，过滤掉水位线之前的记录。
//!
//! 负责：
//! - 两代原始行格式的解析 (`$$SIS` GPS 语句 / 气候 CSV)
//! - 不可解析行记录日志后丢弃，不中断本次轮询
//! - 计算新的水位线（最后一条被接受记录的时间）
//!
//! 水位线的持久化由调用方负责。
//!
//! ## 使用示例
//!
//! ```ignore
//! use poller::WatermarkPoller;
//!
//! let poller = WatermarkPoller::for_format(buffer, LineFormat::GpsSentence);
//!
//! let batch = poller.poll_text("")?;
//! let next = poller.poll(&batch.last_read)?;
//! ```

mod error;
mod parser;
mod poller;

// Re-exports
pub use error::{ParseError, PollError, Result};
pub use parser::{parser_for, ClimateCsvParser, GpsSentenceParser, LineParser};
pub use poller::WatermarkPoller;

// Re-export contracts types
pub use contracts::{LineFormat, PollReport, TelemetryBatch, TelemetryRecord, Watermark};
