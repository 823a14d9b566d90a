//! Poller 错误类型

use contracts::{BufferError, TimeParseError};
use thiserror::Error;

/// 单行解析失败
///
/// Never escapes a poll: the line is logged and dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// 字段数不足
    #[error("expected at least {expected} fields, found {found}")]
    TooFewFields { expected: usize, found: usize },

    /// 序号不是整数
    #[error("invalid sequence number '{0}'")]
    BadSequence(String),

    /// 时间戳格式错误
    #[error(transparent)]
    BadTime(#[from] TimeParseError),

    /// 经纬度不是数字
    #[error("invalid coordinate '{0}'")]
    BadCoordinate(String),

    /// 高度不是整数
    #[error("invalid altitude '{0}'")]
    BadAltitude(String),

    /// 温度不是整数
    #[error("invalid temperature '{0}'")]
    BadTemperature(String),
}

impl ParseError {
    /// Short label for logs and metrics
    pub fn reason(&self) -> &'static str {
        match self {
            Self::TooFewFields { .. } => "too_few_fields",
            Self::BadSequence(_) => "bad_sequence",
            Self::BadTime(_) => "bad_time",
            Self::BadCoordinate(_) => "bad_coordinate",
            Self::BadAltitude(_) => "bad_altitude",
            Self::BadTemperature(_) => "bad_temperature",
        }
    }
}

/// 轮询失败
#[derive(Debug, Error)]
pub enum PollError {
    /// 缓冲区读取失败（本次轮询失败，由调用方决定是否重试）
    #[error("buffer drain failed: {0}")]
    Buffer(#[from] BufferError),

    /// 调用方传入的水位线文本无法解析
    #[error("invalid watermark: {0}")]
    InvalidWatermark(#[source] TimeParseError),
}

impl PollError {
    /// Short label for logs and metrics
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Buffer(_) => "buffer",
            Self::InvalidWatermark(_) => "invalid_watermark",
        }
    }
}

/// Poller Result 类型别名
pub type Result<T> = std::result::Result<T, PollError>;
