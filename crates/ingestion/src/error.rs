//! Ingestion 错误类型

use contracts::BufferError;
use thiserror::Error;

/// Ingestion 错误
#[derive(Debug, Error)]
pub enum IngestionError {
    /// 缓冲区构建或访问失败
    #[error(transparent)]
    Buffer(#[from] BufferError),

    /// 写入线程启动失败
    #[error("failed to spawn writer thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Ingestion Result 类型别名
pub type Result<T> = std::result::Result<T, IngestionError>;
