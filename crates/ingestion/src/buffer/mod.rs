//! Line buffer backings

mod file_log;
mod memory_queue;

use std::sync::Arc;

use contracts::{BufferConfig, BufferError, LineBuffer};
use tracing::{info, instrument};

pub use file_log::FileLogBuffer;
pub use memory_queue::MemoryQueueBuffer;

/// Build the buffer selected by configuration
///
/// The returned buffer is shared between the writer thread and the poller.
#[instrument(name = "build_buffer", skip(config), fields(kind = %config.kind()))]
pub fn build_buffer(config: &BufferConfig) -> Result<Arc<dyn LineBuffer>, BufferError> {
    let buffer: Arc<dyn LineBuffer> = match config {
        BufferConfig::File(file) => Arc::new(FileLogBuffer::open(&file.path)?),
        BufferConfig::Memory(memory) => match memory.capacity {
            Some(capacity) => Arc::new(MemoryQueueBuffer::bounded(capacity)),
            None => Arc::new(MemoryQueueBuffer::unbounded()),
        },
    };

    info!(kind = %buffer.kind(), "buffer ready");
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{BufferKind, FileBufferConfig, MemoryBufferConfig};

    #[test]
    fn test_build_file_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let config = BufferConfig::File(FileBufferConfig {
            path: dir.path().join("nested").join("sensor_data.csv"),
        });

        let buffer = build_buffer(&config).unwrap();
        assert_eq!(buffer.kind(), BufferKind::File);
        assert!(dir.path().join("nested").join("sensor_data.csv").exists());
    }

    #[test]
    fn test_build_bounded_memory_buffer() {
        let config = BufferConfig::Memory(MemoryBufferConfig { capacity: Some(1) });

        let buffer = build_buffer(&config).unwrap();
        assert_eq!(buffer.kind(), BufferKind::Memory);
        buffer.append("first").unwrap();
        assert!(matches!(
            buffer.append("second"),
            Err(BufferError::Full { capacity: 1 })
        ));
    }
}
