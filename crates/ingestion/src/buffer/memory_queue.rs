//! In-process FIFO buffer
//!
//! Backed by an `async_channel` used through its non-blocking API only, so
//! the writer thread and the poller never wait on each other.

use async_channel::{Receiver, Sender, TryRecvError, TrySendError};
use contracts::{BufferError, BufferKind, LineBuffer};
use tracing::{trace, warn};

/// Multi-producer multi-consumer line queue
#[derive(Debug, Clone)]
pub struct MemoryQueueBuffer {
    tx: Sender<String>,
    rx: Receiver<String>,
}

impl MemoryQueueBuffer {
    /// Queue without a capacity limit
    pub fn unbounded() -> Self {
        let (tx, rx) = async_channel::unbounded();
        Self { tx, rx }
    }

    /// Queue holding at most `capacity` lines (at least one)
    pub fn bounded(capacity: usize) -> Self {
        let (tx, rx) = async_channel::bounded(capacity.max(1));
        Self { tx, rx }
    }

    /// Pending lines
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Capacity (None = unbounded)
    pub fn capacity(&self) -> Option<usize> {
        self.tx.capacity()
    }
}

impl LineBuffer for MemoryQueueBuffer {
    fn kind(&self) -> BufferKind {
        BufferKind::Memory
    }

    fn append(&self, line: &str) -> Result<(), BufferError> {
        self.tx.try_send(line.to_string()).map_err(|e| match e {
            TrySendError::Full(_) => {
                let capacity = self.capacity().unwrap_or_default();
                warn!(capacity, "memory buffer full, line rejected");
                BufferError::Full { capacity }
            }
            TrySendError::Closed(_) => BufferError::Closed,
        })
    }

    fn drain_all(&self) -> Result<Vec<String>, BufferError> {
        let mut lines = Vec::with_capacity(self.rx.len());
        loop {
            match self.rx.try_recv() {
                Ok(line) => lines.push(line),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Closed) => return Err(BufferError::Closed),
            }
        }

        trace!(lines = lines.len(), "memory buffer drained");
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_drain_is_fifo_and_destructive() {
        let buffer = MemoryQueueBuffer::unbounded();
        buffer.append_all(&["a", "b", "c"]).unwrap();
        assert_eq!(buffer.len(), 3);

        assert_eq!(buffer.drain_all().unwrap(), vec!["a", "b", "c"]);
        assert!(buffer.is_empty());
        assert!(buffer.drain_all().unwrap().is_empty());
    }

    #[test]
    fn test_bounded_full_is_an_error() {
        let buffer = MemoryQueueBuffer::bounded(2);
        assert_eq!(buffer.capacity(), Some(2));

        // append_all stops at the first failure; earlier lines stay queued
        let err = buffer.append_all(&["a", "b", "c"]).unwrap_err();
        assert_eq!(err.appended(), 2);
        match err {
            BufferError::Partial { source, .. } => {
                assert!(matches!(*source, BufferError::Full { capacity: 2 }))
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(buffer.drain_all().unwrap(), vec!["a", "b"]);

        // Room again after a drain
        buffer.append("d").unwrap();
        assert_eq!(buffer.drain_all().unwrap(), vec!["d"]);
    }

    #[test]
    fn test_concurrent_appends_then_drain() {
        let buffer = Arc::new(MemoryQueueBuffer::unbounded());
        let threads = 8;
        let per_thread = 250;

        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let buffer = buffer.clone();
                thread::spawn(move || {
                    for i in 0..per_thread {
                        buffer.append(&format!("t{t}-{i}")).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let lines = buffer.drain_all().unwrap();
        assert_eq!(lines.len(), threads * per_thread);

        // Per-producer order survives
        for t in 0..threads {
            let prefix = format!("t{t}-");
            let own: Vec<usize> = lines
                .iter()
                .filter_map(|l| l.strip_prefix(&prefix))
                .map(|i| i.parse().unwrap())
                .collect();
            assert_eq!(own, (0..per_thread).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_drain_racing_appends_loses_nothing() {
        let buffer = Arc::new(MemoryQueueBuffer::unbounded());
        let total = 2_000;

        let producer = {
            let buffer = buffer.clone();
            thread::spawn(move || {
                for i in 0..total {
                    buffer.append(&i.to_string()).unwrap();
                }
            })
        };

        let mut seen = Vec::new();
        while seen.len() < total {
            seen.extend(buffer.drain_all().unwrap());
            if producer.is_finished() {
                seen.extend(buffer.drain_all().unwrap());
                break;
            }
        }
        producer.join().unwrap();
        seen.extend(buffer.drain_all().unwrap());

        let expected: Vec<String> = (0..total).map(|i| i.to_string()).collect();
        assert_eq!(seen, expected);
    }
}
