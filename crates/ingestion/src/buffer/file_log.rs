//! Append-only file buffer
//!
//! The file is the durability mechanism: every drain re-reads it in full and
//! nothing is ever removed. There is no compaction, so the file grows without
//! bound and drain cost grows with it.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use contracts::{BufferError, BufferKind, LineBuffer};
use parking_lot::Mutex;
use tracing::{debug, error, warn};

/// Append-only line log backed by a file
#[derive(Debug)]
pub struct FileLogBuffer {
    path: PathBuf,
    /// Serialises appends against each other and against drains
    log: Mutex<LogFile>,
}

#[derive(Debug)]
struct LogFile {
    file: File,
    /// The file may end inside a line (torn tail or failed write); the next
    /// append must start on a fresh line
    needs_newline: bool,
}

impl FileLogBuffer {
    /// Open (or create) the log at `path`, creating parent directories
    pub fn open(path: impl AsRef<Path>) -> Result<Self, BufferError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| BufferError::io(parent, e))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)
            .map_err(|e| BufferError::io(&path, e))?;

        let needs_newline = ends_mid_line(&file).map_err(|e| BufferError::io(&path, e))?;
        if needs_newline {
            warn!(path = %path.display(), "file buffer ends with a partial line");
        }

        debug!(path = %path.display(), "file buffer opened");

        Ok(Self {
            path,
            log: Mutex::new(LogFile {
                file,
                needs_newline,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_lines(&self, log: &mut LogFile, lines: &[&str]) -> Result<(), BufferError> {
        let mut chunk = String::new();
        if log.needs_newline {
            chunk.push('\n');
        }
        for line in lines {
            chunk.push_str(line.trim_end_matches(['\r', '\n']));
            chunk.push('\n');
        }

        // A partial write leaves an unknown tail; a spare newline only adds a
        // blank line, which drains skip
        log.needs_newline = true;
        log.file
            .write_all(chunk.as_bytes())
            .and_then(|()| log.file.flush())
            .map_err(|e| {
                error!(path = %self.path.display(), error = %e, "file buffer append failed");
                BufferError::io(&self.path, e)
            })?;
        log.needs_newline = false;
        Ok(())
    }
}

/// Whether the file is non-empty and its last byte is not `\n`
fn ends_mid_line(mut file: &File) -> std::io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

impl LineBuffer for FileLogBuffer {
    fn kind(&self) -> BufferKind {
        BufferKind::File
    }

    fn append(&self, line: &str) -> Result<(), BufferError> {
        let mut log = self.log.lock();
        self.write_lines(&mut log, &[line])
    }

    fn append_all(&self, lines: &[&str]) -> Result<usize, BufferError> {
        if lines.is_empty() {
            return Ok(0);
        }
        let mut log = self.log.lock();
        self.write_lines(&mut log, lines)?;
        Ok(lines.len())
    }

    fn drain_all(&self) -> Result<Vec<String>, BufferError> {
        let _guard = self.log.lock();

        let bytes = fs::read(&self.path).map_err(|e| {
            error!(path = %self.path.display(), error = %e, "file buffer read failed");
            BufferError::io(&self.path, e)
        })?;

        let lines: Vec<String> = String::from_utf8_lossy(&bytes)
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect();

        debug!(path = %self.path.display(), lines = lines.len(), "file buffer drained");
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_drain_is_fifo_and_non_destructive() {
        let dir = tempfile::tempdir().unwrap();
        let buffer = FileLogBuffer::open(dir.path().join("log.csv")).unwrap();

        buffer.append("a").unwrap();
        buffer.append_all(&["b", "c"]).unwrap();

        assert_eq!(buffer.drain_all().unwrap(), vec!["a", "b", "c"]);
        // Re-read in full on every drain
        assert_eq!(buffer.drain_all().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_reopen_keeps_existing_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");

        FileLogBuffer::open(&path).unwrap().append("before").unwrap();
        let reopened = FileLogBuffer::open(&path).unwrap();
        reopened.append("after").unwrap();

        assert_eq!(reopened.drain_all().unwrap(), vec!["before", "after"]);
    }

    #[test]
    fn test_blank_lines_and_terminators() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        fs::write(&path, "x\n\n   \r\ny\r\n").unwrap();

        let buffer = FileLogBuffer::open(&path).unwrap();
        buffer.append("z\r\n").unwrap();

        assert_eq!(buffer.drain_all().unwrap(), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_partial_tail_does_not_swallow_next_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        fs::write(&path, "$$SIS-525,8,21-5-24,9:40:28,[NO GPS").unwrap();

        let buffer = FileLogBuffer::open(&path).unwrap();
        buffer
            .append("$$SIS-525,9,21-5-24,9:40:29,[NO GPS LOCK AVAILABLE]")
            .unwrap();

        assert_eq!(
            buffer.drain_all().unwrap(),
            vec![
                "$$SIS-525,8,21-5-24,9:40:28,[NO GPS",
                "$$SIS-525,9,21-5-24,9:40:29,[NO GPS LOCK AVAILABLE]",
            ]
        );
    }

    #[test]
    fn test_complete_file_is_not_padded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        fs::write(&path, "a\n").unwrap();

        FileLogBuffer::open(&path).unwrap().append("b").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "a\nb\n");
    }

    #[test]
    fn test_write_after_failed_append_starts_fresh_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        let buffer = FileLogBuffer::open(&path).unwrap();

        // State a torn write leaves behind
        {
            let mut log = buffer.log.lock();
            log.file.write_all(b"$$SIS-525,3,21-5").unwrap();
            log.needs_newline = true;
        }
        buffer.append("$$SIS-525,4,21-5-24,9:40:31,[NO GPS LOCK AVAILABLE]").unwrap();

        let lines = buffer.drain_all().unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "$$SIS-525,4,21-5-24,9:40:31,[NO GPS LOCK AVAILABLE]");
        assert!(!buffer.log.lock().needs_newline);
    }

    #[test]
    fn test_invalid_utf8_is_substituted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        fs::write(&path, b"ok\n\xff\xfe\n").unwrap();

        let lines = FileLogBuffer::open(&path).unwrap().drain_all().unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains('\u{FFFD}'));
    }

    #[test]
    fn test_concurrent_appends_are_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let buffer = Arc::new(FileLogBuffer::open(dir.path().join("log.csv")).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let buffer = buffer.clone();
                thread::spawn(move || {
                    for i in 0..50 {
                        buffer.append(&format!("t{t}-{i}")).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let mut lines = buffer.drain_all().unwrap();
        assert_eq!(lines.len(), 400);
        lines.sort();
        lines.dedup();
        assert_eq!(lines.len(), 400);
    }

    #[test]
    fn test_drain_fails_when_file_removed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        let buffer = FileLogBuffer::open(&path).unwrap();

        fs::remove_file(&path).unwrap();
        assert!(matches!(buffer.drain_all(), Err(BufferError::Io { .. })));
    }
}
