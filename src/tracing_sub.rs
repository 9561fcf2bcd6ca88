//! Log plumbing. The terminal belongs to the desktop, so log lines go to a
//! bounded in-memory buffer, or to a file when one is configured.

use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing::Level;

pub const DEFAULT_MAX_LINES: usize = 2000;

#[derive(Debug)]
struct Lines {
    lines: VecDeque<String>,
    max_lines: usize,
}

impl Lines {
    fn push(&mut self, line: String) {
        self.lines.push_back(line);
        while self.lines.len() > self.max_lines {
            self.lines.pop_front();
        }
    }
}

/// Shared ring of the most recent log lines.
#[derive(Clone, Debug)]
pub struct LogBuffer {
    inner: Arc<Mutex<Lines>>,
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINES)
    }
}

impl LogBuffer {
    pub fn new(max_lines: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Lines {
                lines: VecDeque::new(),
                max_lines: max_lines.max(1),
            })),
        }
    }

    pub fn push(&self, line: impl Into<String>) {
        if let Ok(mut lines) = self.inner.lock() {
            lines.push(line.into());
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.inner
            .lock()
            .map(|lines| lines.lines.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|lines| lines.lines.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn writer(&self) -> LogBufferWriter {
        LogBufferWriter {
            buffer: self.clone(),
            pending: Vec::new(),
        }
    }
}

/// Byte sink that splits writes into lines for a [`LogBuffer`]. A partial
/// line waits for its newline or for `flush`.
#[derive(Debug)]
pub struct LogBufferWriter {
    buffer: LogBuffer,
    pending: Vec<u8>,
}

impl LogBufferWriter {
    fn push_lines(&self, bytes: &[u8]) {
        for line in String::from_utf8_lossy(bytes).split('\n') {
            if !line.is_empty() {
                self.buffer.push(line.to_string());
            }
        }
    }
}

impl Write for LogBufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        if let Some(pos) = self.pending.iter().rposition(|b| *b == b'\n') {
            let complete: Vec<u8> = self.pending.drain(..=pos).collect();
            self.push_lines(&complete);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let rest = std::mem::take(&mut self.pending);
        self.push_lines(&rest);
        Ok(())
    }
}

impl Drop for LogBufferWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

pub enum DelegatingWriter {
    Buffer(LogBufferWriter),
    File(Arc<File>),
}

impl Write for DelegatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            DelegatingWriter::Buffer(w) => w.write(buf),
            DelegatingWriter::File(f) => (&**f).write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            DelegatingWriter::Buffer(w) => w.flush(),
            DelegatingWriter::File(f) => (&**f).flush(),
        }
    }
}

#[derive(Clone, Debug)]
pub enum SubscriberMakeWriter {
    Buffer(LogBuffer),
    File(Arc<File>),
}

impl SubscriberMakeWriter {
    /// Append to `path`, creating it if needed.
    pub fn file(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::File(Arc::new(file)))
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SubscriberMakeWriter {
    type Writer = DelegatingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        match self {
            SubscriberMakeWriter::Buffer(buffer) => DelegatingWriter::Buffer(buffer.writer()),
            SubscriberMakeWriter::File(file) => DelegatingWriter::File(Arc::clone(file)),
        }
    }
}

/// Install the global subscriber at `level`, writing to `log_file` when
/// given and to the returned buffer otherwise. Later calls leave the first
/// subscriber in place.
pub fn init(level: Level, log_file: Option<&Path>) -> io::Result<LogBuffer> {
    let buffer = LogBuffer::default();
    let writer = match log_file {
        Some(path) => SubscriberMakeWriter::file(path)?,
        None => SubscriberMakeWriter::Buffer(buffer.clone()),
    };
    let installed = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .with_thread_names(false)
        .try_init()
        .is_ok();
    if installed {
        tracing::debug!(%level, "logging initialized");
    }
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_keeps_most_recent_lines() {
        let buffer = LogBuffer::new(2);
        buffer.push("one");
        buffer.push("two");
        buffer.push("three");
        assert_eq!(buffer.lines(), vec!["two", "three"]);
    }

    #[test]
    fn writer_splits_on_newlines_and_flushes_tail() {
        let buffer = LogBuffer::new(10);
        let mut writer = buffer.writer();
        writer.write_all(b"first\nsec").unwrap();
        assert_eq!(buffer.lines(), vec!["first"]);
        writer.write_all(b"ond\nthird").unwrap();
        assert_eq!(buffer.lines(), vec!["first", "second"]);
        writer.flush().unwrap();
        assert_eq!(buffer.lines(), vec!["first", "second", "third"]);
    }

    #[test]
    fn subscriber_writes_into_buffer() {
        let buffer = LogBuffer::new(10);
        let subscriber = tracing_subscriber::fmt()
            .with_writer(SubscriberMakeWriter::Buffer(buffer.clone()))
            .with_ansi(false)
            .with_max_level(Level::DEBUG)
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!(window_id = 3, "opened window");
        });
        let lines = buffer.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("opened window"));
        assert!(lines[0].contains("window_id=3"));
    }
}
