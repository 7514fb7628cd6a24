//! Structured event records.
//!
//! Every record is one JSON object on its own line, written to the primary
//! stream and, when configured, appended to a log file. The sink never fails
//! into its caller.

use std::fmt::Display;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use serde_json::json;
use tracing::{error, warn};

type Primary = Box<dyn Write + Send>;

pub struct EventSink {
    primary: Mutex<Primary>,
    log_file: Option<PathBuf>,
}

impl EventSink {
    /// Sink writing to stdout and optionally to `log_file`
    pub fn stdout(log_file: Option<PathBuf>) -> Self {
        Self::with_writer(io::stdout(), log_file)
    }

    /// Sink writing to an arbitrary primary stream
    pub fn with_writer(primary: impl Write + Send + 'static, log_file: Option<PathBuf>) -> Self {
        Self { primary: Mutex::new(Box::new(primary)), log_file }
    }

    /// Emit any serializable mapping as a single record
    pub fn emit<T: Serialize + ?Sized>(&self, record: &T) {
        match serde_json::to_string(record) {
            Ok(line) => self.write_line(&line),
            Err(e) => {
                error!("failed to serialize event record: {e}");
                self.error(format_args!("failed to serialize event record: {e}"));
            }
        }
    }

    /// `{"ALERT": message}`
    pub fn alert(&self, message: &str) {
        self.emit(&json!({ "ALERT": message }));
    }

    /// `{"error": message}`
    pub fn error(&self, message: impl Display) {
        self.emit(&json!({ "error": message.to_string() }));
    }

    fn write_line(&self, line: &str) {
        self.write_primary(line);

        if let Some(path) = &self.log_file {
            if let Err(e) = append_line(path, line) {
                warn!(path = %path.display(), "failed to write log file: {e}");
                let note = json!({ "error": format!("failed to write log file: {e}") });
                self.write_primary(&note.to_string());
            }
        }
    }

    fn write_primary(&self, line: &str) {
        let mut primary = self.primary.lock().unwrap_or_else(PoisonError::into_inner);
        let written = primary
            .write_all(format!("{line}\n").as_bytes())
            .and_then(|()| primary.flush());
        if let Err(e) = written {
            warn!("failed to write event record: {e}");
        }
    }
}

/// Open, append one newline-terminated line and close
fn append_line(path: &Path, line: &str) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(format!("{line}\n").as_bytes())
}

/// Cloneable in-memory writer, handy for capturing the primary stream
#[cfg(any(test, feature = "test-util"))]
#[derive(Clone, Default)]
pub struct SharedBuffer(std::sync::Arc<Mutex<Vec<u8>>>);

#[cfg(any(test, feature = "test-util"))]
impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Written lines parsed back into JSON values
    pub fn records(&self) -> Vec<serde_json::Value> {
        self.contents()
            .lines()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }
}

#[cfg(any(test, feature = "test-util"))]
impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::types::{CheckResult, DownReason, Endpoint};

    #[test]
    fn test_records_are_single_json_lines() {
        let buffer = SharedBuffer::new();
        let sink = EventSink::with_writer(buffer.clone(), None);

        sink.emit(&CheckResult::down(Endpoint::new("https://fail.test"), DownReason::Code(502)));
        sink.alert("⚠️ https://fail.test is Down(502)");
        sink.error("SMTP not configured, skipping email alert");

        let contents = buffer.contents();
        assert!(contents.ends_with('\n'));
        assert_eq!(contents.lines().count(), 3);

        let records = buffer.records();
        assert_eq!(records[0]["url"], "https://fail.test");
        assert_eq!(records[0]["status"], "Down(502)");
        assert_eq!(records[1]["ALERT"], "⚠️ https://fail.test is Down(502)");
        assert_eq!(records[2]["error"], "SMTP not configured, skipping email alert");
    }

    #[test]
    fn test_unicode_is_not_escaped() {
        let buffer = SharedBuffer::new();
        let sink = EventSink::with_writer(buffer.clone(), None);

        sink.alert("⚠️ down");

        assert!(buffer.contents().contains("⚠️"));
    }

    #[test]
    fn test_log_file_mirrors_primary_and_creates_parents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/deeper/checks.log");
        let buffer = SharedBuffer::new();
        let sink = EventSink::with_writer(buffer.clone(), Some(path.clone()));

        sink.alert("first");
        sink.alert("second");

        let file = fs::read_to_string(&path).unwrap();
        assert_eq!(file, buffer.contents());
        assert_eq!(file.lines().count(), 2);
    }

    #[test]
    fn test_log_file_appends_across_sinks() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("checks.log");

        EventSink::with_writer(SharedBuffer::new(), Some(path.clone())).alert("one");
        EventSink::with_writer(SharedBuffer::new(), Some(path.clone())).alert("two");

        let file = fs::read_to_string(&path).unwrap();
        assert_eq!(file.lines().count(), 2);
        assert!(file.lines().next().unwrap().contains("one"));
    }

    #[test]
    fn test_unwritable_log_file_is_reported_on_primary() {
        let dir = tempdir().unwrap();
        // A directory can't be opened for appending
        let buffer = SharedBuffer::new();
        let sink = EventSink::with_writer(buffer.clone(), Some(dir.path().to_path_buf()));

        sink.alert("still printed");

        let records = buffer.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["ALERT"], "still printed");
        let note = records[1]["error"].as_str().unwrap();
        assert!(note.starts_with("failed to write log file:"), "{note}");
    }
}
