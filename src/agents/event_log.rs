//! Append-only event logs.
//!
//! Every agent (and the message bus) records what it does into an
//! [`EventLog`]. The log is injected, so it can be an in-memory buffer, a
//! JSON-lines file, or a no-op. All implementations mirror events to
//! `tracing` at debug level.

use crate::types::{AgentEvent, AppError, Result};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub trait EventLog: Send + Sync {
    /// Append one event.
    fn record(&self, event: AgentEvent);

    /// Snapshot of the retained events, oldest first.
    fn events(&self) -> Vec<AgentEvent>;

    /// Number of retained events.
    fn len(&self) -> usize {
        self.events().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn trace_event(source: &str, event: &AgentEvent) {
    tracing::debug!(
        source,
        event = %event.event,
        fields = %serde_json::Value::Object(event.fields.clone()),
        "agent event"
    );
}

/// Keeps every event in memory.
pub struct MemoryEventLog {
    source: String,
    events: Mutex<Vec<AgentEvent>>,
}

impl MemoryEventLog {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn shared(source: impl Into<String>) -> Arc<dyn EventLog> {
        Arc::new(Self::new(source))
    }
}

impl EventLog for MemoryEventLog {
    fn record(&self, event: AgentEvent) {
        trace_event(&self.source, &event);
        self.events.lock().push(event);
    }

    fn events(&self) -> Vec<AgentEvent> {
        self.events.lock().clone()
    }

    fn len(&self) -> usize {
        self.events.lock().len()
    }
}

/// Discards everything.
#[derive(Default)]
pub struct NoopEventLog;

impl EventLog for NoopEventLog {
    fn record(&self, _event: AgentEvent) {}

    fn events(&self) -> Vec<AgentEvent> {
        Vec::new()
    }

    fn len(&self) -> usize {
        0
    }
}

/// Appends each event as a JSON line to a file and keeps an in-memory copy.
pub struct JsonlEventLog {
    path: PathBuf,
    inner: MemoryEventLog,
    file: Mutex<File>,
}

impl JsonlEventLog {
    pub fn open(source: impl Into<String>, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| AppError::Internal(format!("Failed to create log directory: {}", e)))?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| AppError::Internal(format!("Failed to open event log {}: {}", path.display(), e)))?;

        Ok(Self {
            path,
            inner: MemoryEventLog::new(source),
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventLog for JsonlEventLog {
    fn record(&self, event: AgentEvent) {
        let mut record = serde_json::Map::new();
        record.insert("source".into(), self.inner.source.clone().into());
        if let Ok(serde_json::Value::Object(fields)) = serde_json::to_value(&event) {
            record.extend(fields);
        }

        if let Err(e) = writeln!(self.file.lock(), "{}", serde_json::Value::Object(record)) {
            tracing::warn!(path = %self.path.display(), "Failed to write event log line: {}", e);
        }
        self.inner.record(event);
    }

    fn events(&self) -> Vec<AgentEvent> {
        self.inner.events()
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}
