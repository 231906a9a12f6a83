//! Activity log and room-state sinks.
//!
//! Rooms never touch the filesystem. They hand records to a sink handle,
//! which queues them for a writer task that owns the backend. Backend
//! failures are logged and swallowed: chat keeps working when durability
//! does not.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::warn;

pub mod file;
pub mod noop;

pub use file::{FileActivityLog, FileStateStore};
pub use noop::{NoOpLog, NoOpStateStore};

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot read state file {path}: {source}")]
    UnreadableState {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// One line of room activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub room: String,
    pub nickname: String,
    pub text: String,
    /// Join/part/topic/mode events, as opposed to chat lines.
    pub systemic: bool,
}

impl LogRecord {
    pub fn systemic(room: &str, nickname: &str, text: impl Into<String>) -> Self {
        Self {
            room: room.to_string(),
            nickname: nickname.to_string(),
            text: text.into(),
            systemic: true,
        }
    }

    pub fn chat(room: &str, nickname: &str, text: impl Into<String>) -> Self {
        Self {
            systemic: false,
            ..Self::systemic(room, nickname, text)
        }
    }

    /// Render as a log file line (without newline).
    pub fn render(&self, timestamp: &str) -> String {
        if self.systemic {
            format!("[{timestamp}] * {} {}", self.nickname, self.text)
        } else {
            format!("[{timestamp}] <{}> {}", self.nickname, self.text)
        }
    }
}

/// Persisted room metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub name: String,
    pub topic: String,
    pub key: String,
}

#[async_trait]
pub trait ActivityLog: Send + Sync {
    /// Append one record.
    async fn append(&self, record: &LogRecord) -> Result<(), SinkError>;
}

#[async_trait]
pub trait StateStore: Send + Sync {
    /// Persist the latest snapshot of a room, replacing the previous one.
    async fn save(&self, snapshot: &RoomSnapshot) -> Result<(), SinkError>;

    /// Read every persisted snapshot. Called once at startup.
    async fn load_all(&self) -> Result<Vec<RoomSnapshot>, SinkError>;
}

/// Mailbox in front of an [`ActivityLog`] backend.
#[derive(Debug, Clone)]
pub struct LogSink {
    tx: mpsc::UnboundedSender<LogRecord>,
}

impl LogSink {
    /// Spawn the writer task for `backend`.
    pub fn spawn(backend: Arc<dyn ActivityLog>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<LogRecord>();
        tokio::spawn(async move {
            while let Some(record) = rx.recv().await {
                if let Err(e) = backend.append(&record).await {
                    warn!(room = %record.room, error = %e, "Failed to write activity log");
                }
            }
        });
        Self { tx }
    }

    /// A sink that discards everything.
    pub fn disabled() -> Self {
        Self::spawn(Arc::new(NoOpLog))
    }

    pub fn record(&self, record: LogRecord) {
        let _ = self.tx.send(record);
    }

    /// A sink whose records are handed straight to the returned receiver.
    #[cfg(test)]
    pub(crate) fn capture() -> (Self, mpsc::UnboundedReceiver<LogRecord>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

/// Mailbox in front of a [`StateStore`] backend.
#[derive(Debug, Clone)]
pub struct StateSink {
    tx: mpsc::UnboundedSender<RoomSnapshot>,
}

impl StateSink {
    /// Spawn the writer task for `backend`.
    pub fn spawn(backend: Arc<dyn StateStore>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<RoomSnapshot>();
        tokio::spawn(async move {
            while let Some(snapshot) = rx.recv().await {
                if let Err(e) = backend.save(&snapshot).await {
                    warn!(room = %snapshot.name, error = %e, "Failed to save room state");
                }
            }
        });
        Self { tx }
    }

    /// A sink that discards everything.
    pub fn disabled() -> Self {
        Self::spawn(Arc::new(NoOpStateStore))
    }

    pub fn save(&self, snapshot: RoomSnapshot) {
        let _ = self.tx.send(snapshot);
    }

    #[cfg(test)]
    pub(crate) fn capture() -> (Self, mpsc::UnboundedReceiver<RoomSnapshot>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}
