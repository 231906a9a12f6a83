//! File-backed sinks: one activity log and one state file per room.
//!
//! Room names never contain `/`, so they are used as file names directly.

use super::{ActivityLog, LogRecord, RoomSnapshot, SinkError, StateStore};
use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

/// Appends `[time] * nick action` / `[time] <nick> text` lines to
/// `<dir>/<room>`.
pub struct FileActivityLog {
    dir: PathBuf,
}

impl FileActivityLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl ActivityLog for FileActivityLog {
    async fn append(&self, record: &LogRecord) -> Result<(), SinkError> {
        let path = self.dir.join(&record.room);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        let mut line = record.render(&Utc::now().to_rfc3339());
        line.push('\n');
        file.write_all(line.as_bytes()).await?;
        Ok(())
    }
}

/// Keeps `<dir>/<room>` holding `topic\nkey\n`.
pub struct FileStateStore {
    dir: PathBuf,
}

impl FileStateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn save(&self, snapshot: &RoomSnapshot) -> Result<(), SinkError> {
        let contents = format!("{}\n{}\n", snapshot.topic, snapshot.key);
        fs::write(self.dir.join(&snapshot.name), contents).await?;
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<RoomSnapshot>, SinkError> {
        let mut snapshots = Vec::new();
        let mut entries = fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.starts_with('#') {
                continue;
            }
            let path = entry.path();
            let contents = fs::read_to_string(&path)
                .await
                .map_err(|source| SinkError::UnreadableState {
                    path: path.clone(),
                    source,
                })?;
            snapshots.push(parse_snapshot(&name, &contents));
            info!(room = %name, "Loaded state for room");
        }
        snapshots.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(snapshots)
    }
}

/// Parse a state file. Fewer than two lines is tolerated as corruption and
/// yields an empty topic and key.
pub fn parse_snapshot(name: &str, contents: &str) -> RoomSnapshot {
    let lines: Vec<&str> = contents.split('\n').collect();
    if lines.len() < 2 {
        warn!(room = %name, contents = ?lines, "State corrupted, loading empty topic and key");
        return RoomSnapshot {
            name: name.to_string(),
            ..RoomSnapshot::default()
        };
    }
    RoomSnapshot {
        name: name.to_string(),
        topic: lines[0].to_string(),
        key: lines[1].to_string(),
    }
}
