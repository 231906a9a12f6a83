//! Sinks that discard everything.
//!
//! Used when no log or state directory is configured.

use super::{ActivityLog, LogRecord, RoomSnapshot, SinkError, StateStore};
use async_trait::async_trait;

pub struct NoOpLog;

#[async_trait]
impl ActivityLog for NoOpLog {
    async fn append(&self, _record: &LogRecord) -> Result<(), SinkError> {
        Ok(())
    }
}

pub struct NoOpStateStore;

#[async_trait]
impl StateStore for NoOpStateStore {
    async fn save(&self, _snapshot: &RoomSnapshot) -> Result<(), SinkError> {
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<RoomSnapshot>, SinkError> {
        Ok(vec![])
    }
}
