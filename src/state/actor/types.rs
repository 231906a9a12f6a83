use crate::sink::{LogSink, StateSink};
use crate::state::coordinator::Inbound;
use crate::state::event::Event;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::warn;

/// Messages accepted by a room actor's mailbox.
#[derive(Debug)]
pub enum RoomMessage {
    /// A client event routed to this room.
    Event(Event),
    /// Request a summary of the room (for LIST).
    Info(oneshot::Sender<RoomInfo>),
}

/// Snapshot of room information for queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub name: String,
    pub member_count: usize,
    pub topic: String,
}

/// Everything a room actor is created with.
pub struct RoomParams {
    pub name: String,
    pub topic: String,
    pub key: String,
    pub log: LogSink,
    pub state: StateSink,
    /// Coordinator mailbox, for join refusals.
    pub coordinator: mpsc::UnboundedSender<Inbound>,
    pub verbose: bool,
}

/// Sending side of a room actor's mailbox.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    name: Arc<str>,
    tx: mpsc::UnboundedSender<RoomMessage>,
}

impl RoomHandle {
    pub(crate) fn new(name: &str, tx: mpsc::UnboundedSender<RoomMessage>) -> Self {
        Self {
            name: Arc::from(name),
            tx,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Queue an event for the room.
    pub fn send(&self, event: Event) {
        if self.tx.send(RoomMessage::Event(event)).is_err() {
            warn!(room = %self.name, "Room actor is gone, dropping event");
        }
    }

    /// Ask the room for its current summary.
    pub async fn info(&self) -> Option<RoomInfo> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx.send(RoomMessage::Info(reply_tx)).ok()?;
        reply_rx.await.ok()
    }
}
