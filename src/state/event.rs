//! The event envelope carried on every mailbox.

use super::client::ClientRef;

/// What an [`Event`] asks its receiver to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A connection was accepted (coordinator) or a client joins (room).
    /// For rooms the payload is the join key, possibly empty.
    Connect,
    /// A connection went away (coordinator) or a client leaves (room).
    Disconnect,
    /// A raw command line (coordinator) or a line to relay (room).
    Line,
    /// Topic query (empty payload) or change.
    Topic,
    /// Mode query (empty payload) or change.
    Mode,
    /// Member listing request.
    Who,
}

/// A tagged message from one client, consumed by exactly one worker.
#[derive(Debug, Clone)]
pub struct Event {
    pub client: ClientRef,
    pub kind: EventKind,
    pub text: String,
    /// Sequence number of a room join. Zero for every other event.
    pub join_seq: u64,
}

impl Event {
    pub fn new(client: ClientRef, kind: EventKind, text: impl Into<String>) -> Self {
        Self {
            client,
            kind,
            text: text.into(),
            join_seq: 0,
        }
    }

    /// A join request for a room, tagged so a refusal can be matched to it.
    pub fn join(client: ClientRef, key: impl Into<String>, seq: u64) -> Self {
        Self {
            join_seq: seq,
            ..Self::new(client, EventKind::Connect, key)
        }
    }
}
