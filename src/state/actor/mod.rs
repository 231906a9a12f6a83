//! Actor Model for Room State Management.
//!
//! This module implements the `RoomActor`, which manages the state of a single room
//! in an isolated Tokio task.
//!
//! # Architecture
//!
//! - **State Ownership**: The `RoomActor` owns its members, topic and key. Nothing else
//!   reads or writes them.
//! - **Message Passing**: All interactions happen via `RoomMessage`s sent to the actor.
//! - **Ordering**: Events are handled one at a time in arrival order. Replies and
//!   broadcasts go through each client's bounded outbound queue, so a slow member
//!   never stalls the loop and every member sees events in processing order.

use crate::sink::{LogSink, RoomSnapshot, StateSink};
use crate::state::client::{ClientId, ClientRef};
use crate::state::coordinator::Inbound;
use crate::state::event::{Event, EventKind};
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::debug;

mod handlers;
mod types;
pub mod validation;

pub use types::*;
pub use validation::room_name_valid;

/// The Room Actor.
///
/// Owns the state of a single room and processes events sequentially.
pub struct RoomActor {
    pub name: String,
    pub topic: String,
    pub key: String,
    pub members: HashMap<ClientId, ClientRef>,
    log: LogSink,
    state: StateSink,
    coordinator: mpsc::UnboundedSender<Inbound>,
    verbose: bool,
}

impl RoomActor {
    pub fn new(params: RoomParams) -> Self {
        let RoomParams {
            name,
            topic,
            key,
            log,
            state,
            coordinator,
            verbose,
        } = params;
        Self {
            name,
            topic,
            key,
            members: HashMap::new(),
            log,
            state,
            coordinator,
            verbose,
        }
    }

    /// Create a new Room Actor and spawn it.
    pub fn spawn(params: RoomParams) -> RoomHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let actor = Self::new(params);
        let handle = RoomHandle::new(&actor.name, tx);

        tokio::spawn(async move {
            actor.run(rx).await;
        });

        handle
    }

    /// The main actor loop.
    pub async fn run(mut self, mut rx: mpsc::UnboundedReceiver<RoomMessage>) {
        while let Some(message) = rx.recv().await {
            self.handle_message(message);
        }
        debug!(room = %self.name, "Room actor stopped");
    }

    pub(crate) fn handle_message(&mut self, message: RoomMessage) {
        match message {
            RoomMessage::Event(event) => self.handle_event(event),
            RoomMessage::Info(reply_tx) => {
                let _ = reply_tx.send(self.info());
            }
        }
    }

    fn handle_event(&mut self, event: Event) {
        let Event {
            client,
            kind,
            text,
            join_seq,
        } = event;
        match kind {
            EventKind::Connect => self.handle_join(client, text, join_seq),
            EventKind::Disconnect => self.handle_part(client),
            EventKind::Topic => self.handle_topic(client, text),
            EventKind::Mode => self.handle_mode(client, text),
            EventKind::Who => self.handle_who(&client),
            EventKind::Line => self.handle_line(&client, &text),
        }
    }

    pub fn info(&self) -> RoomInfo {
        RoomInfo {
            name: self.name.clone(),
            member_count: self.members.len(),
            topic: self.topic.clone(),
        }
    }

    /// Current mode string: `+k` when keyed, else `+`.
    pub fn mode_string(&self) -> &'static str {
        if self.key.is_empty() { "+" } else { "+k" }
    }

    fn is_member(&self, id: ClientId) -> bool {
        self.members.contains_key(&id)
    }

    /// Sorted, space-joined member nicknames.
    fn member_names(&self) -> String {
        let mut names: Vec<&str> = self.members.values().map(|m| m.nickname.as_str()).collect();
        names.sort_unstable();
        names.join(" ")
    }

    /// Send a line to every member, optionally skipping one.
    fn broadcast(&self, line: &str, exclude: Option<ClientId>) {
        for (id, member) in &self.members {
            if exclude == Some(*id) {
                continue;
            }
            member.msg(line);
        }
    }

    fn send_topic(&self, client: &ClientRef) {
        if self.topic.is_empty() {
            client.reply_nicknamed(&[self.name.as_str(), "No topic is set"]);
        } else {
            client.reply_nicknamed(&[self.name.as_str(), self.topic.as_str()]);
        }
    }

    fn persist(&self) {
        self.state.save(RoomSnapshot {
            name: self.name.clone(),
            topic: self.topic.clone(),
            key: self.key.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::LogRecord;
    use crate::state::client::ClientHandle;
    use std::sync::Arc;

    pub(super) struct Harness {
        pub actor: RoomActor,
        pub logs: mpsc::UnboundedReceiver<LogRecord>,
        pub saves: mpsc::UnboundedReceiver<RoomSnapshot>,
        pub feedback: mpsc::UnboundedReceiver<Inbound>,
    }

    pub(super) fn harness(name: &str) -> Harness {
        let (log, logs) = LogSink::capture();
        let (state, saves) = StateSink::capture();
        let (coordinator, feedback) = mpsc::unbounded_channel();
        let actor = RoomActor::new(RoomParams {
            name: name.to_string(),
            topic: String::new(),
            key: String::new(),
            log,
            state,
            coordinator,
            verbose: false,
        });
        Harness {
            actor,
            logs,
            saves,
            feedback,
        }
    }

    pub(super) fn client(id: ClientId, nick: &str) -> (ClientRef, mpsc::Receiver<String>) {
        let addr = format!("192.0.2.{id}:6000").parse().unwrap();
        let (handle, rx) = ClientHandle::new(id, addr, Arc::from("irc.test"));
        let mut client = ClientRef::anonymous(handle);
        client.nickname = nick.to_string();
        client.username = format!("{nick}_u");
        client.realname = format!("{nick} Real");
        (client, rx)
    }

    pub(super) fn drain(rx: &mut mpsc::Receiver<String>) -> Vec<String> {
        let mut lines = Vec::new();
        while let Ok(line) = rx.try_recv() {
            lines.push(line);
        }
        lines
    }

    pub(super) fn send(actor: &mut RoomActor, client: &ClientRef, kind: EventKind, text: &str) {
        actor.handle_message(RoomMessage::Event(Event::new(client.clone(), kind, text)));
    }

    #[test]
    fn join_replies_topic_then_sorted_names() {
        let mut h = harness("#room");
        let (bob, mut bob_rx) = client(2, "bob");
        let (alice, mut alice_rx) = client(1, "alice");

        send(&mut h.actor, &bob, EventKind::Connect, "");
        drain(&mut bob_rx);
        send(&mut h.actor, &alice, EventKind::Connect, "");

        assert_eq!(
            drain(&mut alice_rx),
            vec![
                ":irc.test alice #room :No topic is set",
                ":irc.test alice #room :alice bob",
            ]
        );
        assert_eq!(drain(&mut bob_rx), vec![":irc.test #room :alice joined"]);
        assert_eq!(h.actor.members.len(), 2);
        assert_eq!(h.logs.try_recv().unwrap(), LogRecord::systemic("#room", "bob", "joined"));
        assert_eq!(h.logs.try_recv().unwrap(), LogRecord::systemic("#room", "alice", "joined"));
    }

    #[test]
    fn wrong_key_never_changes_membership() {
        let mut h = harness("#test");
        h.actor.key = "key1".to_string();
        let (alice, mut alice_rx) = client(1, "alice");

        send(&mut h.actor, &alice, EventKind::Connect, "key2");

        assert!(h.actor.members.is_empty());
        assert_eq!(h.actor.key, "key1");
        assert_eq!(
            drain(&mut alice_rx),
            vec![":irc.test alice #test :Cannot join channel (+k) - bad key"]
        );
        assert!(matches!(
            h.feedback.try_recv(),
            Ok(Inbound::JoinDenied { client: 1, ref room, .. }) if room == "#test"
        ));
        assert!(h.saves.try_recv().is_err());

        send(&mut h.actor, &alice, EventKind::Connect, "key1");
        assert!(h.actor.is_member(1));
        assert!(h.saves.try_recv().is_err());
    }

    #[test]
    fn keyed_join_sets_key_and_persists() {
        let mut h = harness("#new");
        let (alice, _rx) = client(1, "alice");

        send(&mut h.actor, &alice, EventKind::Connect, "k");

        assert_eq!(h.actor.key, "k");
        assert_eq!(h.actor.mode_string(), "+k");
        assert_eq!(
            h.saves.try_recv().unwrap(),
            RoomSnapshot {
                name: "#new".into(),
                topic: String::new(),
                key: "k".into(),
            }
        );
    }

    #[test]
    fn info_reports_count_and_topic() {
        let mut h = harness("#room");
        h.actor.topic = "hello".into();
        let (alice, _rx) = client(1, "alice");
        send(&mut h.actor, &alice, EventKind::Connect, "");

        assert_eq!(
            h.actor.info(),
            RoomInfo {
                name: "#room".into(),
                member_count: 1,
                topic: "hello".into(),
            }
        );
    }

    #[tokio::test]
    async fn spawned_actor_answers_info() {
        let (coordinator, _feedback) = mpsc::unbounded_channel();
        let handle = RoomActor::spawn(RoomParams {
            name: "#spawned".into(),
            topic: "restored".into(),
            key: String::new(),
            log: LogSink::disabled(),
            state: StateSink::disabled(),
            coordinator,
            verbose: true,
        });

        let info = handle.info().await.unwrap();
        assert_eq!(handle.name(), "#spawned");
        assert_eq!(info.topic, "restored");
        assert_eq!(info.member_count, 0);
    }
}
