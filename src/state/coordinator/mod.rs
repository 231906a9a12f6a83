//! The coordinator task.
//!
//! Owns the client registry and the room registry. Every registration,
//! command dispatch, liveness sweep and room creation runs on its single
//! loop, so neither registry ever needs a lock. Command handlers live in
//! [`crate::handlers`].

use crate::sink::{LogSink, RoomSnapshot, StateSink};
use crate::state::actor::{RoomActor, RoomHandle, RoomParams, room_name_valid};
use crate::state::client::{ClientHandle, ClientId, ClientRef, PLACEHOLDER_NICK};
use crate::state::event::{Event, EventKind};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

mod liveness;
mod registration;

pub use liveness::{ALIVENESS_CHECK, PING_THRESHOLD, PING_TIMEOUT, spawn_liveness_timer};

/// Messages accepted by the coordinator's mailbox.
#[derive(Debug)]
pub enum Inbound {
    /// An event from a client worker.
    Event(Event),
    /// A room refused a join, so the client's current room must be rolled back
    /// unless a later join has superseded it.
    JoinDenied { client: ClientId, room: String, seq: u64 },
    /// Wakes the loop so the liveness sweep runs without client traffic.
    Tick,
}

/// Static settings the coordinator runs with.
#[derive(Debug, Clone)]
pub struct CoordinatorSettings {
    pub hostname: Arc<str>,
    /// Room every client joins once registered.
    pub default_room: String,
    pub motd: Option<PathBuf>,
    pub verbose: bool,
}

/// Sending side of the coordinator's mailbox.
#[derive(Debug, Clone)]
pub struct CoordinatorHandle {
    tx: mpsc::UnboundedSender<Inbound>,
}

impl CoordinatorHandle {
    /// Returns false once the coordinator is gone.
    pub fn send(&self, inbound: Inbound) -> bool {
        self.tx.send(inbound).is_ok()
    }

    pub fn event(&self, event: Event) -> bool {
        self.send(Inbound::Event(event))
    }

    #[cfg(test)]
    pub(crate) fn from_sender(tx: mpsc::UnboundedSender<Inbound>) -> Self {
        Self { tx }
    }
}

/// The coordinator's record of one live connection.
#[derive(Debug)]
pub(crate) struct Client {
    pub handle: ClientHandle,
    pub nickname: String,
    pub username: String,
    pub realname: String,
    pub registered: bool,
    /// Name of the room the client is in. Rooms are looked up by name.
    pub room: Option<String>,
    /// Sequence number of the latest join sent on the client's behalf.
    pub join_seq: u64,
    pub last_activity: Instant,
    pub ping_sent: bool,
}

impl Client {
    fn new(handle: ClientHandle, now: Instant) -> Self {
        Self {
            handle,
            nickname: PLACEHOLDER_NICK.to_string(),
            username: String::new(),
            realname: String::new(),
            registered: false,
            room: None,
            join_seq: 0,
            last_activity: now,
            ping_sent: false,
        }
    }

    /// Identity snapshot handed to rooms and used for replies.
    pub fn to_ref(&self) -> ClientRef {
        ClientRef {
            handle: self.handle.clone(),
            nickname: self.nickname.clone(),
            username: self.username.clone(),
            realname: self.realname.clone(),
        }
    }
}

pub struct Coordinator {
    pub(crate) settings: CoordinatorSettings,
    pub(crate) clients: HashMap<ClientId, Client>,
    pub(crate) rooms: HashMap<String, RoomHandle>,
    log: LogSink,
    state: StateSink,
    tx: mpsc::UnboundedSender<Inbound>,
    pub(crate) last_sweep: Option<Instant>,
}

impl Coordinator {
    pub fn new(
        settings: CoordinatorSettings,
        log: LogSink,
        state: StateSink,
    ) -> (Self, mpsc::UnboundedReceiver<Inbound>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let coordinator = Self {
            settings,
            clients: HashMap::new(),
            rooms: HashMap::new(),
            log,
            state,
            tx,
            last_sweep: None,
        };
        (coordinator, rx)
    }

    pub fn handle(&self) -> CoordinatorHandle {
        CoordinatorHandle {
            tx: self.tx.clone(),
        }
    }

    /// Seed the room registry from persisted snapshots.
    pub fn restore(&mut self, snapshots: Vec<RoomSnapshot>) {
        for snapshot in snapshots {
            if !room_name_valid(&snapshot.name) {
                warn!(room = %snapshot.name, "Skipping state for invalid room name");
                continue;
            }
            info!(room = %snapshot.name, "Loaded state for room");
            self.spawn_room(snapshot.name, snapshot.topic, snapshot.key);
        }
    }

    fn spawn_room(&mut self, name: String, topic: String, key: String) -> RoomHandle {
        let handle = RoomActor::spawn(RoomParams {
            name: name.clone(),
            topic,
            key,
            log: self.log.clone(),
            state: self.state.clone(),
            coordinator: self.tx.clone(),
            verbose: self.settings.verbose,
        });
        self.rooms.insert(name, handle.clone());
        handle
    }

    /// Create a room worker and register it.
    pub(crate) fn register_room(&mut self, name: &str) -> RoomHandle {
        debug!(room = %name, "Registering room");
        self.spawn_room(name.to_string(), String::new(), String::new())
    }

    /// Look up a room by exact name.
    pub(crate) fn room(&self, name: &str) -> Option<RoomHandle> {
        self.rooms.get(name).cloned()
    }

    pub(crate) fn room_or_register(&mut self, name: &str) -> RoomHandle {
        match self.room(name) {
            Some(room) => room,
            None => self.register_room(name),
        }
    }

    /// Look up a room ignoring ASCII case.
    pub(crate) fn find_room_ci(&self, name: &str) -> Option<RoomHandle> {
        let wanted = name.to_uppercase();
        self.rooms
            .iter()
            .find(|(room, _)| room.to_uppercase() == wanted)
            .map(|(_, handle)| handle.clone())
    }

    pub(crate) fn client_ref(&self, id: ClientId) -> Option<ClientRef> {
        self.clients.get(&id).map(Client::to_ref)
    }

    /// The main loop.
    pub async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Inbound>) {
        while let Some(inbound) = rx.recv().await {
            self.handle_inbound(inbound);
        }
        debug!("Coordinator stopped");
    }

    pub(crate) fn handle_inbound(&mut self, inbound: Inbound) {
        let now = Instant::now();
        // A line proves its sender is alive before the sweep looks at it.
        if let Inbound::Event(event) = &inbound
            && event.kind == EventKind::Line
            && let Some(client) = self.clients.get_mut(&event.client.id())
        {
            client.last_activity = now;
            client.ping_sent = false;
        }
        self.sweep(now);

        match inbound {
            Inbound::Event(event) => self.handle_event(event),
            Inbound::JoinDenied { client, room, seq } => {
                if let Some(client) = self.clients.get_mut(&client)
                    && client.join_seq == seq
                    && client.room.as_deref() == Some(room.as_str())
                {
                    client.room = None;
                }
            }
            Inbound::Tick => {}
        }
    }

    fn handle_event(&mut self, event: Event) {
        let id = event.client.id();
        match event.kind {
            EventKind::Connect => self.admit(event.client.handle),
            EventKind::Disconnect => self.drop_client(id, "connection closed"),
            EventKind::Line => self.handle_line(id, &event.text),
            other => warn!(client = id, kind = ?other, "Unexpected event for coordinator"),
        }
    }

    /// Add a new connection to the live set.
    pub(crate) fn admit(&mut self, handle: ClientHandle) {
        info!(client = handle.id(), addr = %handle.addr(), "Client connected");
        self.clients
            .insert(handle.id(), Client::new(handle, Instant::now()));
    }

    /// Remove a client everywhere and close its connection.
    pub(crate) fn drop_client(&mut self, id: ClientId, reason: &str) {
        let Some(client) = self.clients.remove(&id) else {
            return;
        };
        // Closed first so rooms it never joined stay quiet.
        client.handle.close();
        info!(client = id, nick = %client.nickname, reason, "Client disconnected");

        let client = client.to_ref();
        for room in self.rooms.values() {
            room.send(Event::new(client.clone(), EventKind::Disconnect, ""));
        }
    }

    fn handle_line(&mut self, id: ClientId, text: &str) {
        let Some(client) = self.clients.get(&id) else {
            return;
        };
        let text = text.replace("%%ROOM%%", client.room.as_deref().unwrap_or_default());
        let (word, args) = text.split_once(' ').unwrap_or((text.as_str(), ""));
        let command = crate::handlers::Command::parse(word);
        if self.settings.verbose {
            debug!(client = id, nick = %client.nickname, command = command.name(), "Command");
        }

        let registered = client.registered;
        let result = if registered {
            self.dispatch(id, &command, args)
        } else {
            self.dispatch_unregistered(id, &command, args)
        };

        if let Err(e) = result {
            debug!(client = id, error_code = e.error_code(), "Command failed");
            if let Some(client) = self.client_ref(id) {
                client.reply_error(&e);
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::time::Duration;

    pub(crate) struct Harness {
        pub coordinator: Coordinator,
        pub rx: mpsc::UnboundedReceiver<Inbound>,
        next_id: ClientId,
    }

    impl Harness {
        pub fn new() -> Self {
            let settings = CoordinatorSettings {
                hostname: Arc::from("irc.test"),
                default_room: "#lobby".to_string(),
                motd: None,
                verbose: true,
            };
            let (coordinator, rx) = Coordinator::new(settings, LogSink::disabled(), StateSink::disabled());
            Self {
                coordinator,
                rx,
                next_id: 1,
            }
        }

        /// Admit a connection and return its handle and outbound queue.
        pub fn connect(&mut self) -> (ClientHandle, mpsc::Receiver<String>) {
            let id = self.next_id;
            self.next_id += 1;
            let addr = format!("198.51.100.{id}:5000").parse().unwrap();
            let (handle, rx) = ClientHandle::new(id, addr, Arc::from("irc.test"));
            self.inbound(&handle, EventKind::Connect, "");
            (handle, rx)
        }

        pub fn inbound(&mut self, handle: &ClientHandle, kind: EventKind, text: &str) {
            let event = Event::new(ClientRef::anonymous(handle.clone()), kind, text);
            self.coordinator.handle_inbound(Inbound::Event(event));
        }

        pub fn line(&mut self, handle: &ClientHandle, text: &str) {
            self.inbound(handle, EventKind::Line, text);
        }

        /// Connect and register with the given nickname.
        pub fn registered(&mut self, nick: &str) -> (ClientHandle, mpsc::Receiver<String>) {
            let (handle, rx) = self.connect();
            self.line(&handle, &format!("NICK {nick}"));
            self.line(&handle, &format!("USER {nick} 0 * :{nick} Real"));
            (handle, rx)
        }

        pub fn client(&self, handle: &ClientHandle) -> Option<&Client> {
            self.coordinator.clients.get(&handle.id())
        }
    }

    /// Collect queued lines, giving room actors a moment to run.
    pub(crate) async fn settle(rx: &mut mpsc::Receiver<String>) -> Vec<String> {
        tokio::time::sleep(Duration::from_millis(20)).await;
        let mut lines = Vec::new();
        while let Ok(line) = rx.try_recv() {
            lines.push(line);
        }
        lines
    }

    #[tokio::test]
    async fn disconnect_removes_client_and_closes() {
        let mut h = Harness::new();
        let (alice, _rx) = h.registered("alice");
        assert!(h.client(&alice).is_some());

        h.inbound(&alice, EventKind::Disconnect, "");

        assert!(h.client(&alice).is_none());
        assert!(alice.is_closed());
    }

    #[tokio::test]
    async fn quit_fans_out_to_rooms() {
        let mut h = Harness::new();
        let (alice, mut alice_rx) = h.registered("alice");
        let (bob, _bob_rx) = h.registered("bob");
        settle(&mut alice_rx).await;

        h.line(&bob, "quit :bye");

        assert!(h.client(&bob).is_none());
        let lines = settle(&mut alice_rx).await;
        assert_eq!(lines, vec![":bob!bob@198.51.100.2 PART #lobby :bob"]);
        assert!(h.client(&alice).is_some());
    }

    #[tokio::test]
    async fn room_placeholder_expands() {
        let mut h = Harness::new();
        let (alice, mut rx) = h.registered("alice");
        settle(&mut rx).await;

        h.line(&alice, "TOPIC %%ROOM%% :welcome to %%ROOM%%");
        let lines = settle(&mut rx).await;

        assert_eq!(
            lines,
            vec![":alice!alice@198.51.100.1 TOPIC #lobby :welcome to #lobby"]
        );
    }

    #[tokio::test]
    async fn join_denied_rolls_back_current_room() {
        let mut h = Harness::new();
        let (alice, _rx) = h.registered("alice");

        let seq = h.client(&alice).unwrap().join_seq;

        h.coordinator.handle_inbound(Inbound::JoinDenied {
            client: alice.id(),
            room: "#other".into(),
            seq,
        });
        assert_eq!(h.client(&alice).unwrap().room.as_deref(), Some("#lobby"));

        // A refusal of an older join is stale.
        h.coordinator.handle_inbound(Inbound::JoinDenied {
            client: alice.id(),
            room: "#lobby".into(),
            seq: seq - 1,
        });
        assert_eq!(h.client(&alice).unwrap().room.as_deref(), Some("#lobby"));

        h.coordinator.handle_inbound(Inbound::JoinDenied {
            client: alice.id(),
            room: "#lobby".into(),
            seq,
        });
        assert_eq!(h.client(&alice).unwrap().room, None);
    }

    #[tokio::test]
    async fn restore_seeds_rooms() {
        let mut h = Harness::new();
        h.coordinator.restore(vec![
            RoomSnapshot {
                name: "#saved".into(),
                topic: "kept".into(),
                key: "k".into(),
            },
            RoomSnapshot {
                name: "bogus".into(),
                ..Default::default()
            },
        ]);

        assert_eq!(h.coordinator.rooms.len(), 1);
        let info = h.coordinator.room("#saved").unwrap().info().await.unwrap();
        assert_eq!(info.topic, "kept");
        assert!(h.coordinator.find_room_ci("#SAVED").is_some());
    }
}
