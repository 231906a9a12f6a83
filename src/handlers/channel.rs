//! Room commands: JOIN, PART, TOPIC, MODE, WHO, LIST.
//!
//! The coordinator only resolves the target room; membership, topic and key
//! checks happen inside the room actor.

use crate::error::{HandlerError, HandlerResult};
use crate::state::actor::{RoomHandle, room_name_valid};
use crate::state::client::ClientId;
use crate::state::coordinator::Coordinator;
use crate::state::event::{Event, EventKind};
use tracing::debug;

/// Split `name rest...` at the first space.
fn split_target(args: &str) -> (&str, &str) {
    args.split_once(' ').unwrap_or((args, ""))
}

impl Coordinator {
    /// `JOIN #a,#b key_a,key_b`
    pub(crate) fn handle_join(&mut self, id: ClientId, args: &str) {
        let mut words = args.split(' ');
        let rooms = words.next().unwrap_or_default();
        let keys: Vec<&str> = words.next().map(|k| k.split(',').collect()).unwrap_or_default();

        for (n, room) in rooms.split(',').enumerate() {
            let key = keys.get(n).copied().unwrap_or_default();
            self.join_room(id, room, key);
        }
    }

    /// Move a client into `name`, parting its previous room first.
    ///
    /// The current-room field is set before the room answers. A join to the
    /// same room is still forwarded: that join may be pending a refusal, and
    /// only the room knows whether the client is already a member.
    pub(crate) fn join_room(&mut self, id: ClientId, name: &str, key: &str) {
        let Some(client) = self.clients.get(&id) else {
            return;
        };
        let client_ref = client.to_ref();
        if !room_name_valid(name) {
            client_ref.reply_no_channel(name);
            return;
        }
        if let Some(current) = client.room.as_deref()
            && current != name
            && let Some(previous) = self.room(current)
        {
            previous.send(Event::new(client_ref.clone(), EventKind::Disconnect, ""));
        }

        let room = self.room_or_register(name);
        if self.settings.verbose {
            debug!(client = id, room = %name, "Joining room");
        }
        let Some(client) = self.clients.get_mut(&id) else {
            return;
        };
        client.room = Some(name.to_string());
        client.join_seq += 1;
        room.send(Event::join(client_ref, key, client.join_seq));
    }

    /// `PART #a,#b`
    pub(crate) fn handle_part(&mut self, id: ClientId, args: &str) {
        let Some(client_ref) = self.client_ref(id) else {
            return;
        };
        let rooms = args.split(' ').next().unwrap_or_default();
        for name in rooms.split(',') {
            let Some(room) = self.room(name) else {
                client_ref.reply_no_channel(name);
                continue;
            };
            room.send(Event::new(client_ref.clone(), EventKind::Disconnect, ""));
            if let Some(client) = self.clients.get_mut(&id)
                && client.room.as_deref() == Some(name)
            {
                client.room = None;
            }
        }
    }

    /// Forward an event to an existing room, by exact name.
    fn forward(&self, id: ClientId, name: &str, kind: EventKind, text: &str) -> HandlerResult {
        let room = self
            .room(name)
            .ok_or_else(|| HandlerError::NoSuchChannel(name.to_string()))?;
        if let Some(client_ref) = self.client_ref(id) {
            room.send(Event::new(client_ref, kind, text));
        }
        Ok(())
    }

    /// `TOPIC #room [:new topic]`
    pub(crate) fn handle_topic(&mut self, id: ClientId, args: &str) -> HandlerResult {
        let (name, change) = split_target(args);
        self.forward(id, name, EventKind::Topic, change)
    }

    /// `MODE #room [+k key | -k]` or `MODE <own nick> [flags]`
    pub(crate) fn handle_mode(&mut self, id: ClientId, args: &str) -> HandlerResult {
        let (target, change) = split_target(args);
        if let Some(client) = self.clients.get(&id)
            && client.nickname == target
        {
            if !change.is_empty() {
                return Err(HandlerError::UnknownModeFlag(change.to_string()));
            }
            client.to_ref().reply_nicknamed(&["+"]);
            return Ok(());
        }
        self.forward(id, target, EventKind::Mode, change)
    }

    /// `WHO #room`
    pub(crate) fn handle_who(&mut self, id: ClientId, args: &str) -> HandlerResult {
        let (name, _) = split_target(args);
        self.forward(id, name, EventKind::Who, "")
    }

    /// `LIST [#a,#b]`
    ///
    /// Room summaries are gathered off the coordinator loop.
    pub(crate) fn handle_list(&mut self, id: ClientId, args: &str) -> HandlerResult {
        let Some(client) = self.client_ref(id) else {
            return Ok(());
        };
        let mut names: Vec<String> = match args.split(' ').next() {
            Some(filter) if !filter.is_empty() => filter.split(',').map(str::to_string).collect(),
            _ => self.rooms.keys().cloned().collect(),
        };
        names.sort();
        let rooms: Vec<RoomHandle> = names.iter().filter_map(|name| self.room(name)).collect();

        tokio::spawn(async move {
            for room in rooms {
                let Some(info) = room.info().await else {
                    continue;
                };
                let count = info.member_count.to_string();
                client.reply_nicknamed(&[info.name.as_str(), count.as_str(), info.topic.as_str()]);
            }
            client.reply_nicknamed(&["End of /LIST"]);
        });
        Ok(())
    }
}
