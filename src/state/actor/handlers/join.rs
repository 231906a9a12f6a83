//! Join handling.
//!
//! Key checks live here, inside the room, so a join and a key change can
//! never interleave.

use super::super::RoomActor;
use crate::error::HandlerError;
use crate::sink::LogRecord;
use crate::state::client::ClientRef;
use crate::state::coordinator::Inbound;
use tracing::debug;

impl RoomActor {
    pub(crate) fn handle_join(&mut self, client: ClientRef, key: String, seq: u64) {
        if self.is_member(client.id()) {
            client.reply_already_in_channel(&self.name);
            return;
        }

        if !self.key.is_empty() && self.key != key {
            // Roll back the coordinator before the client can see the refusal.
            let _ = self.coordinator.send(Inbound::JoinDenied {
                client: client.id(),
                room: self.name.clone(),
                seq,
            });
            client.reply_error(&HandlerError::BadChannelKey(self.name.clone()));
            return;
        }

        // A keyed join on an open room claims the room with that key.
        if !key.is_empty() && self.key != key {
            self.key = key;
            self.persist();
        }

        self.send_topic(&client);
        let notice = format!(":{} {} :{} joined", client.handle.hostname(), self.name, client.nickname);
        self.broadcast(&notice, None);

        if self.verbose {
            debug!(room = %self.name, nick = %client.nickname, "Client joined room");
        }
        self.log
            .record(LogRecord::systemic(&self.name, &client.nickname, "joined"));

        self.members.insert(client.id(), client.clone());
        client.reply_nicknamed(&[self.name.as_str(), self.member_names().as_str()]);
    }
}
