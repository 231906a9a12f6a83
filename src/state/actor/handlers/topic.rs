//! TOPIC event handling.

use super::super::RoomActor;
use crate::error::HandlerError;
use crate::sink::LogRecord;
use crate::state::client::ClientRef;

impl RoomActor {
    pub(crate) fn handle_topic(&mut self, client: ClientRef, text: String) {
        if text.is_empty() {
            self.send_topic(&client);
            return;
        }
        if !self.is_member(client.id()) {
            client.reply_error(&HandlerError::NotOnChannel(self.name.clone()));
            return;
        }

        let topic = text.strip_prefix(':').unwrap_or(&text).to_string();
        let notice = format!(":{client} TOPIC {} :{topic}", self.name);
        self.broadcast(&notice, None);

        self.log.record(LogRecord::systemic(
            &self.name,
            &client.nickname,
            format!("set topic to {topic}"),
        ));
        self.topic = topic;
        self.persist();
    }
}
