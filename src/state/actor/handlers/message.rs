use super::super::RoomActor;
use crate::sink::LogRecord;
use crate::state::client::ClientRef;

impl RoomActor {
    /// Relay a prepared line to everyone but the sender.
    pub(crate) fn handle_line(&self, client: &ClientRef, text: &str) {
        self.broadcast(text, Some(client.id()));

        let said = text.split_once(' ').map_or("", |(_, tail)| tail);
        self.log
            .record(LogRecord::chat(&self.name, &client.nickname, said));
    }
}
