//! Part handling. A global QUIT arrives here as a part in every room.

use super::super::RoomActor;
use crate::error::HandlerError;
use crate::sink::LogRecord;
use crate::state::client::ClientRef;

impl RoomActor {
    pub(crate) fn handle_part(&mut self, client: ClientRef) {
        let Some(member) = self.members.remove(&client.id()) else {
            // Quit fan-out reaches rooms the client never joined.
            if !client.handle.is_closed() {
                client.reply_error(&HandlerError::NotOnChannel(self.name.clone()));
            }
            return;
        };

        let notice = format!(":{member} PART {} :{}", self.name, member.nickname);
        self.broadcast(&notice, None);
        client.msg(notice);

        self.log
            .record(LogRecord::systemic(&self.name, &member.nickname, "left"));
    }
}
