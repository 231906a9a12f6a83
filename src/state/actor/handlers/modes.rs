//! MODE event handling. Only the room key (`+k`/`-k`) is a mode.

use super::super::RoomActor;
use crate::error::HandlerError;
use crate::sink::LogRecord;
use crate::state::client::ClientRef;

impl RoomActor {
    pub(crate) fn handle_mode(&mut self, client: ClientRef, text: String) {
        if text.is_empty() {
            client.reply_nicknamed(&[self.name.as_str(), self.mode_string()]);
            return;
        }

        let mut args = text.split_whitespace();
        let flag = args.next().unwrap_or_default();
        let result = match flag {
            "+k" => match args.next() {
                Some(key) => self.set_key(&client, key),
                None => Err(HandlerError::NeedMoreParams("MODE".to_string())),
            },
            "-k" => self.clear_key(&client),
            other => Err(HandlerError::UnknownModeFlag(other.to_string())),
        };

        if let Err(e) = result {
            client.reply_error(&e);
        }
    }

    fn set_key(&mut self, client: &ClientRef, key: &str) -> Result<(), HandlerError> {
        if !self.is_member(client.id()) {
            return Err(HandlerError::NotOnChannel(self.name.clone()));
        }
        self.key = key.to_string();
        self.broadcast(&format!(":{client} MODE {} +k {key}", self.name), None);
        self.log.record(LogRecord::systemic(
            &self.name,
            &client.nickname,
            format!("set channel key to {key}"),
        ));
        self.persist();
        Ok(())
    }

    fn clear_key(&mut self, client: &ClientRef) -> Result<(), HandlerError> {
        if !self.is_member(client.id()) {
            return Err(HandlerError::NotOnChannel(self.name.clone()));
        }
        self.key.clear();
        self.broadcast(&format!(":{client} MODE {} -k", self.name), None);
        self.log.record(LogRecord::systemic(
            &self.name,
            &client.nickname,
            "removed channel key",
        ));
        self.persist();
        Ok(())
    }
}
