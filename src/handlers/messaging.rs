//! PRIVMSG, NOTICE and MSG.
//!
//! PRIVMSG and NOTICE address a nickname inside the sender's current room.
//! MSG addresses a whole room and echoes the line back to the sender.

use super::Command;
use crate::error::{HandlerError, HandlerResult};
use crate::state::client::{ClientId, PLACEHOLDER_NICK};
use crate::state::coordinator::Coordinator;
use crate::state::event::{Event, EventKind};

impl Coordinator {
    /// `PRIVMSG <nick> :<text>` / `NOTICE <nick> :<text>`
    pub(crate) fn handle_privmsg(&mut self, id: ClientId, command: &Command, args: &str) -> HandlerResult {
        if args.is_empty() {
            return Err(HandlerError::NoRecipient(command.name().to_string()));
        }
        let Some((target, text)) = args.split_once(' ') else {
            return Err(HandlerError::NoTextToSend);
        };
        let Some(sender) = self.clients.get(&id) else {
            return Ok(());
        };
        let Some(room) = sender.room.as_deref() else {
            return Err(HandlerError::NoRecipientsInRoom(PLACEHOLDER_NICK.to_string()));
        };

        let recipient = self
            .clients
            .values()
            .find(|c| c.registered && c.nickname == target && c.room.as_deref() == Some(room))
            .ok_or_else(|| HandlerError::NoRecipientsInRoom(room.to_string()))?;

        let text = text.strip_prefix(':').unwrap_or(text);
        recipient
            .handle
            .send_raw(format!(":{} {} {target} :{text}", sender.to_ref(), command.name()));
        Ok(())
    }

    /// `MSG <#room> <text>`
    pub(crate) fn handle_msg(&mut self, id: ClientId, args: &str) -> HandlerResult {
        if args.is_empty() {
            return Err(HandlerError::NoChannelGiven);
        }
        let Some((target, text)) = args.split_once(' ') else {
            return Err(HandlerError::NoTextToSend);
        };
        let room = self
            .find_room_ci(target)
            .ok_or_else(|| HandlerError::NoSuchNick(target.to_uppercase()))?;
        let Some(client) = self.client_ref(id) else {
            return Ok(());
        };

        let line = format!("<{}> {text}", client.nickname);
        room.send(Event::new(client.clone(), EventKind::Line, line.as_str()));
        client.reply(&line);
        Ok(())
    }
}
