//! Registration handshake (NICK/USER) for clients that are not registered yet.
//!
//! Runs inline on the coordinator loop, so the nickname check and the
//! nickname claim can never interleave with another client's.

use super::Coordinator;
use crate::error::{HandlerError, HandlerResult};
use crate::handlers::Command;
use crate::state::client::{ClientId, PLACEHOLDER_NICK};
use tracing::info;

/// Longest nickname accepted.
pub const MAX_NICK_LEN: usize = 9;

fn nick_char_valid(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Check a nickname against `[A-Za-z0-9_-]{1,9}`.
pub fn validate_nickname(nick: &str) -> Result<(), HandlerError> {
    let mut offending: Vec<String> = Vec::new();
    for c in nick.chars().filter(|c| !nick_char_valid(*c)) {
        let c = c.to_string();
        if !offending.contains(&c) {
            offending.push(c);
        }
    }
    if offending.is_empty() && (1..=MAX_NICK_LEN).contains(&nick.chars().count()) {
        return Ok(());
    }
    Err(HandlerError::ErroneousNickname {
        nick: nick.to_string(),
        offending: offending.join(", "),
    })
}

impl Coordinator {
    /// Handle a line from a client that has not registered yet.
    ///
    /// Only NICK, USER and QUIT do anything; everything else is dropped.
    pub(crate) fn dispatch_unregistered(&mut self, id: ClientId, command: &Command, args: &str) -> HandlerResult {
        match command {
            Command::Nick => self.set_nickname(id, args)?,
            Command::User => self.set_user(id, args)?,
            Command::Quit => {
                self.drop_client(id, "quit");
                return Ok(());
            }
            _ => return Ok(()),
        }
        self.complete_registration(id);
        Ok(())
    }

    fn set_nickname(&mut self, id: ClientId, args: &str) -> HandlerResult {
        let requested = args.split(' ').next().unwrap_or_default();
        let nick = requested.strip_prefix(':').unwrap_or(requested);
        if nick.is_empty() {
            return Err(HandlerError::NoNicknameGiven);
        }
        if self.clients.values().any(|c| c.nickname == nick) {
            return Err(HandlerError::NicknameInUse(nick.to_string()));
        }
        validate_nickname(nick)?;

        if let Some(client) = self.clients.get_mut(&id) {
            client.nickname = nick.to_string();
        }
        Ok(())
    }

    fn set_user(&mut self, id: ClientId, args: &str) -> HandlerResult {
        let fields: Vec<&str> = args.splitn(4, ' ').collect();
        let [username, _, _, realname] = fields[..] else {
            return Err(HandlerError::NeedMoreParams("USER".to_string()));
        };
        if username.is_empty() {
            return Err(HandlerError::NeedMoreParams("USER".to_string()));
        }

        if let Some(client) = self.clients.get_mut(&id) {
            client.username = username.to_string();
            client.realname = realname.strip_prefix(':').unwrap_or(realname).to_string();
        }
        Ok(())
    }

    /// Mark the client registered once both NICK and USER are in, then
    /// send it to the default room.
    fn complete_registration(&mut self, id: ClientId) {
        let Some(client) = self.clients.get_mut(&id) else {
            return;
        };
        if client.registered || client.nickname == PLACEHOLDER_NICK || client.username.is_empty() {
            return;
        }
        client.registered = true;
        info!(client = id, nick = %client.nickname, user = %client.username, "Client registered");

        let default_room = self.settings.default_room.clone();
        self.join_room(id, &default_room, "");
    }
}
