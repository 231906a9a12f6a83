//! WHOIS.

use crate::error::{HandlerError, HandlerResult};
use crate::state::client::{ClientId, PLACEHOLDER_NICK};
use crate::state::coordinator::{Client, Coordinator};

/// What WHOIS reports about one client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhoisEntry {
    pub nickname: String,
    pub username: String,
    pub host: String,
    pub realname: String,
    pub rooms: Vec<String>,
}

impl WhoisEntry {
    fn from_client(client: &Client) -> Self {
        Self {
            nickname: client.nickname.clone(),
            username: client.username.clone(),
            host: client.handle.host(),
            realname: client.realname.clone(),
            rooms: client.room.iter().cloned().collect(),
        }
    }

    /// Reply fields, one entry per line, ending with the terminator.
    pub fn reply_lines(&self, hostname: &str) -> Vec<Vec<String>> {
        let mut rooms = self.rooms.clone();
        rooms.sort();
        let nick = self.nickname.clone();
        vec![
            vec![
                nick.clone(),
                self.username.clone(),
                self.host.clone(),
                "*".to_string(),
                self.realname.clone(),
            ],
            vec![nick.clone(), hostname.to_string(), hostname.to_string()],
            vec![nick.clone(), rooms.join(" ")],
            vec![nick, "End of /WHOIS list".to_string()],
        ]
    }
}

impl Coordinator {
    /// `WHOIS [server] nick1,nick2`
    ///
    /// Any live client holding a nickname matches, registered or not.
    pub(crate) fn handle_whois(&mut self, id: ClientId, args: &str) -> HandlerResult {
        let Some(client) = self.client_ref(id) else {
            return Ok(());
        };
        let nicknames = args.split(' ').next_back().unwrap_or_default();

        for wanted in nicknames.split(',') {
            let wanted_lower = wanted.to_lowercase();
            let found = self
                .clients
                .values()
                .find(|c| c.nickname != PLACEHOLDER_NICK && c.nickname.to_lowercase() == wanted_lower);
            match found {
                Some(target) => {
                    for line in WhoisEntry::from_client(target).reply_lines(&self.settings.hostname) {
                        client.reply_nicknamed(&line);
                    }
                }
                None => client.reply_error(&HandlerError::NoSuchNick(wanted.to_string())),
            }
        }
        Ok(())
    }
}
