//! Command handlers.
//!
//! Every command word maps to exactly one [`Command`] variant, and every
//! variant to exactly one handler on the [`Coordinator`]. Anything not in
//! the table is [`Command::Unknown`].

mod channel;
mod connection;
mod messaging;
mod server_query;
mod user_query;

pub use server_query::motd_lines;
pub use user_query::WhoisEntry;

use crate::error::{HandlerError, HandlerResult};
use crate::state::client::ClientId;
use crate::state::coordinator::Coordinator;

/// A recognised command word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Nick,
    User,
    Quit,
    Join,
    Part,
    List,
    Lusers,
    Mode,
    Motd,
    Ping,
    Pong,
    Away,
    Notice,
    Privmsg,
    Msg,
    Topic,
    Who,
    Whois,
    /// Anything else, uppercased.
    Unknown(String),
}

impl Command {
    /// Parse a command word, ignoring case.
    pub fn parse(word: &str) -> Self {
        let upper = word.to_ascii_uppercase();
        match upper.as_str() {
            "NICK" => Self::Nick,
            "USER" => Self::User,
            "QUIT" => Self::Quit,
            "JOIN" => Self::Join,
            "PART" => Self::Part,
            "LIST" => Self::List,
            "LUSERS" => Self::Lusers,
            "MODE" => Self::Mode,
            "MOTD" => Self::Motd,
            "PING" => Self::Ping,
            "PONG" => Self::Pong,
            "AWAY" => Self::Away,
            "NOTICE" => Self::Notice,
            "PRIVMSG" => Self::Privmsg,
            "MSG" => Self::Msg,
            "TOPIC" => Self::Topic,
            "WHO" => Self::Who,
            "WHOIS" => Self::Whois,
            _ => Self::Unknown(upper),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Nick => "NICK",
            Self::User => "USER",
            Self::Quit => "QUIT",
            Self::Join => "JOIN",
            Self::Part => "PART",
            Self::List => "LIST",
            Self::Lusers => "LUSERS",
            Self::Mode => "MODE",
            Self::Motd => "MOTD",
            Self::Ping => "PING",
            Self::Pong => "PONG",
            Self::Away => "AWAY",
            Self::Notice => "NOTICE",
            Self::Privmsg => "PRIVMSG",
            Self::Msg => "MSG",
            Self::Topic => "TOPIC",
            Self::Who => "WHO",
            Self::Whois => "WHOIS",
            Self::Unknown(word) => word,
        }
    }
}

/// Fail with "not enough parameters" when `args` is empty.
fn require(command: &Command, args: &str) -> Result<(), HandlerError> {
    if args.is_empty() {
        return Err(HandlerError::NeedMoreParams(command.name().to_string()));
    }
    Ok(())
}

impl Coordinator {
    /// Dispatch a command from a registered client.
    pub(crate) fn dispatch(&mut self, id: ClientId, command: &Command, args: &str) -> HandlerResult {
        match command {
            Command::Quit => {
                self.drop_client(id, "quit");
                Ok(())
            }
            Command::Pong | Command::Away => Ok(()),
            Command::Join => {
                require(command, args)?;
                self.handle_join(id, args);
                Ok(())
            }
            Command::Part => {
                require(command, args)?;
                self.handle_part(id, args);
                Ok(())
            }
            Command::List => self.handle_list(id, args),
            Command::Lusers => self.handle_lusers(id),
            Command::Mode => {
                require(command, args)?;
                self.handle_mode(id, args)
            }
            Command::Motd => self.handle_motd(id),
            Command::Ping => self.handle_ping(id, args),
            Command::Notice | Command::Privmsg => self.handle_privmsg(id, command, args),
            Command::Msg => self.handle_msg(id, args),
            Command::Topic => {
                require(command, args)?;
                self.handle_topic(id, args)
            }
            Command::Who => {
                require(command, args)?;
                self.handle_who(id, args)
            }
            Command::Whois => {
                require(command, args)?;
                self.handle_whois(id, args)
            }
            Command::Nick | Command::User | Command::Unknown(_) => {
                Err(HandlerError::UnknownCommand(command.name().to_string()))
            }
        }
    }
}
