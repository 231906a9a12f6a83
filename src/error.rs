//! Unified error handling for lobbyd.
//!
//! Protocol errors never leave the task that produced them: each
//! `HandlerError` is turned into exactly one text reply for the offending
//! client and the dispatch loop carries on.

use thiserror::Error;

// ============================================================================
// Handler Errors (command processing)
// ============================================================================

/// Errors that can occur during command handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    #[error("not enough parameters for {0}")]
    NeedMoreParams(String),

    #[error("no nickname given")]
    NoNicknameGiven,

    #[error("nickname in use: {0}")]
    NicknameInUse(String),

    #[error("erroneous nickname: {nick}")]
    ErroneousNickname { nick: String, offending: String },

    #[error("no such channel: {0}")]
    NoSuchChannel(String),

    #[error("no such nick/channel: {0}")]
    NoSuchNick(String),

    #[error("not on channel: {0}")]
    NotOnChannel(String),

    #[error("already on channel: {0}")]
    AlreadyOnChannel(String),

    #[error("bad channel key for {0}")]
    BadChannelKey(String),

    #[error("unknown MODE flag: {0}")]
    UnknownModeFlag(String),

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("no recipient given ({0})")]
    NoRecipient(String),

    #[error("no channel given")]
    NoChannelGiven,

    #[error("no recipients found in {0:?}")]
    NoRecipientsInRoom(String),

    #[error("no text to send")]
    NoTextToSend,

    #[error("no origin specified")]
    NoOrigin,
}

impl HandlerError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NeedMoreParams(_) => "need_more_params",
            Self::NoNicknameGiven => "no_nickname_given",
            Self::NicknameInUse(_) => "nickname_in_use",
            Self::ErroneousNickname { .. } => "erroneous_nickname",
            Self::NoSuchChannel(_) => "no_such_channel",
            Self::NoSuchNick(_) => "no_such_nick",
            Self::NotOnChannel(_) => "not_on_channel",
            Self::AlreadyOnChannel(_) => "already_on_channel",
            Self::BadChannelKey(_) => "bad_channel_key",
            Self::UnknownModeFlag(_) => "unknown_mode_flag",
            Self::UnknownCommand(_) => "unknown_command",
            Self::NoRecipient(_) => "no_recipient",
            Self::NoChannelGiven => "no_channel_given",
            Self::NoRecipientsInRoom(_) => "no_recipients",
            Self::NoTextToSend => "no_text_to_send",
            Self::NoOrigin => "no_origin",
        }
    }

    /// Build the reply fields for this error, addressed to `nick`.
    ///
    /// The last field is the trailing text; see [`format_parts`].
    ///
    /// [`format_parts`]: crate::state::format_parts
    pub fn reply_parts(&self, nick: &str) -> Vec<String> {
        let nicknamed = |fields: &[&str]| -> Vec<String> {
            std::iter::once(nick.to_string())
                .chain(fields.iter().map(|field| field.to_string()))
                .collect()
        };
        match self {
            Self::NeedMoreParams(cmd) => nicknamed(&[cmd.as_str(), "Not enough parameters"]),
            Self::NoNicknameGiven => nicknamed(&["No nickname given"]),
            // Registration failures are addressed to "*": the client has no nickname yet.
            Self::NicknameInUse(bad) => vec![
                "*".to_string(),
                bad.clone(),
                "Nickname is already in use".to_string(),
            ],
            Self::ErroneousNickname { nick: bad, offending } => {
                let text = if offending.is_empty() {
                    "Erroneous nickname".to_string()
                } else {
                    format!("Erroneous nickname; contains {offending}")
                };
                vec!["*".to_string(), bad.clone(), text]
            }
            Self::NoSuchChannel(chan) => nicknamed(&[chan.as_str(), "No such channel"]),
            Self::NoSuchNick(target) => nicknamed(&[target.as_str(), "No such nick/channel"]),
            Self::NotOnChannel(chan) => nicknamed(&[chan.as_str(), "You are not on that channel"]),
            Self::AlreadyOnChannel(chan) => nicknamed(&[chan.as_str(), "You are already on that channel"]),
            Self::BadChannelKey(chan) => nicknamed(&[chan.as_str(), "Cannot join channel (+k) - bad key"]),
            Self::UnknownModeFlag(flag) => nicknamed(&[flag.as_str(), "Unknown MODE flag"]),
            Self::UnknownCommand(cmd) => nicknamed(&[cmd.as_str(), "Unknown command"]),
            Self::NoRecipient(cmd) => nicknamed(&[format!("No recipient given ({cmd})").as_str()]),
            Self::NoChannelGiven => nicknamed(&["No channel given (MSG)"]),
            Self::NoRecipientsInRoom(room) => {
                nicknamed(&[format!("No recipients found in {room} with that name.").as_str()])
            }
            Self::NoTextToSend => nicknamed(&["No text to send"]),
            Self::NoOrigin => nicknamed(&["No origin specified"]),
        }
    }
}

/// Result type for command handlers.
pub type HandlerResult = Result<(), HandlerError>;
