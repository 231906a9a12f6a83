//! Client handles and identity snapshots.
//!
//! A [`ClientHandle`] is the only part of a connection that other tasks ever
//! see: an id, the remote address, a bounded outbound queue and a close
//! token. [`ClientRef`] pairs a handle with the identity the coordinator holds
//! for it, and carries the reply primitives used by the coordinator and by
//! room actors.

use crate::error::HandlerError;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Unique identifier for a connection, assigned by the gateway.
pub type ClientId = u64;

/// Nickname held by a client that has not completed NICK yet.
pub const PLACEHOLDER_NICK: &str = "*";

/// Lines queued for a client before it is dropped for SendQ.
pub const SENDQ_LEN: usize = 512;

#[derive(Debug)]
struct HandleInner {
    id: ClientId,
    addr: SocketAddr,
    hostname: Arc<str>,
    outbound: mpsc::Sender<String>,
    closed: CancellationToken,
}

/// Cheap, cloneable handle to one live connection.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    inner: Arc<HandleInner>,
}

impl ClientHandle {
    /// Create a handle and the receiving end of its outbound queue.
    pub fn new(id: ClientId, addr: SocketAddr, hostname: Arc<str>) -> (Self, mpsc::Receiver<String>) {
        let (outbound, rx) = mpsc::channel(SENDQ_LEN);
        let inner = HandleInner {
            id,
            addr,
            hostname,
            outbound,
            closed: CancellationToken::new(),
        };
        (
            Self {
                inner: Arc::new(inner),
            },
            rx,
        )
    }

    pub fn id(&self) -> ClientId {
        self.inner.id
    }

    pub fn addr(&self) -> SocketAddr {
        self.inner.addr
    }

    /// Remote host without the port.
    pub fn host(&self) -> String {
        self.inner.addr.ip().to_string()
    }

    /// Server hostname used to prefix replies.
    pub fn hostname(&self) -> &str {
        &self.inner.hostname
    }

    /// Queue a raw line for the connection.
    ///
    /// Never blocks. A full queue closes the connection; a connection that is
    /// already gone swallows the line.
    pub fn send_raw(&self, line: impl Into<String>) {
        match self.inner.outbound.try_send(line.into()) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!(client = self.inner.id, "SendQ exceeded, closing connection");
                self.close();
            }
            Err(TrySendError::Closed(_)) => {}
        }
    }

    /// Close the underlying connection. The owning Client worker observes
    /// this and reports the disconnect.
    pub fn close(&self) {
        self.inner.closed.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.is_cancelled()
    }

    pub fn closed_token(&self) -> CancellationToken {
        self.inner.closed.clone()
    }
}

impl PartialEq for ClientHandle {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for ClientHandle {}

/// Join reply fields into a line, marking the last one as trailing text.
pub fn format_parts<S: AsRef<str>>(parts: &[S]) -> String {
    match parts.split_last() {
        None => String::new(),
        Some((last, head)) => {
            let mut line = head
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<&str>>()
                .join(" ");
            if !line.is_empty() {
                line.push(' ');
            }
            line.push(':');
            line.push_str(last.as_ref());
            line
        }
    }
}

/// A connection handle plus the identity known for it at send time.
#[derive(Debug, Clone)]
pub struct ClientRef {
    pub handle: ClientHandle,
    pub nickname: String,
    pub username: String,
    pub realname: String,
}

impl ClientRef {
    /// A reference with no identity yet, as produced by the Client worker.
    pub fn anonymous(handle: ClientHandle) -> Self {
        Self {
            handle,
            nickname: PLACEHOLDER_NICK.to_string(),
            username: String::new(),
            realname: String::new(),
        }
    }

    pub fn id(&self) -> ClientId {
        self.handle.id()
    }

    /// Send a raw line.
    pub fn msg(&self, text: impl Into<String>) {
        self.handle.send_raw(text);
    }

    /// Send a line prefixed with the server identity.
    pub fn reply(&self, text: &str) {
        self.msg(format!(":{} {}", self.handle.hostname(), text));
    }

    /// Send ordered fields, the last one as trailing text.
    pub fn reply_parts<S: AsRef<str>>(&self, parts: &[S]) {
        self.reply(&format_parts(parts));
    }

    /// Send ordered fields addressed to this client's nickname.
    pub fn reply_nicknamed<S: AsRef<str>>(&self, parts: &[S]) {
        let mut all = Vec::with_capacity(parts.len() + 1);
        all.push(self.nickname.as_str());
        all.extend(parts.iter().map(AsRef::as_ref));
        self.reply_parts(&all);
    }

    /// Send the reply for a protocol error.
    pub fn reply_error(&self, err: &HandlerError) {
        self.reply_parts(&err.reply_parts(&self.nickname));
    }

    pub fn reply_not_enough_parameters(&self, command: &str) {
        self.reply_error(&HandlerError::NeedMoreParams(command.to_string()));
    }

    pub fn reply_no_channel(&self, room: &str) {
        self.reply_error(&HandlerError::NoSuchChannel(room.to_string()));
    }

    pub fn reply_no_nick_chan(&self, target: &str) {
        self.reply_error(&HandlerError::NoSuchNick(target.to_string()));
    }

    pub fn reply_already_in_channel(&self, room: &str) {
        self.reply_error(&HandlerError::AlreadyOnChannel(room.to_string()));
    }
}

impl fmt::Display for ClientRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}!{}@{}", self.nickname, self.username, self.handle.host())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_ref(nick: &str) -> (ClientRef, mpsc::Receiver<String>) {
        let addr = "10.0.0.7:40000".parse().unwrap();
        let (handle, rx) = ClientHandle::new(1, addr, Arc::from("irc.test"));
        let mut client = ClientRef::anonymous(handle);
        client.nickname = nick.to_string();
        client.username = "al".to_string();
        (client, rx)
    }

    #[test]
    fn format_parts_marks_trailing() {
        assert_eq!(format_parts(&["alice", "#room", "hello world"]), "alice #room :hello world");
        assert_eq!(format_parts(&["only"]), ":only");
        assert_eq!(format_parts::<&str>(&[]), "");
    }

    #[tokio::test]
    async fn reply_nicknamed_prefixes_server_and_nick() {
        let (client, mut rx) = test_ref("alice");
        client.reply_nicknamed(&["#room", "No topic is set"]);
        assert_eq!(rx.recv().await.unwrap(), ":irc.test alice #room :No topic is set");
    }

    #[tokio::test]
    async fn canned_replies() {
        let (client, mut rx) = test_ref("alice");
        client.reply_not_enough_parameters("JOIN");
        client.reply_no_channel("#nope");
        client.reply_no_nick_chan("ghost");
        client.reply_already_in_channel("#here");
        assert_eq!(rx.recv().await.unwrap(), ":irc.test alice JOIN :Not enough parameters");
        assert_eq!(rx.recv().await.unwrap(), ":irc.test alice #nope :No such channel");
        assert_eq!(rx.recv().await.unwrap(), ":irc.test alice ghost :No such nick/channel");
        assert_eq!(
            rx.recv().await.unwrap(),
            ":irc.test alice #here :You are already on that channel"
        );
    }

    #[test]
    fn full_queue_closes_connection() {
        let (client, _rx) = test_ref("alice");
        for _ in 0..SENDQ_LEN {
            client.msg("x");
        }
        assert!(!client.handle.is_closed());
        client.msg("one too many");
        assert!(client.handle.is_closed());
    }

    #[test]
    fn closed_queue_is_ignored() {
        let (client, rx) = test_ref("alice");
        drop(rx);
        client.msg("lost");
        assert!(!client.handle.is_closed());
    }

    #[test]
    fn display_is_a_prefix() {
        let (client, _rx) = test_ref("alice");
        assert_eq!(client.to_string(), "alice!al@10.0.0.7");
    }
}
