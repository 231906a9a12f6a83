//! Connection-level commands. PONG and AWAY are accepted and ignored.

use crate::error::{HandlerError, HandlerResult};
use crate::state::client::ClientId;
use crate::state::coordinator::Coordinator;

impl Coordinator {
    /// `PING <origin>`
    pub(crate) fn handle_ping(&mut self, id: ClientId, args: &str) -> HandlerResult {
        if args.is_empty() {
            return Err(HandlerError::NoOrigin);
        }
        let origin = args.strip_prefix(':').unwrap_or(args);
        if let Some(client) = self.client_ref(id) {
            client.reply(&format!("PONG {} :{origin}", self.settings.hostname));
        }
        Ok(())
    }
}
