//! Server queries: LUSERS and MOTD.

use crate::error::HandlerResult;
use crate::state::client::ClientId;
use crate::state::coordinator::Coordinator;
use std::path::Path;
use tracing::warn;

/// Build the MOTD reply texts for the file at `path`.
pub async fn motd_lines(path: Option<&Path>, hostname: &str) -> Vec<String> {
    let Some(path) = path else {
        return vec!["MOTD File is missing".to_string()];
    };
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Cannot read MOTD file");
            return vec!["Error reading MOTD File".to_string()];
        }
    };

    let mut lines = vec![format!("- {hostname} Message of the day -")];
    lines.extend(
        contents
            .trim_matches('\n')
            .split('\n')
            .map(|line| format!("- {}", line.trim_end_matches('\r'))),
    );
    lines.push("End of /MOTD command".to_string());
    lines
}

impl Coordinator {
    /// `LUSERS`
    pub(crate) fn handle_lusers(&mut self, id: ClientId) -> HandlerResult {
        let users = self.clients.values().filter(|c| c.registered).count();
        if let Some(client) = self.client_ref(id) {
            client.reply_nicknamed(&[format!("There are {users} users and 0 invisible on 1 servers")]);
        }
        Ok(())
    }

    /// `MOTD`
    ///
    /// The file is read off the coordinator loop.
    pub(crate) fn handle_motd(&mut self, id: ClientId) -> HandlerResult {
        let Some(client) = self.client_ref(id) else {
            return Ok(());
        };
        let path = self.settings.motd.clone();
        let hostname = self.settings.hostname.clone();
        tokio::spawn(async move {
            for line in motd_lines(path.as_deref(), &hostname).await {
                client.reply_nicknamed(&[line]);
            }
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::coordinator::tests::{Harness, settle};

    #[tokio::test]
    async fn motd_framing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("motd.txt");
        std::fs::write(&path, "Welcome!\r\nBe nice.\n\n").unwrap();

        assert_eq!(
            motd_lines(Some(&path), "irc.test").await,
            vec![
                "- irc.test Message of the day -",
                "- Welcome!",
                "- Be nice.",
                "End of /MOTD command",
            ]
        );
        assert_eq!(motd_lines(None, "irc.test").await, vec!["MOTD File is missing"]);
        assert_eq!(
            motd_lines(Some(&dir.path().join("absent")), "irc.test").await,
            vec!["Error reading MOTD File"]
        );
    }

    #[tokio::test]
    async fn lusers_counts_registered_only() {
        let mut h = Harness::new();
        let (alice, mut rx) = h.registered("alice");
        let _bob = h.registered("bob");
        let _lurker = h.connect();
        settle(&mut rx).await;

        h.line(&alice, "LUSERS");
        h.line(&alice, "MOTD");

        assert_eq!(
            settle(&mut rx).await,
            vec![
                ":irc.test alice :There are 2 users and 0 invisible on 1 servers",
                ":irc.test alice :MOTD File is missing",
            ]
        );
    }
}
