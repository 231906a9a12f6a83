//! Test server management.
//!
//! Runs a lobbyd instance inside the test's runtime on an ephemeral port.

use lobbyd::Server;
use lobbyd::config::Config;
use std::net::SocketAddr;
use std::path::Path;
use tokio::task::JoinHandle;

pub const HOSTNAME: &str = "irc.test";

/// A test server instance. Stops when dropped.
pub struct TestServer {
    addr: SocketAddr,
    task: JoinHandle<anyhow::Result<()>>,
}

impl TestServer {
    /// Spawn a server with default settings.
    pub async fn spawn() -> anyhow::Result<Self> {
        Self::spawn_with("").await
    }

    /// Spawn a server that keeps room state in `state_dir`.
    #[allow(dead_code)]
    pub async fn spawn_with_state(state_dir: &Path) -> anyhow::Result<Self> {
        Self::spawn_with(&format!("[storage]\nstate_dir = {:?}\n", state_dir.display().to_string())).await
    }

    /// Spawn a server with extra TOML sections appended to the base config.
    pub async fn spawn_with(extra: &str) -> anyhow::Result<Self> {
        let config_content = format!(
            r#"
[server]
hostname = "{HOSTNAME}"

[listen]
address = "127.0.0.1:0"

{extra}
"#
        );
        let config = Config::parse(&config_content)?;
        let server = Server::build(&config).await?;
        let addr = server.local_addr()?;
        let task = tokio::spawn(server.run());
        Ok(Self { addr, task })
    }

    /// Get the server address.
    pub fn address(&self) -> SocketAddr {
        self.addr
    }

    /// Create a new test client connected to this server.
    pub async fn connect(&self, nick: &str) -> anyhow::Result<super::client::TestClient> {
        super::client::TestClient::connect(self.addr, nick).await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
