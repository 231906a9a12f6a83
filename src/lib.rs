//! lobbyd - a small multi-room chat server speaking a subset of IRC.
//!
//! One coordinator task owns the client and room registries, one actor task
//! per room owns that room's members, topic and key, and one task per
//! connection moves lines between the socket and the coordinator. Tasks
//! only talk through mailboxes.

pub mod config;
pub mod error;
pub mod handlers;
pub mod network;
pub mod sink;
pub mod state;

use crate::config::Config;
use crate::network::Gateway;
use crate::sink::{FileActivityLog, FileStateStore, LogSink, StateSink, StateStore};
use crate::state::coordinator::{Coordinator, CoordinatorSettings, Inbound, spawn_liveness_timer};
use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

/// A bound, ready-to-run server.
pub struct Server {
    gateway: Gateway,
    coordinator: Coordinator,
    inbox: mpsc::UnboundedReceiver<Inbound>,
    liveness_timer: bool,
}

impl Server {
    /// Set up sinks, restore persisted rooms and bind the listener.
    pub async fn build(config: &Config) -> anyhow::Result<Self> {
        let log = match &config.storage.log_dir {
            Some(dir) => {
                tokio::fs::create_dir_all(dir)
                    .await
                    .with_context(|| format!("cannot create log_dir {}", dir.display()))?;
                info!(dir = %dir.display(), "Activity logger initialized");
                LogSink::spawn(Arc::new(FileActivityLog::new(dir)))
            }
            None => LogSink::disabled(),
        };

        let (state, snapshots) = match &config.storage.state_dir {
            Some(dir) => {
                tokio::fs::create_dir_all(dir)
                    .await
                    .with_context(|| format!("cannot create state_dir {}", dir.display()))?;
                let store = Arc::new(FileStateStore::new(dir));
                let snapshots = store
                    .load_all()
                    .await
                    .with_context(|| format!("cannot read state_dir {}", dir.display()))?;
                info!(dir = %dir.display(), rooms = snapshots.len(), "State keeper initialized");
                (StateSink::spawn(store), snapshots)
            }
            None => (StateSink::disabled(), Vec::new()),
        };

        let hostname: Arc<str> = Arc::from(config.server.hostname.as_str());
        let settings = CoordinatorSettings {
            hostname: Arc::clone(&hostname),
            default_room: config.server.default_room.clone(),
            motd: config.motd.path.clone(),
            verbose: config.server.verbose,
        };
        let (mut coordinator, inbox) = Coordinator::new(settings, log, state);
        coordinator.restore(snapshots);

        let gateway = Gateway::bind(
            config.listen.address,
            config.tls.as_ref(),
            coordinator.handle(),
            hostname,
        )
        .await?;

        Ok(Self {
            gateway,
            coordinator,
            inbox,
            liveness_timer: config.server.liveness_timer,
        })
    }

    /// Address the listener is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.gateway.local_addr()
    }

    /// Run the coordinator and accept connections until the task is dropped.
    pub async fn run(self) -> anyhow::Result<()> {
        let Self {
            gateway,
            coordinator,
            inbox,
            liveness_timer,
        } = self;

        if liveness_timer {
            spawn_liveness_timer(coordinator.handle());
        }
        tokio::spawn(coordinator.run(inbox));
        gateway.run().await
    }
}
