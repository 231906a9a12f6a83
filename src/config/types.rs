//! Core configuration types and loading.

use super::defaults::default_room;
use super::listen::{ListenConfig, TlsConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server identity and behaviour.
    pub server: ServerConfig,
    /// Network listen configuration.
    #[serde(default)]
    pub listen: ListenConfig,
    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
    /// Message of the Day configuration.
    #[serde(default)]
    pub motd: MotdConfig,
    /// Activity log and room state directories.
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

/// Server identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Hostname used to prefix every reply (e.g., "irc.example.net").
    pub hostname: String,
    /// Room every client joins once registered.
    #[serde(default = "default_room")]
    pub default_room: String,
    /// Extra debug logging for commands and joins.
    #[serde(default)]
    pub verbose: bool,
    /// Run the liveness sweep on a timer instead of only on traffic.
    #[serde(default)]
    pub liveness_timer: bool,
}

/// Message of the Day configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MotdConfig {
    /// Path to the MOTD text file.
    pub path: Option<PathBuf>,
}

/// Storage configuration. Missing directories disable the matching sink.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    /// Absolute directory for per-room activity logs.
    pub log_dir: Option<PathBuf>,
    /// Absolute directory for per-room state files.
    pub state_dir: Option<PathBuf>,
}
