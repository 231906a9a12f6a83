//! Network listener configuration.

use super::defaults::default_address;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Network listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ListenConfig {
    /// Address to bind to (e.g., "0.0.0.0:6667").
    #[serde(default = "default_address")]
    pub address: SocketAddr,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
        }
    }
}

/// TLS configuration. When present the listener accepts TLS only.
#[derive(Debug, Clone, Deserialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM format).
    pub cert_path: PathBuf,
    /// Path to private key file (PEM format).
    pub key_path: PathBuf,
}
