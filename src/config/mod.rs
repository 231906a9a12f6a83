//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, ServerConfig, StorageConfig)
//! - [`listen`]: Network listener configuration (ListenConfig, TlsConfig)
//! - [`validation`]: Startup checks that collect every problem at once

mod defaults;
mod listen;
mod types;
pub mod validation;

pub use listen::{ListenConfig, TlsConfig};
pub use types::{Config, ConfigError, MotdConfig, ServerConfig, StorageConfig};
pub use validation::{ValidationError, validate};
