//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use crate::state::actor::room_name_valid;
use std::path::PathBuf;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("server.hostname is required")]
    MissingHostname,
    #[error("server.default_room is not a valid room name: {0}")]
    InvalidDefaultRoom(String),
    #[error("storage.log_dir must be absolute: {0}")]
    RelativeLogDir(PathBuf),
    #[error("storage.state_dir must be absolute: {0}")]
    RelativeStateDir(PathBuf),
    #[error("tls.cert_path does not exist: {0}")]
    TlsCertNotFound(PathBuf),
    #[error("tls.key_path does not exist: {0}")]
    TlsKeyNotFound(PathBuf),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.hostname.is_empty() {
        errors.push(ValidationError::MissingHostname);
    }
    if !room_name_valid(&config.server.default_room) {
        errors.push(ValidationError::InvalidDefaultRoom(
            config.server.default_room.clone(),
        ));
    }

    if let Some(dir) = &config.storage.log_dir
        && !dir.is_absolute()
    {
        errors.push(ValidationError::RelativeLogDir(dir.clone()));
    }
    if let Some(dir) = &config.storage.state_dir
        && !dir.is_absolute()
    {
        errors.push(ValidationError::RelativeStateDir(dir.clone()));
    }

    if let Some(tls) = &config.tls {
        if !tls.cert_path.exists() {
            errors.push(ValidationError::TlsCertNotFound(tls.cert_path.clone()));
        }
        if !tls.key_path.exists() {
            errors.push(ValidationError::TlsKeyNotFound(tls.key_path.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
