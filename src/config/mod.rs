//! Configuration management for the Zendesk client.
//!
//! This module handles loading and saving the TOML configuration file
//! and resolving profiles into endpoints and credentials.

mod profile;
mod settings;

pub use profile::{AuthMethod, Profile, DEFAULT_TIMEOUT_SECS};
pub use settings::Config;

use thiserror::Error;

/// Errors raised while loading, saving or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine the configuration directory")]
    NoConfigDir,

    #[error("failed to create configuration directory: {0}")]
    CreateDirError(#[source] std::io::Error),

    #[error("failed to read configuration file: {0}")]
    ReadError(#[source] std::io::Error),

    #[error("failed to write configuration file: {0}")]
    WriteError(#[source] std::io::Error),

    #[error("failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("failed to serialize configuration: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("invalid configuration: {0}")]
    ValidationError(String),

    #[error("profile '{0}' not found")]
    ProfileNotFound(String),

    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
