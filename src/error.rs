//! Centralized error types for the Zendesk client.
//!
//! API operations return [`ApiError`] directly. This module adds the
//! crate-level [`Error`] used where configuration and API failures meet,
//! such as building a client from a profile, with user-friendly messages.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;

/// The crate-level error type.
///
/// Aggregates configuration and API errors while preserving the underlying
/// error for inspection.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration-related errors.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// API-related errors.
    #[error("{0}")]
    Api(#[from] ApiError),
}

impl Error {
    /// Get a user-friendly message for display.
    ///
    /// Suitable for showing to an operator, without technical detail.
    pub fn user_message(&self) -> String {
        match self {
            Error::Config(e) => match e {
                ConfigError::NoConfigDir => {
                    "Could not find configuration directory. Please check your system settings."
                        .to_string()
                }
                ConfigError::CreateDirError(_) => {
                    "Could not create configuration directory. Check file permissions.".to_string()
                }
                ConfigError::ReadError(_) => {
                    "Could not read configuration file. Please check the file exists and is readable.".to_string()
                }
                ConfigError::WriteError(_) => {
                    "Could not save configuration. Please check file permissions.".to_string()
                }
                ConfigError::ParseError(_) => {
                    "Configuration file is invalid. Please check the file format.".to_string()
                }
                ConfigError::SerializeError(_) => {
                    "Could not save configuration. Internal error.".to_string()
                }
                ConfigError::ValidationError(msg) => format!("Configuration error: {}", msg),
                ConfigError::ProfileNotFound(name) => format!("Profile '{}' not found.", name),
                ConfigError::MissingEnv(key) => format!("Set {} to configure the client.", key),
            },
            Error::Api(e) => match e {
                ApiError::Connectivity(_) => {
                    "Could not reach Zendesk. Please check your network and subdomain.".to_string()
                }
                ApiError::Http { status, .. } => match status.as_u16() {
                    401 => "Authentication failed. Please check your email and API token."
                        .to_string(),
                    403 => "Access denied. You don't have permission to access this resource."
                        .to_string(),
                    422 => match e.error_details() {
                        Some(details) => format!("Zendesk rejected the record: {}", details.summary()),
                        None => "Zendesk rejected the record.".to_string(),
                    },
                    429 => "Too many requests. Please wait a moment and try again.".to_string(),
                    500..=599 => "Zendesk server error. Please try again later.".to_string(),
                    code => format!("Zendesk returned an unexpected status ({}).", code),
                },
                ApiError::NotFound { .. } => "The requested record was not found.".to_string(),
                ApiError::Decode(_) => {
                    "Unexpected response from Zendesk. Please try again.".to_string()
                }
                ApiError::Encoding(msg) => format!("Invalid request: {}", msg),
                ApiError::Cancelled => "The request was cancelled.".to_string(),
                ApiError::DeadlineExceeded => "The request timed out.".to_string(),
                ApiError::Keyring(_) => {
                    "Could not access secure storage. Please store the profile's token again."
                        .to_string()
                }
            },
        }
    }

    /// Check if this error is recoverable.
    ///
    /// Recoverable errors may succeed when the same call is made again later.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Api(e) => {
                e.is_connectivity()
                    || e.is_cancellation()
                    || e.status().is_some_and(|status| {
                        status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
                    })
            }
            _ => false,
        }
    }
}

/// Result type for crate-level operations.
pub type Result<T> = std::result::Result<T, Error>;
