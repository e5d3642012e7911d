//! API error types for the Zendesk client.
//!
//! Every failure surfaced by the client lands in exactly one [`ApiError`]
//! variant. Callers branch on the kind (connectivity, HTTP status, decode,
//! encoding, cancellation) through the inspection methods instead of parsing
//! bodies or messages.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use super::transport::TransportError;

/// Maximum number of body bytes rendered in `Display` output.
const BODY_PREVIEW_LIMIT: usize = 256;

/// Errors that can occur when interacting with the Zendesk API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The transport never completed the round trip (DNS, refused, timeout).
    #[error("Connection failed: {0}")]
    Connectivity(#[from] TransportError),

    /// The response status was outside the accepted set.
    #[error("HTTP {status}: {}", body_preview(.body))]
    Http { status: StatusCode, body: Vec<u8> },

    /// The response status was 404.
    ///
    /// For job lookups this means the job expired or never existed.
    #[error("Resource not found: {}", body_preview(.body))]
    NotFound { body: Vec<u8> },

    /// The status was accepted but the body did not have the expected shape.
    #[error("Invalid API response: {0}")]
    Decode(String),

    /// Caller-supplied options or payloads could not be serialized.
    #[error("Failed to encode request: {0}")]
    Encoding(String),

    /// The caller cancelled the operation.
    #[error("Request cancelled")]
    Cancelled,

    /// The caller's deadline elapsed before the response arrived.
    #[error("Request deadline exceeded")]
    DeadlineExceeded,

    /// Keyring error when storing/retrieving tokens.
    #[error("Keyring error: {0}")]
    Keyring(String),
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Create an error from a rejected HTTP status and its raw body.
    pub fn from_status(status: StatusCode, body: Vec<u8>) -> Self {
        if status == StatusCode::NOT_FOUND {
            ApiError::NotFound { body }
        } else {
            ApiError::Http { status, body }
        }
    }

    /// The HTTP status carried by this error, if it came from a response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::NotFound { .. } => Some(StatusCode::NOT_FOUND),
            _ => None,
        }
    }

    /// The raw response body, undecoded.
    pub fn body(&self) -> Option<&[u8]> {
        match self {
            ApiError::Http { body, .. } | ApiError::NotFound { body } => Some(body),
            _ => None,
        }
    }

    /// The raw response body as (lossy) UTF-8 text.
    pub fn body_text(&self) -> Option<String> {
        self.body()
            .map(|body| String::from_utf8_lossy(body).into_owned())
    }

    /// Check whether this is an HTTP error with the given status code.
    pub fn is_status(&self, code: u16) -> bool {
        self.status().is_some_and(|status| status.as_u16() == code)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    /// A job lookup that returns 404 refers to a job past the platform's
    /// retention window (or one that never existed).
    pub fn is_expired_job(&self) -> bool {
        self.is_not_found()
    }

    pub fn is_connectivity(&self) -> bool {
        matches!(self, ApiError::Connectivity(_))
    }

    /// True for both explicit cancellation and an elapsed deadline.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, ApiError::Cancelled | ApiError::DeadlineExceeded)
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, ApiError::Decode(_))
    }

    /// Best-effort parse of the platform's JSON error body.
    ///
    /// Returns `None` when there is no body or it is not a recognizable
    /// error document. Never changes the error kind.
    pub fn error_details(&self) -> Option<ErrorDetails> {
        let body = self.body()?;
        let details: ErrorDetails = serde_json::from_slice(body).ok()?;
        if details.error.is_none() && details.description.is_none() {
            return None;
        }
        Some(details)
    }
}

/// The JSON document Zendesk returns alongside most 4xx responses.
///
/// `error` is a string code (`"RecordInvalid"`) on most endpoints and an
/// object with `title`/`message` on a few, so it stays untyped.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetails {
    #[serde(default)]
    pub error: Option<serde_json::Value>,
    #[serde(default)]
    pub description: Option<String>,
    /// Per-field validation errors keyed by field name.
    #[serde(default)]
    pub details: Option<serde_json::Map<String, serde_json::Value>>,
}

impl ErrorDetails {
    /// A single-line summary suitable for logs.
    pub fn summary(&self) -> String {
        let code = match &self.error {
            Some(serde_json::Value::String(code)) => Some(code.clone()),
            Some(serde_json::Value::Object(obj)) => obj
                .get("title")
                .or_else(|| obj.get("message"))
                .and_then(|v| v.as_str())
                .map(str::to_string),
            _ => None,
        };

        match (code, &self.description) {
            (Some(code), Some(description)) => format!("{}: {}", code, description),
            (Some(code), None) => code,
            (None, Some(description)) => description.clone(),
            (None, None) => String::new(),
        }
    }

    /// Names of the fields that failed validation.
    pub fn invalid_fields(&self) -> Vec<&str> {
        self.details
            .as_ref()
            .map(|details| details.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

fn body_preview(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    if text.len() <= BODY_PREVIEW_LIMIT {
        return text.into_owned();
    }
    let mut end = BODY_PREVIEW_LIMIT;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}
