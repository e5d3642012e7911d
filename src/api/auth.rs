//! Authentication handling for the Zendesk API.
//!
//! Zendesk accepts an agent email plus API token (Basic auth with the
//! `{email}/token` username), an OAuth bearer token, or email plus password.
//! Secrets can be kept in the OS keyring, keyed by profile name.

use std::fmt;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use super::error::{ApiError, Result};

/// The keyring service name for stored tokens.
pub const KEYRING_SERVICE: &str = "zendesk";

/// Credentials attached to every request.
///
/// The `Authorization` header value is rendered once at construction; the
/// raw secret is not kept.
#[derive(Clone)]
pub struct Credential {
    kind: CredentialKind,
    identity: Option<String>,
    auth_header: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CredentialKind {
    ApiToken,
    Bearer,
    Basic,
}

impl Credential {
    /// Email + API token.
    pub fn api_token(email: &str, token: &str) -> Self {
        Self {
            kind: CredentialKind::ApiToken,
            identity: Some(email.to_string()),
            auth_header: basic_header(&format!("{}/token", email), token),
        }
    }

    /// OAuth access token.
    pub fn bearer(token: &str) -> Self {
        Self {
            kind: CredentialKind::Bearer,
            identity: None,
            auth_header: format!("Bearer {}", token),
        }
    }

    /// Email + password.
    pub fn basic(email: &str, password: &str) -> Self {
        Self {
            kind: CredentialKind::Basic,
            identity: Some(email.to_string()),
            auth_header: basic_header(email, password),
        }
    }

    /// Build an API-token credential using the token stored for `profile_name`.
    pub fn api_token_from_keyring(profile_name: &str, email: &str) -> Result<Self> {
        let token = get_token(profile_name)?;
        Ok(Self::api_token(email, &token))
    }

    /// Build a bearer credential using the token stored for `profile_name`.
    pub fn bearer_from_keyring(profile_name: &str) -> Result<Self> {
        let token = get_token(profile_name)?;
        Ok(Self::bearer(&token))
    }

    /// Get the authorization header value for HTTP requests.
    pub fn header_value(&self) -> &str {
        &self.auth_header
    }

    /// The email the credential authenticates as, if any.
    pub fn email(&self) -> Option<&str> {
        self.identity.as_deref()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("kind", &self.kind)
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

fn basic_header(user: &str, secret: &str) -> String {
    let credentials = format!("{}:{}", user, secret);
    format!("Basic {}", BASE64.encode(credentials.as_bytes()))
}

/// Store an API token in the OS keyring.
pub fn store_token(profile_name: &str, token: &str) -> Result<()> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, profile_name)
        .map_err(|e| ApiError::Keyring(format!("failed to create keyring entry: {}", e)))?;

    entry
        .set_password(token)
        .map_err(|e| ApiError::Keyring(format!("failed to store token: {}", e)))
}

/// Retrieve an API token from the OS keyring.
pub fn get_token(profile_name: &str) -> Result<String> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, profile_name)
        .map_err(|e| ApiError::Keyring(format!("failed to access keyring: {}", e)))?;

    entry
        .get_password()
        .map_err(|e| ApiError::Keyring(format!("failed to retrieve token: {}", e)))
}

/// Delete an API token from the OS keyring.
pub fn delete_token(profile_name: &str) -> Result<()> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, profile_name)
        .map_err(|e| ApiError::Keyring(format!("failed to access keyring: {}", e)))?;

    entry
        .delete_password()
        .map_err(|e| ApiError::Keyring(format!("failed to delete token: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_basic(header: &str) -> String {
        let encoded = header.strip_prefix("Basic ").unwrap();
        String::from_utf8(BASE64.decode(encoded).unwrap()).unwrap()
    }

    #[test]
    fn test_api_token_header() {
        let cred = Credential::api_token("agent@example.com", "abc123");
        assert_eq!(decode_basic(cred.header_value()), "agent@example.com/token:abc123");
        assert_eq!(cred.email(), Some("agent@example.com"));
    }

    #[test]
    fn test_bearer_header() {
        let cred = Credential::bearer("oauth-token");
        assert_eq!(cred.header_value(), "Bearer oauth-token");
        assert_eq!(cred.email(), None);
    }

    #[test]
    fn test_basic_header() {
        let cred = Credential::basic("agent@example.com", "hunter2");
        assert_eq!(decode_basic(cred.header_value()), "agent@example.com:hunter2");
    }

    #[test]
    fn test_debug_does_not_expose_secret() {
        let cred = Credential::api_token("agent@example.com", "secret_token");
        let debug_output = format!("{:?}", cred);
        assert!(!debug_output.contains("secret_token"));
        assert!(!debug_output.contains(cred.header_value()));

        let debug_output = format!("{:?}", Credential::bearer("secret_token"));
        assert!(!debug_output.contains("secret_token"));
    }
}
