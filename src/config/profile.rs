//! Zendesk profile configuration.

use std::env;

use serde::{Deserialize, Serialize};

use super::{ConfigError, Result};
use crate::api::{self, Credential};

/// Request timeout used when a profile does not set one.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// How a profile authenticates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    /// Agent email plus API token.
    #[default]
    ApiToken,
    /// OAuth access token.
    Oauth,
}

/// A Zendesk profile configuration.
///
/// Profiles store connection details for one Zendesk account. Secrets are
/// kept in the OS keychain under the profile name, unless the profile was
/// built from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// The name of this profile.
    ///
    /// Must be non-empty and unique across all profiles.
    pub name: String,

    /// Account subdomain, as in `{subdomain}.zendesk.com`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdomain: Option<String>,

    /// Full instance URL, for host-mapped or test instances.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// The agent's email address. Required for API-token auth.
    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub auth: AuthMethod,

    /// Per-request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    #[serde(skip)]
    inline_credential: Option<Credential>,
}

impl Profile {
    /// Create an API-token profile for a subdomain.
    pub fn new(name: String, subdomain: String, email: String) -> Self {
        Self {
            name,
            subdomain: Some(subdomain),
            url: None,
            email,
            auth: AuthMethod::ApiToken,
            timeout_secs: None,
            inline_credential: None,
        }
    }

    /// Create an API-token profile for an explicit instance URL.
    pub fn with_url(name: String, url: String, email: String) -> Self {
        Self {
            subdomain: None,
            url: Some(url),
            ..Self::new(name, String::new(), email)
        }
    }

    /// Build a profile from `ZENDESK_*` environment variables.
    ///
    /// Reads `ZENDESK_SUBDOMAIN` or `ZENDESK_URL` for the endpoint and
    /// `ZENDESK_EMAIL` + `ZENDESK_API_TOKEN`, or `ZENDESK_OAUTH_TOKEN`, for
    /// the credential. The secret stays in memory; the keyring is not used.
    pub fn from_env() -> Result<Self> {
        let subdomain = env_var("ZENDESK_SUBDOMAIN");
        let url = env_var("ZENDESK_URL");
        if subdomain.is_none() && url.is_none() {
            return Err(ConfigError::MissingEnv("ZENDESK_SUBDOMAIN"));
        }

        let email = env_var("ZENDESK_EMAIL").unwrap_or_default();
        let (auth, credential) = if let Some(token) = env_var("ZENDESK_API_TOKEN") {
            if email.is_empty() {
                return Err(ConfigError::MissingEnv("ZENDESK_EMAIL"));
            }
            (AuthMethod::ApiToken, Credential::api_token(&email, &token))
        } else if let Some(token) = env_var("ZENDESK_OAUTH_TOKEN") {
            (AuthMethod::Oauth, Credential::bearer(&token))
        } else {
            return Err(ConfigError::MissingEnv("ZENDESK_API_TOKEN"));
        };

        let profile = Self {
            name: "env".to_string(),
            subdomain,
            url,
            email,
            auth,
            timeout_secs: env_var("ZENDESK_TIMEOUT_SECS").and_then(|v| v.parse().ok()),
            inline_credential: Some(credential),
        };
        profile.validate()?;
        Ok(profile)
    }

    /// Validate this profile.
    ///
    /// Checks that:
    /// - The name is non-empty and has no whitespace
    /// - Exactly one of subdomain and URL is set, and the URL is http(s)
    /// - API-token profiles carry a plausible email address
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::ValidationError` with details if validation fails.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(ConfigError::ValidationError(
                "profile name cannot be empty".to_string(),
            ));
        }

        if self.name.contains(char::is_whitespace) {
            return Err(ConfigError::ValidationError(format!(
                "profile name '{}' cannot contain whitespace",
                self.name
            )));
        }

        match (self.subdomain.as_deref(), self.url.as_deref()) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::ValidationError(format!(
                    "profile '{}': set either subdomain or URL, not both",
                    self.name
                )))
            }
            (None, None) | (Some(""), None) | (None, Some("")) => {
                return Err(ConfigError::ValidationError(format!(
                    "profile '{}': subdomain or URL is required",
                    self.name
                )))
            }
            (Some(subdomain), None) => {
                if !subdomain
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-')
                {
                    return Err(ConfigError::ValidationError(format!(
                        "profile '{}': '{}' is not a valid subdomain",
                        self.name, subdomain
                    )));
                }
            }
            (None, Some(url)) => {
                if !url.starts_with("https://") && !url.starts_with("http://") {
                    return Err(ConfigError::ValidationError(format!(
                        "profile '{}': URL must start with http:// or https://",
                        self.name
                    )));
                }
            }
        }

        if self.auth == AuthMethod::ApiToken {
            if self.email.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "profile '{}': email cannot be empty",
                    self.name
                )));
            }

            if !self.email.contains('@') {
                return Err(ConfigError::ValidationError(format!(
                    "profile '{}': '{}' does not appear to be a valid email address",
                    self.name, self.email
                )));
            }
        }

        Ok(())
    }

    /// The API base endpoint, ending in `/api/v2`.
    pub fn endpoint(&self) -> Result<String> {
        match (self.subdomain.as_deref(), self.url.as_deref()) {
            (Some(subdomain), None) if !subdomain.is_empty() => {
                Ok(api::subdomain_endpoint(subdomain))
            }
            (None, Some(url)) if !url.is_empty() => {
                let url = url.trim_end_matches('/');
                if url.ends_with("/api/v2") {
                    Ok(url.to_string())
                } else {
                    Ok(format!("{}/api/v2", url))
                }
            }
            _ => Err(ConfigError::ValidationError(format!(
                "profile '{}': cannot determine endpoint",
                self.name
            ))),
        }
    }

    /// The credential for this profile.
    ///
    /// Uses the in-memory secret of environment profiles, otherwise reads the
    /// token stored in the keyring under the profile name.
    pub fn credential(&self) -> api::Result<Credential> {
        if let Some(credential) = &self.inline_credential {
            return Ok(credential.clone());
        }
        match self.auth {
            AuthMethod::ApiToken => Credential::api_token_from_keyring(&self.name, &self.email),
            AuthMethod::Oauth => Credential::bearer_from_keyring(&self.name),
        }
    }

    /// The per-request timeout in seconds.
    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }
}

fn env_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}
