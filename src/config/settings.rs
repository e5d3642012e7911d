//! The configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::profile::{Profile, DEFAULT_TIMEOUT_SECS};
use super::{ConfigError, Result};

const CONFIG_DIR: &str = "zendesk";
const CONFIG_FILE: &str = "config.toml";

/// Client configuration: a set of named profiles plus shared defaults.
///
/// ```toml
/// default_profile = "work"
/// timeout_secs = 30
///
/// [[profiles]]
/// name = "work"
/// subdomain = "acme"
/// email = "agent@acme.com"
/// auth = "api_token"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// The name of the profile used when none is requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,
    /// Request timeout applied to profiles that do not set their own.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub profiles: Vec<Profile>,
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            profiles: Vec::new(),
        }
    }
}

impl Config {
    /// Path of the configuration file in the platform config directory.
    pub fn path() -> Result<PathBuf> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load the configuration file, or the default configuration if it does
    /// not exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if !path.exists() {
            debug!(path = %path.display(), "No configuration file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load and validate the configuration at `path`.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        debug!(
            path = %path.display(),
            profiles = config.profiles.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Save to the platform config directory.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Save to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(ConfigError::CreateDirError)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(ConfigError::WriteError)?;
        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Validate every profile, name uniqueness and the default profile.
    pub fn validate(&self) -> Result<()> {
        for (i, profile) in self.profiles.iter().enumerate() {
            profile.validate()?;
            if self.profiles[..i].iter().any(|p| p.name == profile.name) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate profile '{}'",
                    profile.name
                )));
            }
        }

        if let Some(name) = &self.default_profile {
            if !self.profiles.iter().any(|p| &p.name == name) {
                return Err(ConfigError::ProfileNotFound(name.clone()));
            }
        }

        Ok(())
    }

    /// The named profile, with the shared timeout applied when it has none.
    pub fn profile(&self, name: &str) -> Result<Profile> {
        let profile = self
            .profiles
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| ConfigError::ProfileNotFound(name.to_string()))?;

        let mut profile = profile.clone();
        profile.timeout_secs.get_or_insert(self.timeout_secs);
        Ok(profile)
    }

    /// The default profile, or the only profile when exactly one exists.
    pub fn default_profile(&self) -> Result<Profile> {
        match (&self.default_profile, self.profiles.as_slice()) {
            (Some(name), _) => self.profile(name),
            (None, [only]) => self.profile(&only.name),
            (None, _) => Err(ConfigError::ValidationError(
                "no default profile configured".to_string(),
            )),
        }
    }

    /// Add or replace a profile by name.
    pub fn upsert_profile(&mut self, profile: Profile) -> Result<()> {
        profile.validate()?;
        match self.profiles.iter_mut().find(|p| p.name == profile.name) {
            Some(existing) => *existing = profile,
            None => self.profiles.push(profile),
        }
        Ok(())
    }

    /// Remove a profile, clearing the default if it pointed at it.
    pub fn remove_profile(&mut self, name: &str) -> Result<Profile> {
        let index = self
            .profiles
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| ConfigError::ProfileNotFound(name.to_string()))?;
        if self.default_profile.as_deref() == Some(name) {
            self.default_profile = None;
        }
        Ok(self.profiles.remove(index))
    }
}
