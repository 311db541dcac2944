//! Application configuration.
//!
//! Settings load from `~/.pomosync/config.toml`. A missing file means
//! defaults; a present file only needs the fields it wants to override,
//! everything else falls back per-field.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Defaults
// ============================================================================

fn default_container() -> String {
    "pomosync".to_string()
}

fn default_record_id() -> String {
    "session".to_string()
}

fn default_poll_seconds() -> u64 {
    5
}

fn default_tick_seconds() -> u64 {
    1
}

/// Application data directory (`~/.pomosync`).
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(".pomosync"))
        .ok_or(ConfigError::NoHomeDirectory)
}

/// Default configuration file path.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    Ok(data_dir()?.join("config.toml"))
}

// ============================================================================
// ConfigError
// ============================================================================

/// Errors loading or validating the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The home directory could not be determined.
    #[error("Could not determine the home directory")]
    NoHomeDirectory,

    /// The config file exists but could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Read {
        /// Config file path
        path: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The config file is not valid TOML.
    #[error("Failed to parse config file: {0}")]
    Parse(String),

    /// A setting failed validation.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

// ============================================================================
// Sections
// ============================================================================

/// Remote record store settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Whether cloud sync is enabled.
    #[serde(default)]
    pub enabled: bool,

    /// Base URL of the record store.
    #[serde(default)]
    pub base_url: String,

    /// Per-account container identifier.
    #[serde(default = "default_container")]
    pub container: String,

    /// Fixed identifier of the single session record.
    #[serde(default = "default_record_id")]
    pub record_id: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: String::new(),
            container: default_container(),
            record_id: default_record_id(),
        }
    }
}

/// Local mirror settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MirrorConfig {
    /// Group directory shared with the widget process.
    /// Defaults to `~/.pomosync/mirror` when unset.
    #[serde(default)]
    pub group_dir: Option<PathBuf>,
}

impl MirrorConfig {
    /// Resolves the group directory, applying the default.
    pub fn resolved_group_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.group_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(data_dir()?.join("mirror")),
        }
    }
}

/// Companion channel settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CompanionConfig {
    /// Whether the companion channel is enabled.
    #[serde(default)]
    pub enabled: bool,

    /// Socket the companion listens on.
    /// Defaults to `~/.pomosync/companion.sock` when unset.
    #[serde(default)]
    pub socket_path: Option<PathBuf>,

    /// Context slot file. Defaults to `~/.pomosync/context.json` when unset.
    #[serde(default)]
    pub context_path: Option<PathBuf>,
}

impl CompanionConfig {
    /// Resolves the socket path, applying the default.
    pub fn resolved_socket_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.socket_path {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join("companion.sock")),
        }
    }

    /// Resolves the context slot path, applying the default.
    pub fn resolved_context_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.context_path {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join("context.json")),
        }
    }
}

/// Sync loop timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Remote poll interval in seconds.
    #[serde(default = "default_poll_seconds")]
    pub poll_seconds: u64,

    /// Countdown display tick in seconds.
    #[serde(default = "default_tick_seconds")]
    pub tick_seconds: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_seconds: default_poll_seconds(),
            tick_seconds: default_tick_seconds(),
        }
    }
}

// ============================================================================
// AppConfig
// ============================================================================

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Remote record store section.
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Local mirror section.
    #[serde(default)]
    pub mirror: MirrorConfig,

    /// Companion channel section.
    #[serde(default)]
    pub companion: CompanionConfig,

    /// Sync loop timing section.
    #[serde(default)]
    pub sync: SyncConfig,
}

impl AppConfig {
    /// Loads the configuration from the default path, falling back to
    /// defaults when the file does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_path()?)
    }

    /// Loads the configuration from an explicit path.
    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.display().to_string(),
                    source,
                });
            }
        };

        let config: Self = toml::from_str(&raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.remote.enabled && self.remote.base_url.is_empty() {
            return Err(ConfigError::Invalid(
                "remote.base_url is required when remote sync is enabled".to_string(),
            ));
        }
        if self.sync.poll_seconds == 0 {
            return Err(ConfigError::Invalid(
                "sync.poll_seconds must be at least 1".to_string(),
            ));
        }
        if self.sync.tick_seconds == 0 {
            return Err(ConfigError::Invalid(
                "sync.tick_seconds must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
