//! Configuration for the VoxMate client.
//!
//! Stored as JSON under the VoxMate home directory (`~/.voxmate` by
//! default). All fields have defaults so a missing or partial config file
//! still loads.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory name for client state under the home directory.
const VOXMATE_DIR: &str = ".voxmate";

/// Client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// User id sent in backend payloads.
    #[serde(default = "default_user_id")]
    pub user_id: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Command used to play audio URLs; the URL is appended as the last
    /// argument.
    #[serde(default = "default_player_argv")]
    pub player_argv: Vec<String>,

    /// Default target language for the speak screen.
    #[serde(default = "default_language")]
    pub default_language: String,

    /// Override for the storage directory.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".into()
}

fn default_user_id() -> String {
    crate::auth::DEFAULT_USER_ID.into()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_player_argv() -> Vec<String> {
    vec![
        "mpv".into(),
        "--no-video".into(),
        "--really-quiet".into(),
    ]
}

fn default_language() -> String {
    "en".into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_id: default_user_id(),
            timeout_seconds: default_timeout_seconds(),
            player_argv: default_player_argv(),
            default_language: default_language(),
            data_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Parse)
    }

    /// Load the configuration at the default path, falling back to
    /// defaults when the file does not exist.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        std::fs::write(path, content).map_err(ConfigError::Io)
    }

    /// Default config file location (`~/.voxmate/config.json`).
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.json")
    }

    /// Directory the key-value store lives in.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| Self::home_dir().join("state"))
    }

    fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(VOXMATE_DIR)
    }
}

/// Errors that can occur when working with configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading or writing config.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing config JSON.
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    /// Error serializing config to JSON.
    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.user_id, "user_123");
        assert_eq!(config.timeout_seconds, 30);
        assert_eq!(config.default_language, "en");
        assert!(!config.player_argv.is_empty());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = Config {
            base_url: "http://backend.local:9000".into(),
            default_language: "fr".into(),
            ..Config::default()
        };
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.base_url, "http://backend.local:9000");
        assert_eq!(loaded.default_language, "fr");
        assert_eq!(loaded.user_id, "user_123");
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"base_url": "http://other:8000"}"#).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.base_url, "http://other:8000");
        assert_eq!(loaded.timeout_seconds, 30);
        assert_eq!(loaded.user_id, "user_123");
    }

    #[test]
    fn test_data_dir_override() {
        let config = Config {
            data_dir: Some(PathBuf::from("/tmp/voxmate-test")),
            ..Config::default()
        };
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/voxmate-test"));
    }
}
