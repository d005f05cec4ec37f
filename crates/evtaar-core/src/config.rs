//! Application configuration management.
//!
//! This module handles loading and saving the client configuration: the
//! backend base URL, the request timeout, where the session is persisted,
//! and the last email used to log in.
//!
//! Configuration is stored at `~/.config/evtaar/config.json`.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::api::{DEFAULT_BASE_URL, REQUEST_TIMEOUT_SECS};
use crate::auth::{FileStore, KeyValueStore, KeyringStore, MemoryStore};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "evtaar";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Where the credential and cached profile are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// OS keychain
    Keyring,
    /// `session.json` in the cache directory
    #[default]
    File,
    /// Nothing persisted across restarts
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keyring" | "keychain" => Ok(StorageBackend::Keyring),
            "file" => Ok(StorageBackend::File),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(anyhow!("Unknown storage backend: {}", other)),
        }
    }
}

impl StorageBackend {
    pub fn open(&self, cache_dir: PathBuf) -> Arc<dyn KeyValueStore> {
        match self {
            StorageBackend::Keyring => Arc::new(KeyringStore::new()),
            StorageBackend::File => Arc::new(FileStore::new(cache_dir)),
            StorageBackend::Memory => Arc::new(MemoryStore::new()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub storage: StorageBackend,
    pub last_email: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .unwrap_or(REQUEST_TIMEOUT_SECS)
    }

    /// Open the configured persistence backend
    pub fn open_store(&self) -> Result<Arc<dyn KeyValueStore>> {
        Ok(self.storage.open(self.cache_dir()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.request_timeout_secs(), REQUEST_TIMEOUT_SECS);
        assert_eq!(config.storage, StorageBackend::File);
    }

    #[test]
    fn test_partial_config_file() {
        let config: Config = serde_json::from_str(
            r#"{"base_url":"https://hr.example.com/api/v1","storage":"keyring","request_timeout_secs":0}"#,
        )
        .expect("Failed to parse config");
        assert_eq!(config.base_url(), "https://hr.example.com/api/v1");
        assert_eq!(config.storage, StorageBackend::Keyring);
        // zero falls back to the default rather than disabling the timeout
        assert_eq!(config.request_timeout_secs(), REQUEST_TIMEOUT_SECS);
        assert!(config.last_email.is_none());
    }

    #[test]
    fn test_blank_base_url_uses_default() {
        let config = Config {
            base_url: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_storage_backend_from_str() {
        assert_eq!("Keychain".parse::<StorageBackend>().unwrap(), StorageBackend::Keyring);
        assert_eq!("memory".parse::<StorageBackend>().unwrap(), StorageBackend::Memory);
        assert!("redis".parse::<StorageBackend>().is_err());
    }
}
