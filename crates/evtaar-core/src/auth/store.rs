//! Key-value persistence behind the session.
//!
//! The session only ever needs three capabilities: read a key, write a
//! key and clear a key. Everything that persists state implements
//! [`KeyValueStore`] so the container can be driven by an in-memory double
//! in tests and by a file or the OS keychain in real use.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use tracing::warn;

/// Store file name in the cache directory
const STORE_FILE: &str = "session.json";

pub trait KeyValueStore: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&self, key: &str, value: &str) -> Result<()>;
    fn clear(&self, key: &str) -> Result<()>;
}

/// Process-local store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a credential already "persisted", as if a previous run
    /// had logged in.
    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        if let Ok(mut entries) = store.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().map_err(|_| anyhow!("memory store poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| anyhow!("memory store poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| anyhow!("memory store poisoned"))?;
        entries.remove(key);
        Ok(())
    }
}

/// JSON map persisted at `<cache_dir>/session.json`.
///
/// Every operation goes to disk so two processes sharing the directory see
/// each other's writes (last writer wins).
pub struct FileStore {
    cache_dir: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            lock: Mutex::new(()),
        }
    }

    fn store_path(&self) -> PathBuf {
        self.cache_dir.join(STORE_FILE)
    }

    /// Current entries, and whether the file on disk was unreadable. A
    /// damaged file counts as empty so the next write or clear replaces it.
    fn load(&self) -> Result<(HashMap<String, String>, bool)> {
        let path = self.store_path();
        if !path.exists() {
            return Ok((HashMap::new(), false));
        }
        let contents = std::fs::read_to_string(&path).context("Failed to read session file")?;
        if contents.trim().is_empty() {
            return Ok((HashMap::new(), false));
        }
        match serde_json::from_str(&contents) {
            Ok(entries) => Ok((entries, false)),
            Err(e) => {
                warn!(error = %e, path = %path.display(), "Session file is corrupt, treating as empty");
                Ok((HashMap::new(), true))
            }
        }
    }

    fn save(&self, entries: &HashMap<String, String>) -> Result<()> {
        let path = self.store_path();
        if entries.is_empty() {
            if path.exists() {
                std::fs::remove_file(&path).context("Failed to remove session file")?;
            }
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(entries)?;
        std::fs::write(&path, contents).context("Failed to write session file")?;
        restrict_permissions(&path)?;
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &std::path::Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .context("Failed to restrict session file permissions")
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &std::path::Path) -> Result<()> {
    Ok(())
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().map_err(|_| anyhow!("file store poisoned"))?;
        Ok(self.load()?.0.remove(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock().map_err(|_| anyhow!("file store poisoned"))?;
        let (mut entries, _) = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn clear(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock().map_err(|_| anyhow!("file store poisoned"))?;
        let (mut entries, damaged) = self.load()?;
        if entries.remove(key).is_some() || damaged {
            self.save(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_read_write_clear() {
        let store = MemoryStore::new();
        assert_eq!(store.read("k").unwrap(), None);
        store.write("k", "v1").unwrap();
        store.write("k", "v2").unwrap();
        assert_eq!(store.read("k").unwrap().as_deref(), Some("v2"));
        store.clear("k").unwrap();
        assert_eq!(store.read("k").unwrap(), None);
        // clearing a missing key is fine
        store.clear("k").unwrap();
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));
        store.write("access_token", "tok123").unwrap();
        store.write("user", "{}").unwrap();

        let reopened = FileStore::new(dir.path().join("nested"));
        assert_eq!(reopened.read("access_token").unwrap().as_deref(), Some("tok123"));

        reopened.clear("access_token").unwrap();
        assert_eq!(store.read("access_token").unwrap(), None);
        assert_eq!(store.read("user").unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn test_file_store_removes_file_when_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        store.write("access_token", "tok").unwrap();
        assert!(dir.path().join(STORE_FILE).exists());
        store.clear("access_token").unwrap();
        assert!(!dir.path().join(STORE_FILE).exists());
    }

    #[test]
    fn test_file_store_recovers_from_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_FILE);
        std::fs::write(&path, "{trunc").unwrap();
        let store = FileStore::new(dir.path().to_path_buf());

        assert_eq!(store.read("access_token").unwrap(), None);
        store.write("access_token", "tok123").unwrap();
        assert_eq!(store.read("access_token").unwrap().as_deref(), Some("tok123"));
    }

    #[test]
    fn test_file_store_clear_removes_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_FILE);
        std::fs::write(&path, "not json").unwrap();
        let store = FileStore::new(dir.path().to_path_buf());

        store.clear("access_token").unwrap();
        assert!(!path.exists());
    }
}
