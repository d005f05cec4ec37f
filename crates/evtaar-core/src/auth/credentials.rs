use std::sync::Arc;

use anyhow::{Context, Result};
use keyring::Entry;
use tracing::warn;

use super::store::KeyValueStore;
use crate::models::User;

const SERVICE_NAME: &str = "evtaar";

/// Key holding the bearer credential
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Key holding a JSON copy of the last fetched profile
pub const CACHED_USER_KEY: &str = "user";

/// OS keychain backend. Each key is stored as its own keychain entry under
/// the `evtaar` service.
#[derive(Debug, Clone)]
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    pub fn with_service(service: &str) -> Self {
        Self {
            service: service.to_string(),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry> {
        Entry::new(&self.service, key).context("Failed to create keyring entry")
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for KeyringStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to retrieve secret from keychain"),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.entry(key)?
            .set_password(value)
            .context("Failed to store secret in keychain")
    }

    fn clear(&self, key: &str) -> Result<()> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete secret from keychain"),
        }
    }
}

/// Typed view over a [`KeyValueStore`] for the two keys the session uses.
/// Clone is cheap; all clones share the same backend.
#[derive(Clone)]
pub struct CredentialStore {
    backend: Arc<dyn KeyValueStore>,
}

impl CredentialStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// The persisted bearer credential, if any. Empty strings count as absent.
    pub fn credential(&self) -> Result<Option<String>> {
        Ok(self
            .backend
            .read(ACCESS_TOKEN_KEY)?
            .filter(|token| !token.trim().is_empty()))
    }

    pub fn set_credential(&self, credential: &str) -> Result<()> {
        self.backend.write(ACCESS_TOKEN_KEY, credential)
    }

    pub fn has_credential(&self) -> bool {
        matches!(self.credential(), Ok(Some(_)))
    }

    /// Last profile written by a successful profile fetch. A blob that no
    /// longer parses is treated as absent.
    pub fn cached_user(&self) -> Result<Option<User>> {
        let Some(raw) = self.backend.read(CACHED_USER_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable cached profile");
                Ok(None)
            }
        }
    }

    pub fn set_cached_user(&self, user: &User) -> Result<()> {
        let raw = serde_json::to_string(user).context("Failed to serialize profile")?;
        self.backend.write(CACHED_USER_KEY, &raw)
    }

    /// Remove both the credential and the cached profile. Both removals are
    /// attempted even if the first fails.
    pub fn clear(&self) -> Result<()> {
        let token = self.backend.clear(ACCESS_TOKEN_KEY);
        let user = self.backend.clear(CACHED_USER_KEY);
        token.and(user)
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("has_credential", &self.has_credential())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryStore;

    fn store() -> (Arc<MemoryStore>, CredentialStore) {
        let backend = Arc::new(MemoryStore::new());
        (backend.clone(), CredentialStore::new(backend))
    }

    #[test]
    fn test_credential_round_trip_and_clear() {
        let (backend, creds) = store();
        assert!(!creds.has_credential());

        creds.set_credential("tok123").unwrap();
        assert_eq!(creds.credential().unwrap().as_deref(), Some("tok123"));
        assert_eq!(backend.read(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("tok123"));

        let user: User = serde_json::from_str(r#"{"id":"u1","email":"a@b.com"}"#).unwrap();
        creds.set_cached_user(&user).unwrap();
        assert_eq!(creds.cached_user().unwrap(), Some(user));

        creds.clear().unwrap();
        assert_eq!(creds.credential().unwrap(), None);
        assert_eq!(backend.read(CACHED_USER_KEY).unwrap(), None);
    }

    #[test]
    fn test_blank_credential_is_absent() {
        let (backend, creds) = store();
        backend.write(ACCESS_TOKEN_KEY, "   ").unwrap();
        assert_eq!(creds.credential().unwrap(), None);
    }

    #[test]
    fn test_corrupt_cached_user_is_ignored() {
        let (backend, creds) = store();
        backend.write(CACHED_USER_KEY, "{not json").unwrap();
        assert_eq!(creds.cached_user().unwrap(), None);
    }

    #[test]
    fn test_debug_never_prints_credential() {
        let (_backend, creds) = store();
        creds.set_credential("secret-token").unwrap();
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("has_credential: true"));
    }
}
