//! Authentication module for managing the user session and its persistence.
//!
//! This module provides:
//! - `SessionContainer`: the Initializing / Unauthenticated / Authenticated
//!   state machine that views observe
//! - `KeyValueStore`: the {read, write, clear} persistence interface, with
//!   file, OS keychain and in-memory backends
//! - `CredentialStore`: typed access to the persisted bearer credential and
//!   cached profile

pub mod credentials;
pub mod session;
pub mod store;

pub use credentials::{CredentialStore, KeyringStore, ACCESS_TOKEN_KEY, CACHED_USER_KEY};
pub use session::{Notice, NoticeLevel, Session, SessionContainer, SessionStatus};
pub use store::{FileStore, KeyValueStore, MemoryStore};
