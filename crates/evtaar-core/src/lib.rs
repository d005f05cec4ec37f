//! Client core for the EvtaarPro admin platform.
//!
//! Two components make up the crate:
//!
//! - [`api::ApiClient`]: the single point of outbound HTTP. It attaches the
//!   persisted bearer credential to every request and, when a response comes
//!   back 401, clears the credential and emits
//!   [`api::SessionSignal::Invalidated`].
//! - [`auth::SessionContainer`]: holds the current session, exposes login,
//!   logout, registration and profile updates as state transitions, and
//!   follows invalidation signals from the API client.
//!
//! ```no_run
//! use std::sync::Arc;
//! use evtaar_core::{ApiClient, CredentialStore, MemoryStore, SessionContainer};
//!
//! # async fn run() -> evtaar_core::api::Result<()> {
//! let store = CredentialStore::new(Arc::new(MemoryStore::new()));
//! let api = ApiClient::new("http://localhost:8080/api/v1", store)?;
//! let session = SessionContainer::start(api).await;
//! if session.login("a@b.com", "secret").await {
//!     let meetings = session.api().meetings().list(&Default::default()).await?;
//!     println!("{} meetings", meetings.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError, SessionSignal};
pub use auth::{
    CredentialStore, FileStore, KeyValueStore, KeyringStore, MemoryStore, Notice, NoticeLevel,
    Session, SessionContainer, SessionStatus,
};
pub use config::{Config, StorageBackend};
