//! REST API client module for the EvtaarPro backend.
//!
//! This module provides the `ApiClient` plus one borrowed sub-client per
//! resource area (`auth`, `users`, `meetings`, `payroll`, `crm`,
//! `notifications`). Each sub-client method maps one UI action to one
//! verb + path; there is no retry, caching or request de-duplication.
//!
//! The API uses bearer token authentication. The token is read from the
//! injected credential store on every request.

pub mod auth;
pub mod client;
pub mod crm;
pub mod error;
pub mod meetings;
pub mod notifications;
pub mod payroll;
pub mod users;

pub use auth::AuthApi;
pub use client::{ApiClient, SessionSignal, DEFAULT_BASE_URL, REQUEST_TIMEOUT_SECS};
pub use crm::CrmApi;
pub use error::{ApiError, Result};
pub use meetings::MeetingsApi;
pub use notifications::NotificationsApi;
pub use payroll::PayrollApi;
pub use users::UsersApi;
