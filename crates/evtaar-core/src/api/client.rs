//! API client for communicating with the EvtaarPro REST API.
//!
//! Every request goes through [`ApiClient::execute`], which applies the two
//! cross-cutting policies: the persisted bearer credential is attached on the
//! way out, and a 401 on the way back clears the persisted credential and
//! publishes [`SessionSignal::Invalidated`].

use std::time::Duration;

use reqwest::{header, Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::auth::CredentialStore;
use crate::config::Config;
use crate::models::{Envelope, Page};

use super::error::{ApiError, Result};
use super::{AuthApi, CrmApi, MeetingsApi, NotificationsApi, PayrollApi, UsersApi};

// ============================================================================
// Constants
// ============================================================================

/// Base URL used when nothing is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/v1";

/// HTTP request timeout in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Capacity of the session signal channel. Signals are idempotent, so a
/// lagging subscriber loses nothing it needs.
const SIGNAL_CHANNEL_CAPACITY: usize = 16;

/// Longest id accepted as a path segment
const MAX_ID_LENGTH: usize = 128;

/// Validate a resource id before it is placed in a URL path. Backend ids are
/// UUIDs or short codes, so anything beyond ASCII letters, digits, `-` and
/// `_` is refused rather than encoded.
pub(crate) fn path_id(id: &str) -> Result<&str> {
    let valid = !id.is_empty()
        && id.len() <= MAX_ID_LENGTH
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(id)
    } else {
        warn!(id = %id.escape_debug(), "Refusing malformed resource id");
        Err(ApiError::InvalidId(id.to_string()))
    }
}

/// Emitted by the request layer; the session container turns it into a
/// state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionSignal {
    /// A response came back 401. The persisted credential and cached
    /// profile have already been cleared.
    Invalidated,
}

/// API client for EvtaarPro.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling,
/// and all clones share the credential store and signal channel.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    credentials: CredentialStore,
    signals: broadcast::Sender<SessionSignal>,
}

impl ApiClient {
    /// Create a new API client with the default timeout
    pub fn new(base_url: &str, credentials: CredentialStore) -> Result<Self> {
        Self::with_timeout(base_url, credentials, Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    pub fn with_timeout(
        base_url: &str,
        credentials: CredentialStore,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .default_headers(Self::default_headers())
            .build()?;
        let (signals, _) = broadcast::channel(SIGNAL_CHANNEL_CAPACITY);

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            signals,
        })
    }

    pub fn from_config(config: &Config, credentials: CredentialStore) -> Result<Self> {
        Self::with_timeout(
            config.base_url(),
            credentials,
            Duration::from_secs(config.request_timeout_secs()),
        )
    }

    fn default_headers() -> header::HeaderMap {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        headers
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Subscribe to session signals raised by any clone of this client
    pub fn subscribe(&self) -> broadcast::Receiver<SessionSignal> {
        self.signals.subscribe()
    }

    // ===== Resource areas =====

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    pub fn users(&self) -> UsersApi<'_> {
        UsersApi::new(self)
    }

    pub fn meetings(&self) -> MeetingsApi<'_> {
        MeetingsApi::new(self)
    }

    pub fn payroll(&self) -> PayrollApi<'_> {
        PayrollApi::new(self)
    }

    pub fn crm(&self) -> CrmApi<'_> {
        CrmApi::new(self)
    }

    pub fn notifications(&self) -> NotificationsApi<'_> {
        NotificationsApi::new(self)
    }

    // ===== Policies =====

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        if let Some(token) = self.credentials.credential()? {
            let mut value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ApiError::Storage("stored credential is not a valid header value".to_string()))?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    fn invalidate_session(&self) {
        info!("Authorization failure, clearing persisted credential");
        if let Err(e) = self.credentials.clear() {
            warn!(error = %e, "Failed to clear persisted credential");
        }
        // No subscribers is fine: nothing is holding session state yet
        if self.signals.send(SessionSignal::Invalidated).is_err() {
            debug!("No session subscribers for invalidation signal");
        }
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(&self, response: Response, path: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == reqwest::StatusCode::UNAUTHORIZED {
            self.invalidate_session();
        }
        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), path = path, "API request failed");
        Err(ApiError::from_status(status, &body))
    }

    async fn execute(&self, method: Method, path: &str, request: RequestBuilder) -> Result<Response> {
        debug!(method = %method, path = path, "API request");
        let response = request
            .headers(self.auth_headers()?)
            .send()
            .await
            .inspect_err(|e| warn!(error = %e, path = path, "API request could not be sent"))?;
        self.check_response(response, path).await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.url(path))
    }

    // ===== Decoding =====

    /// Decode the `data` of an envelope. Some endpoints answer with a bare
    /// object instead of an envelope; those are accepted too.
    async fn decode<T: DeserializeOwned>(response: Response, path: &str) -> Result<T> {
        let body = response.text().await?;
        match serde_json::from_str::<Envelope<T>>(&body) {
            Ok(Envelope { data: Some(data), .. }) => Ok(data),
            enveloped => serde_json::from_str::<T>(&body).map_err(|e| {
                let reason = match enveloped {
                    Ok(_) => "missing data".to_string(),
                    Err(_) => e.to_string(),
                };
                ApiError::InvalidResponse(format!("{} ({})", path, reason))
            }),
        }
    }

    async fn decode_page<T: DeserializeOwned>(response: Response, path: &str) -> Result<Page<T>> {
        let body = response.text().await?;
        let envelope: Envelope<Vec<T>> = serde_json::from_str(&body)
            .map_err(|e| ApiError::InvalidResponse(format!("{} ({})", path, e)))?;
        Ok(Page::from(envelope))
    }

    // ===== Verbs =====

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .execute(Method::GET, path, self.request(Method::GET, path))
            .await?;
        Self::decode(response, path).await
    }

    pub(crate) async fn get_page<T, Q>(&self, path: &str, query: &Q) -> Result<Page<T>>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let request = self.request(Method::GET, path).query(query);
        let response = self.execute(Method::GET, path, request).await?;
        Self::decode_page(response, path).await
    }

    /// GET a list endpoint that takes no query and returns no pagination
    pub(crate) async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let response = self
            .execute(Method::GET, path, self.request(Method::GET, path))
            .await?;
        Ok(Self::decode_page(response, path).await?.items)
    }

    pub(crate) async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.request(Method::POST, path).json(body);
        let response = self.execute(Method::POST, path, request).await?;
        Self::decode(response, path).await
    }

    /// POST with no body, decoding the response data
    pub(crate) async fn post_action<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .execute(Method::POST, path, self.request(Method::POST, path))
            .await?;
        Self::decode(response, path).await
    }

    /// POST with no body where only the status matters
    pub(crate) async fn post_empty(&self, path: &str) -> Result<()> {
        self.execute(Method::POST, path, self.request(Method::POST, path))
            .await?;
        Ok(())
    }

    pub(crate) async fn put<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.request(Method::PUT, path).json(body);
        let response = self.execute(Method::PUT, path, request).await?;
        Self::decode(response, path).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<()> {
        self.execute(Method::DELETE, path, self.request(Method::DELETE, path))
            .await?;
        Ok(())
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials)
            .finish()
    }
}
