use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError, SessionSignal};
use crate::models::{RegisterRequest, UpdateProfileRequest, User};

/// Buffered user notices per subscriber before the oldest are dropped
const NOTICE_CHANNEL_CAPACITY: usize = 32;

const EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Initializing,
    Unauthenticated,
    Authenticated,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Initializing => write!(f, "Initializing"),
            SessionStatus::Unauthenticated => write!(f, "Not logged in"),
            SessionStatus::Authenticated => write!(f, "Logged in"),
        }
    }
}

/// Snapshot of the session.
///
/// `current_user` is only ever set while `credential` is set. The reverse
/// does not hold: between persisting a credential and fetching the profile
/// there is a credential but no user.
#[derive(Clone, Default, PartialEq)]
pub struct Session {
    pub credential: Option<String>,
    pub current_user: Option<User>,
    pub is_loading: bool,
}

impl Session {
    fn initializing() -> Self {
        Self {
            is_loading: true,
            ..Default::default()
        }
    }

    fn unauthenticated() -> Self {
        Self::default()
    }

    pub fn status(&self) -> SessionStatus {
        if self.is_loading {
            SessionStatus::Initializing
        } else if self.current_user.is_some() {
            SessionStatus::Authenticated
        } else {
            SessionStatus::Unauthenticated
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.status() == SessionStatus::Authenticated
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("credential", &self.credential.as_ref().map(|_| "<redacted>"))
            .field("current_user", &self.current_user.as_ref().map(|u| &u.email))
            .field("is_loading", &self.is_loading)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A message for the user about the outcome of a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

struct Inner {
    api: ApiClient,
    state: watch::Sender<Session>,
    notices: broadcast::Sender<Notice>,
}

impl Inner {
    fn notify(&self, notice: Notice) {
        // Nobody listening is normal for headless callers
        let _ = self.notices.send(notice);
    }

    /// Forced transition after any request saw a 401. The request layer has
    /// already cleared the persisted credential.
    fn invalidate(&self) {
        let changed = self.state.send_if_modified(|session| {
            if session.credential.is_none() && session.current_user.is_none() {
                return false;
            }
            // published before watchers see the change, so anyone waiting
            // on the state already has the notice queued
            if session.current_user.is_some() {
                self.notify(Notice::error(EXPIRED_MESSAGE));
            }
            session.credential = None;
            session.current_user = None;
            true
        });
        if changed {
            info!("Session invalidated by authorization failure");
        }
    }
}

/// Holder of the current session.
///
/// Views get a clone of the container, read snapshots, subscribe to
/// changes and ask for transitions; they never mutate the session. Every
/// transition returns whether it succeeded and publishes a [`Notice`].
///
/// Must be created inside a Tokio runtime: a background task listens for
/// [`SessionSignal::Invalidated`] from the API client.
#[derive(Clone)]
pub struct SessionContainer {
    inner: Arc<Inner>,
}

impl SessionContainer {
    /// Create the container and restore any persisted session. Returns once
    /// the container has left `Initializing`.
    pub async fn start(api: ApiClient) -> Self {
        let container = Self::new(api);
        container.restore().await;
        container
    }

    /// Create the container in `Initializing` without restoring. Call
    /// [`restore`](Self::restore) to finish initialization.
    pub fn new(api: ApiClient) -> Self {
        let (state, _) = watch::channel(Session::initializing());
        let (notices, _) = broadcast::channel(NOTICE_CHANNEL_CAPACITY);
        let signals = api.subscribe();
        let inner = Arc::new(Inner {
            api,
            state,
            notices,
        });
        spawn_signal_listener(Arc::downgrade(&inner), signals);
        Self { inner }
    }

    // ===== Observation =====

    pub fn snapshot(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.inner.state.borrow().status()
    }

    pub fn current_user(&self) -> Option<User> {
        self.inner.state.borrow().current_user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.status() == SessionStatus::Authenticated
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().is_loading
    }

    /// Receiver that sees every state change
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    /// Receiver of success/failure notices raised by transitions
    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.inner.notices.subscribe()
    }

    /// Wait until a pending invalidation has been applied.
    ///
    /// The request layer clears storage synchronously, but the container
    /// follows on a background task. Returns false if the session still
    /// holds a credential the store no longer has after `timeout`.
    pub async fn settle(&self, timeout: Duration) -> bool {
        let mut rx = self.inner.state.subscribe();
        let credentials = self.inner.api.credentials().clone();
        let caught_up = rx.wait_for(|session| {
            session.credential.is_none() || credentials.has_credential()
        });
        tokio::time::timeout(timeout, caught_up)
            .await
            .is_ok_and(|changed| changed.is_ok())
    }

    /// The API client the container talks through; views use it for the
    /// resource areas.
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    // ===== Transitions =====

    /// Initializing → Authenticated or Unauthenticated.
    ///
    /// A persisted credential that the profile endpoint rejects (for any
    /// reason) is removed from storage.
    pub async fn restore(&self) {
        let credential = match self.inner.api.credentials().credential() {
            Ok(credential) => credential,
            Err(e) => {
                warn!(error = %e, "Failed to read persisted credential");
                None
            }
        };

        let Some(credential) = credential else {
            debug!("No persisted credential");
            self.inner.state.send_replace(Session::unauthenticated());
            return;
        };

        self.inner.state.send_modify(|session| {
            session.credential = Some(credential.clone());
        });

        match self.inner.api.users().me().await {
            Ok(user) => {
                if self.apply_profile(&credential, user) {
                    info!("Session restored");
                } else {
                    // invalidated while the fetch was in flight
                    self.finish_unauthenticated();
                }
            }
            Err(e) => {
                warn!(error = %e, "Persisted credential rejected, discarding");
                self.discard_credential();
                self.finish_unauthenticated();
            }
        }
    }

    /// Unauthenticated → Authenticated.
    pub async fn login(&self, email: &str, password: &str) -> bool {
        match self.status() {
            SessionStatus::Unauthenticated => {}
            SessionStatus::Authenticated => {
                self.inner.notify(Notice::error("Already logged in. Log out first."));
                return false;
            }
            SessionStatus::Initializing => {
                self.inner.notify(Notice::error("Session is still loading. Try again."));
                return false;
            }
        }

        let tokens = match self.inner.api.auth().login(email, password).await {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!(error = %e, "Login failed");
                self.fail(&e, "Login failed");
                return false;
            }
        };

        let credential = tokens.access_token;
        if let Err(e) = self.inner.api.credentials().set_credential(&credential) {
            warn!(error = %e, "Failed to persist credential");
            self.inner.notify(Notice::error("Login failed"));
            return false;
        }
        self.inner.state.send_modify(|session| {
            session.credential = Some(credential.clone());
            session.current_user = None;
        });

        match self.inner.api.users().me().await {
            Ok(user) => {
                if self.apply_profile(&credential, user) {
                    info!(user_id = %tokens.user_id, "Login successful");
                    self.inner.notify(Notice::success("Welcome back!"));
                    true
                } else {
                    warn!("Session invalidated during login");
                    self.finish_unauthenticated();
                    self.inner.notify(Notice::error("Login failed"));
                    false
                }
            }
            Err(e) => {
                warn!(error = %e, "Profile fetch after login failed");
                self.discard_credential();
                self.finish_unauthenticated();
                self.fail(&e, "Login failed");
                false
            }
        }
    }

    /// Registration never changes the session; the user logs in afterwards.
    pub async fn register(&self, request: &RegisterRequest) -> bool {
        match self.inner.api.auth().register(request).await {
            Ok(registered) => {
                info!(user_id = %registered.user_id, "Registration successful");
                self.inner
                    .notify(Notice::success("Registration successful! Please login."));
                true
            }
            Err(e) => {
                warn!(error = %e, "Registration failed");
                self.fail(&e, "Registration failed");
                false
            }
        }
    }

    /// Any state → Unauthenticated. The server-side logout is best effort;
    /// local state is cleared regardless.
    pub async fn logout(&self) -> bool {
        if self.inner.api.credentials().has_credential() {
            if let Err(e) = self.inner.api.auth().logout().await {
                debug!(error = %e, "Server-side logout failed, ignoring");
            }
        }

        let cleared = self.inner.api.credentials().clear();
        self.inner.state.send_replace(Session::unauthenticated());

        match cleared {
            Ok(()) => {
                info!("Logged out");
                self.inner.notify(Notice::success("Logged out successfully"));
                true
            }
            Err(e) => {
                warn!(error = %e, "Failed to clear persisted credential");
                self.inner
                    .notify(Notice::error("Logged out, but the saved login could not be removed"));
                false
            }
        }
    }

    /// Authenticated → Authenticated with the profile the server returns.
    ///
    /// If the session ends while the request is in flight the response is
    /// dropped instead of resurrecting the session.
    pub async fn update_profile(&self, request: &UpdateProfileRequest) -> bool {
        let credential = {
            let session = self.inner.state.borrow();
            if session.is_authenticated() {
                session.credential.clone()
            } else {
                None
            }
        };
        let Some(credential) = credential else {
            self.inner.notify(Notice::error("You are not logged in"));
            return false;
        };

        match self.inner.api.users().update_me(request).await {
            Ok(user) => {
                if self.apply_profile(&credential, user) {
                    info!("Profile updated");
                    self.inner.notify(Notice::success("Profile updated successfully"));
                    true
                } else {
                    warn!("Profile update completed after the session ended, discarding");
                    false
                }
            }
            Err(e) => {
                warn!(error = %e, "Profile update failed");
                self.fail(&e, "Update failed");
                false
            }
        }
    }

    // ===== Helpers =====

    /// Store `user` as the current profile, but only if `credential` is still
    /// both the persisted credential and the one the session holds.
    fn apply_profile(&self, credential: &str, user: User) -> bool {
        let persisted = match self.inner.api.credentials().credential() {
            Ok(persisted) => persisted,
            Err(e) => {
                warn!(error = %e, "Failed to read persisted credential");
                None
            }
        };
        if persisted.as_deref() != Some(credential) {
            return false;
        }

        let cached = user.clone();
        let applied = self.inner.state.send_if_modified(|session| {
            if session.credential.as_deref() != Some(credential) {
                return false;
            }
            session.current_user = Some(user);
            session.is_loading = false;
            true
        });

        if applied {
            if let Err(e) = self.inner.api.credentials().set_cached_user(&cached) {
                warn!(error = %e, "Failed to cache profile");
            }
        }
        applied
    }

    fn discard_credential(&self) {
        if let Err(e) = self.inner.api.credentials().clear() {
            warn!(error = %e, "Failed to clear persisted credential");
        }
    }

    fn finish_unauthenticated(&self) {
        self.inner.state.send_replace(Session::unauthenticated());
    }

    fn fail(&self, error: &ApiError, fallback: &str) {
        let message = error.backend_message().unwrap_or(fallback);
        self.inner.notify(Notice::error(message));
    }
}

impl std::fmt::Debug for SessionContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContainer")
            .field("session", &*self.inner.state.borrow())
            .finish()
    }
}

/// Translate request-layer signals into container transitions. Holds only a
/// weak reference so the task ends once the container is gone.
fn spawn_signal_listener(inner: Weak<Inner>, mut signals: broadcast::Receiver<SessionSignal>) {
    tokio::spawn(async move {
        loop {
            match signals.recv().await {
                // every signal is an invalidation, so a lag is one too
                Ok(SessionSignal::Invalidated) | Err(RecvError::Lagged(_)) => {
                    let Some(inner) = inner.upgrade() else {
                        break;
                    };
                    inner.invalidate();
                }
                Err(RecvError::Closed) => break,
            }
        }
        debug!("Session signal listener stopped");
    });
}
