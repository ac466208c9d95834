//! Session store
//!
//! Process-wide holder for the authenticated user. Set once on login/signup,
//! cleared on logout; no server-side teardown call exists. A missing session
//! is the "logged out" state every channel-opening and catalog-refreshing
//! component treats as disabled.

use crate::models::UserSession;
use tokio::sync::RwLock;

/// Process-wide session holder
pub struct SessionStore {
    inner: RwLock<Option<UserSession>>,
}

impl SessionStore {
    /// Create an empty (logged out) store
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(None),
        }
    }

    /// Install a session, replacing any previous one
    pub async fn set(&self, session: UserSession) {
        tracing::info!(user_id = %session.user_id, username = %session.username, "Session established");
        let mut guard = self.inner.write().await;
        *guard = Some(session);
    }

    /// Drop the session (logout)
    pub async fn clear(&self) {
        let mut guard = self.inner.write().await;
        if let Some(prev) = guard.take() {
            tracing::info!(user_id = %prev.user_id, "Session cleared");
        }
    }

    /// Current session, if logged in
    pub async fn current(&self) -> Option<UserSession> {
        self.inner.read().await.clone()
    }

    /// Current user id, if logged in
    pub async fn user_id(&self) -> Option<String> {
        self.inner.read().await.as_ref().map(|s| s.user_id.clone())
    }

    pub async fn is_logged_in(&self) -> bool {
        self.inner.read().await.is_some()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
