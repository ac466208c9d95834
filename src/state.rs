//! Application state
//!
//! Holds all shared components and state

use crate::alert_hub::AlertHub;
use crate::api_client::ApiClient;
use crate::camera_catalog::{CameraCatalog, MonitoringSession};
use crate::config::ClientConfig;
use crate::session::SessionStore;
use crate::video_catalog::VideoCatalog;
use std::sync::Arc;

/// Application state shared across tasks
#[derive(Clone)]
pub struct AppState {
    /// Client config (endpoint map)
    pub config: Arc<ClientConfig>,
    /// Backend HTTP client
    pub api: Arc<ApiClient>,
    /// Authenticated user session
    pub session: Arc<SessionStore>,
    /// Video catalog cache
    pub videos: Arc<VideoCatalog>,
    /// Camera command layer
    pub cameras: Arc<CameraCatalog>,
    /// Monitoring start/stop state
    pub monitoring: Arc<MonitoringSession>,
    /// Alert channel owner
    pub alerts: Arc<AlertHub>,
}

impl AppState {
    /// Wire up all services for the given configuration
    pub fn new(config: ClientConfig) -> Self {
        let config = Arc::new(config);
        let api = Arc::new(ApiClient::new(config.clone()));
        let session = Arc::new(SessionStore::new());
        let videos = Arc::new(VideoCatalog::new(api.clone()));
        let cameras = Arc::new(CameraCatalog::new(api.clone()));
        let monitoring = Arc::new(MonitoringSession::new(api.clone()));
        let alerts = Arc::new(AlertHub::new(config.clone(), videos.clone()));

        Self {
            config,
            api,
            session,
            videos,
            cameras,
            monitoring,
            alerts,
        }
    }

    /// Install a session and bring the per-user resources up: initial video
    /// catalog fetch and the alert channel.
    pub async fn attach_user(&self, session: crate::models::UserSession) {
        let user_id = session.user_id.clone();
        self.session.set(session).await;
        self.videos.refresh(&user_id).await;
        self.alerts.open(&user_id).await;
    }

    /// Tear down the per-user resources (logout). The backend has no
    /// session-teardown call; this is local state only.
    pub async fn detach_user(&self) {
        self.alerts.close().await;
        self.videos.clear().await;
        self.session.clear().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserSession;

    #[tokio::test]
    async fn test_attach_user_opens_alert_channel_for_user() {
        let state = AppState::new(ClientConfig::new("http://127.0.0.1:1"));
        state
            .attach_user(UserSession {
                user_id: "u-123".to_string(),
                username: "alice".to_string(),
                email: "alice@x.com".to_string(),
            })
            .await;

        assert_eq!(state.session.user_id().await.as_deref(), Some("u-123"));
        assert_eq!(state.alerts.current_user().await.as_deref(), Some("u-123"));
        assert_eq!(
            state.config.alert_ws_url("u-123"),
            "ws://127.0.0.1:1/ws/alert/u-123"
        );
    }

    #[tokio::test]
    async fn test_detach_user_clears_everything() {
        let state = AppState::new(ClientConfig::new("http://127.0.0.1:1"));
        state
            .attach_user(UserSession {
                user_id: "u-123".to_string(),
                username: "alice".to_string(),
                email: String::new(),
            })
            .await;
        state.detach_user().await;

        assert!(state.session.user_id().await.is_none());
        assert!(state.alerts.current_user().await.is_none());
        assert!(state.videos.is_empty().await);
    }
}
