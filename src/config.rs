//! Client configuration and backend endpoint map
//!
//! Every URL the client ever talks to is written down here, one builder per
//! backend route. The base URL is a deployment-time value (env var), not
//! something modules compose themselves.

use std::time::Duration;

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL, no trailing slash (e.g. `http://192.168.1.20:8000`)
    pub base_url: String,
    /// TCP connect timeout for HTTP calls
    pub connect_timeout: Duration,
    /// Overall per-request timeout for HTTP calls
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Build a config for an explicit base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let base_url = std::env::var("FALLWATCH_BASE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8000".to_string());
        Self::new(base_url)
    }

    // ========================================
    // Auth & account
    // ========================================

    pub fn login_url(&self) -> String {
        format!("{}/login", self.base_url)
    }

    pub fn register_url(&self) -> String {
        format!("{}/register", self.base_url)
    }

    pub fn change_name_url(&self) -> String {
        format!("{}/change-name", self.base_url)
    }

    pub fn change_password_url(&self) -> String {
        format!("{}/change-password", self.base_url)
    }

    // ========================================
    // System / videos
    // ========================================

    pub fn status_url(&self) -> String {
        format!("{}/status", self.base_url)
    }

    pub fn videos_url(&self, user_id: &str) -> String {
        format!("{}/videos/{}", self.base_url, user_id)
    }

    pub fn accident_videos_url(&self, user_id: &str) -> String {
        format!("{}/accident-videos/{}", self.base_url, user_id)
    }

    // ========================================
    // Camera catalog
    // ========================================

    pub fn cameras_url(&self, user_id: &str) -> String {
        format!("{}/cctv/cameras/{}", self.base_url, user_id)
    }

    pub fn add_camera_url(&self) -> String {
        format!("{}/cctv/add-camera", self.base_url)
    }

    pub fn edit_camera_url(&self) -> String {
        format!("{}/cctv/edit-camera", self.base_url)
    }

    /// Remove uses query parameters, not a JSON body
    pub fn remove_camera_url(&self, user_id: &str, camera_index: usize) -> String {
        format!(
            "{}/cctv/remove-camera?user_id={}&camera_index={}",
            self.base_url, user_id, camera_index
        )
    }

    // ========================================
    // Monitoring & alert channel
    // ========================================

    pub fn start_monitoring_url(&self, user_id: &str) -> String {
        format!("{}/start-monitoring/{}", self.base_url, user_id)
    }

    pub fn stop_monitoring_url(&self, user_id: &str) -> String {
        format!("{}/stop-monitoring/{}", self.base_url, user_id)
    }

    /// Alert channel URL: same host as the HTTP base with the scheme
    /// switched to its WebSocket counterpart (`http` -> `ws`, `https` -> `wss`)
    pub fn alert_ws_url(&self, user_id: &str) -> String {
        let ws_base = if let Some(rest) = self.base_url.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = self.base_url.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            self.base_url.clone()
        };
        format!("{}/ws/alert/{}", ws_base, user_id)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
