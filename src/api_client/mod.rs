//! ApiClient - Backend HTTP Adapter
//!
//! ## Responsibilities
//!
//! - Auth and account operations (login, register, change name/password)
//! - System status
//! - Video and accident-video listings
//! - Camera catalog mutations (add / edit / remove) and monitoring commands
//!
//! Every mutation is fire-and-confirm: one request, one confirmation body,
//! no retry and no idempotency key. A call that dies mid-flight leaves the
//! caller unable to know whether the mutation committed.

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::models::{
    AccidentVideoRecord, AccidentVideosResponse, AddCameraRequest, Camera, CamerasResponse,
    ChangeNameRequest, ChangePasswordRequest, CommandResponse, EditCameraRequest, LoginRequest,
    LoginResponse, RegisterRequest, RegisterResponse, StartMonitoringRequest, SystemStatus,
    UserSession, VideoRecord, VideosResponse,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Minimum accepted password length for account operations
const MIN_PASSWORD_LEN: usize = 6;

/// Backend HTTP client
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
}

impl ApiClient {
    /// Create a new client with the configured timeouts
    pub fn new(config: Arc<ClientConfig>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self { http, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Extract a presentable refusal message from a non-2xx response.
    /// The backend wraps errors as `{"detail": "..."}`.
    async fn rejection_message(resp: reqwest::Response) -> String {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(&body) {
            if let Some(detail) = value.get("detail").and_then(|d| d.as_str()) {
                return detail.to_string();
            }
        }
        if body.is_empty() {
            format!("HTTP {}", status.as_u16())
        } else {
            format!("HTTP {}: {}", status.as_u16(), body)
        }
    }

    /// Normalize a mutation response: non-2xx and `success: false` both
    /// become `Error::Rejected` carrying the backend's message.
    async fn confirm(resp: reqwest::Response) -> Result<String> {
        if !resp.status().is_success() {
            return Err(Error::Rejected(Self::rejection_message(resp).await));
        }
        let body: CommandResponse = resp.json().await?;
        if body.success {
            Ok(body.message.unwrap_or_default())
        } else {
            Err(Error::Rejected(
                body.message.unwrap_or_else(|| "Request rejected".to_string()),
            ))
        }
    }

    // ========================================
    // Auth & account
    // ========================================

    /// Log in and build the user session from the response
    pub async fn login(&self, username: &str, password: &str) -> Result<UserSession> {
        if username.trim().is_empty() {
            return Err(Error::Validation("Please enter username".to_string()));
        }
        if password.is_empty() {
            return Err(Error::Validation("Please enter password".to_string()));
        }

        let url = self.config.login_url();
        debug!(url = %url, username = %username, "Logging in");

        let resp = self
            .http
            .post(&url)
            .json(&LoginRequest { username, password })
            .send()
            .await?;

        if !resp.status().is_success() {
            let message = Self::rejection_message(resp).await;
            warn!(username = %username, message = %message, "Login rejected");
            return Err(Error::Rejected(message));
        }

        let body: LoginResponse = resp.json().await?;
        info!(user_id = %body.uuid, username = %username, "Login succeeded");

        Ok(UserSession {
            user_id: body.uuid,
            username: username.to_string(),
            email: body.email.unwrap_or_default(),
        })
    }

    /// Register a new account; returns the server-issued user id
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<String> {
        if name.trim().is_empty() || email.trim().is_empty() {
            return Err(Error::Validation("Name and email are required".to_string()));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(Error::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let url = self.config.register_url();
        debug!(url = %url, name = %name, "Registering account");

        let resp = self
            .http
            .post(&url)
            .json(&RegisterRequest { name, email, password })
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Error::Rejected(Self::rejection_message(resp).await));
        }

        let body: RegisterResponse = resp.json().await?;
        info!(user_id = %body.uuid, "Account registered");
        Ok(body.uuid)
    }

    /// Change the account display name
    pub async fn change_name(&self, user_id: &str, new_name: &str) -> Result<()> {
        if new_name.trim().is_empty() {
            return Err(Error::Validation("Name cannot be empty".to_string()));
        }

        let resp = self
            .http
            .post(self.config.change_name_url())
            .json(&ChangeNameRequest {
                user_id,
                new_name: new_name.trim(),
            })
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Error::Rejected(Self::rejection_message(resp).await));
        }
        info!(user_id = %user_id, "Display name changed");
        Ok(())
    }

    /// Change the account password
    pub async fn change_password(
        &self,
        user_id: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<()> {
        if old_password.is_empty() {
            return Err(Error::Validation("Current password is required".to_string()));
        }
        if new_password.len() < MIN_PASSWORD_LEN {
            return Err(Error::Validation(format!(
                "New password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let resp = self
            .http
            .post(self.config.change_password_url())
            .json(&ChangePasswordRequest {
                user_id,
                old_password,
                new_password,
            })
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Error::Rejected(Self::rejection_message(resp).await));
        }
        info!(user_id = %user_id, "Password changed");
        Ok(())
    }

    // ========================================
    // System status
    // ========================================

    /// Fetch backend status (AI model readiness, open alert channels)
    pub async fn system_status(&self) -> Result<SystemStatus> {
        let url = self.config.status_url();
        debug!(url = %url, "Checking system status");

        let resp = self.http.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(Error::Rejected(Self::rejection_message(resp).await));
        }

        let status: SystemStatus = resp.json().await?;
        debug!(
            model_loaded = status.model_loaded,
            active_websockets = status.active_websockets,
            "System status received"
        );
        Ok(status)
    }

    // ========================================
    // Video listings
    // ========================================

    /// All recorded clips for a user, in backend order
    pub async fn list_videos(&self, user_id: &str) -> Result<Vec<VideoRecord>> {
        let url = self.config.videos_url(user_id);
        let resp = self.http.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(Error::Rejected(Self::rejection_message(resp).await));
        }
        let body: VideosResponse = resp.json().await?;
        debug!(user_id = %user_id, count = body.videos.len(), "Video list fetched");
        Ok(body.videos)
    }

    /// Clips the backend flagged as containing a detected fall
    pub async fn list_accident_videos(&self, user_id: &str) -> Result<Vec<AccidentVideoRecord>> {
        let url = self.config.accident_videos_url(user_id);
        let resp = self.http.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(Error::Rejected(Self::rejection_message(resp).await));
        }
        let body: AccidentVideosResponse = resp.json().await?;
        debug!(user_id = %user_id, count = body.videos.len(), "Accident video list fetched");
        Ok(body.videos)
    }

    // ========================================
    // Camera catalog
    // ========================================

    /// Ordered camera list for a user. The order is the backend's and doubles
    /// as the addressing scheme for every mutation below.
    pub async fn list_cameras(&self, user_id: &str) -> Result<Vec<Camera>> {
        let url = self.config.cameras_url(user_id);
        let resp = self.http.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(Error::Rejected(Self::rejection_message(resp).await));
        }
        let body: CamerasResponse = resp.json().await?;
        debug!(user_id = %user_id, count = body.cameras.len(), "Camera list fetched");
        Ok(body.cameras)
    }

    /// Add a direct RTSP camera
    pub async fn add_camera(&self, user_id: &str, name: &str, rtsp_url: &str) -> Result<String> {
        let resp = self
            .http
            .post(self.config.add_camera_url())
            .json(&AddCameraRequest {
                user_id,
                camera_name: name,
                rtsp_url: Some(rtsp_url),
                relay: false,
            })
            .send()
            .await?;

        let message = Self::confirm(resp).await?;
        info!(user_id = %user_id, camera = %name, "Camera added");
        Ok(message)
    }

    /// Add a relay camera: no RTSP URL by design, frames are pushed by an
    /// external agent outside this system's boundary.
    pub async fn add_relay_camera(&self, user_id: &str, name: &str) -> Result<String> {
        let resp = self
            .http
            .post(self.config.add_camera_url())
            .json(&AddCameraRequest {
                user_id,
                camera_name: name,
                rtsp_url: None,
                relay: true,
            })
            .send()
            .await?;

        let message = Self::confirm(resp).await?;
        info!(user_id = %user_id, camera = %name, "Relay camera added");
        Ok(message)
    }

    /// Edit a camera in place. `index` addresses the position in the last
    /// fetched list; a concurrent add/remove for the same user shifts
    /// positions and makes this edit land on whatever occupies the slot.
    pub async fn edit_camera(
        &self,
        user_id: &str,
        index: usize,
        name: Option<&str>,
        rtsp_url: Option<&str>,
    ) -> Result<String> {
        let resp = self
            .http
            .patch(self.config.edit_camera_url())
            .json(&EditCameraRequest {
                user_id,
                camera_index: index,
                camera_name: name,
                rtsp_url,
            })
            .send()
            .await?;

        let message = Self::confirm(resp).await?;
        info!(user_id = %user_id, camera_index = index, "Camera edited");
        Ok(message)
    }

    /// Remove a camera by position. Same index-shift caveat as `edit_camera`.
    pub async fn remove_camera(&self, user_id: &str, index: usize) -> Result<String> {
        let url = self.config.remove_camera_url(user_id, index);
        let resp = self.http.delete(&url).send().await?;

        let message = Self::confirm(resp).await?;
        info!(user_id = %user_id, camera_index = index, "Camera removed");
        Ok(message)
    }

    // ========================================
    // Monitoring commands
    // ========================================

    /// Ask the backend to run fall-detection inference on the given camera
    /// positions. Callers must pre-filter to monitorable cameras; the
    /// backend does not re-validate the selection.
    pub async fn start_monitoring(&self, user_id: &str, indices: &[usize]) -> Result<String> {
        let resp = self
            .http
            .post(self.config.start_monitoring_url(user_id))
            .json(&StartMonitoringRequest {
                selected_cameras: indices.to_vec(),
            })
            .send()
            .await?;

        let message = Self::confirm(resp).await?;
        info!(user_id = %user_id, cameras = indices.len(), "Monitoring started");
        Ok(message)
    }

    /// Stop inference for all of the user's cameras
    pub async fn stop_monitoring(&self, user_id: &str) -> Result<String> {
        let resp = self
            .http
            .post(self.config.stop_monitoring_url(user_id))
            .send()
            .await?;

        let message = Self::confirm(resp).await?;
        info!(user_id = %user_id, "Monitoring stopped");
        Ok(message)
    }
}
