//! CameraCatalog - command layer over the per-user camera list
//!
//! ## Responsibilities
//!
//! - List cameras with the empty-list fallback the screens rely on
//! - Validate add/edit input before it reaches the network
//! - Pre-filter monitoring selections to cameras that can actually be
//!   monitored (non-empty RTSP URL, not a relay entry)
//! - Track the last acknowledged monitoring state
//!
//! Cameras are addressed by list position. Positions shift under concurrent
//! mutation, so an edit or remove issued against a stale list lands on
//! whatever occupies that slot now. That is the backend contract, not a bug
//! this layer papers over.

use crate::api_client::ApiClient;
use crate::error::{Error, Result};
use crate::models::Camera;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Positions of cameras eligible for AI monitoring.
///
/// A camera with an absent/empty RTSP URL or `relay = true` never appears in
/// the result; the backend does not re-validate, so this filter is a
/// correctness requirement rather than a convenience.
pub fn monitorable_indices(cameras: &[Camera]) -> Vec<usize> {
    cameras
        .iter()
        .enumerate()
        .filter(|(_, c)| c.monitorable())
        .map(|(i, _)| i)
        .collect()
}

/// Camera list and mutation commands
pub struct CameraCatalog {
    api: Arc<ApiClient>,
}

impl CameraCatalog {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Ordered camera list, backend order
    pub async fn list(&self, user_id: &str) -> Result<Vec<Camera>> {
        self.api.list_cameras(user_id).await
    }

    /// Camera list with the screen-facing fallback: a transport failure
    /// logs and yields an empty list instead of an error.
    pub async fn list_or_empty(&self, user_id: &str) -> Vec<Camera> {
        match self.api.list_cameras(user_id).await {
            Ok(cameras) => cameras,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Camera list fetch failed, showing empty list");
                Vec::new()
            }
        }
    }

    /// Add a direct RTSP camera. The confirmation carries no echo of the
    /// created record; call `list` again to observe it.
    pub async fn add(&self, user_id: &str, name: &str, rtsp_url: &str) -> Result<String> {
        if name.trim().is_empty() {
            return Err(Error::Validation("Camera name is required".to_string()));
        }
        if rtsp_url.trim().is_empty() {
            return Err(Error::Validation("RTSP URL is required".to_string()));
        }
        self.api.add_camera(user_id, name.trim(), rtsp_url.trim()).await
    }

    /// Add a relay camera (no RTSP URL by design)
    pub async fn add_relay(&self, user_id: &str, name: &str) -> Result<String> {
        if name.trim().is_empty() {
            return Err(Error::Validation("Camera name is required".to_string()));
        }
        self.api.add_relay_camera(user_id, name.trim()).await
    }

    /// Edit name and/or RTSP URL of the camera at `index` in the last
    /// fetched list
    pub async fn edit(
        &self,
        user_id: &str,
        index: usize,
        name: Option<&str>,
        rtsp_url: Option<&str>,
    ) -> Result<String> {
        if name.is_none() && rtsp_url.is_none() {
            return Err(Error::Validation("Nothing to change".to_string()));
        }
        if let Some(n) = name {
            if n.trim().is_empty() {
                return Err(Error::Validation("Camera name cannot be empty".to_string()));
            }
        }
        self.api.edit_camera(user_id, index, name, rtsp_url).await
    }

    /// Remove the camera at `index` in the last fetched list
    pub async fn remove(&self, user_id: &str, index: usize) -> Result<String> {
        self.api.remove_camera(user_id, index).await
    }
}

/// Last-known monitoring state
///
/// A start/stop toggle mirroring the most recent server acknowledgment.
/// The backend owns the actual inference lifecycle; this is only what the
/// client last heard.
pub struct MonitoringSession {
    api: Arc<ApiClient>,
    state: RwLock<MonitoringState>,
}

#[derive(Debug, Clone, Default)]
struct MonitoringState {
    active: bool,
    selection: Vec<usize>,
}

impl MonitoringSession {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            state: RwLock::new(MonitoringState::default()),
        }
    }

    /// Start monitoring the selected camera positions.
    ///
    /// The selection is intersected with the monitorable pre-filter before
    /// anything is sent; an empty intersection fails validation locally.
    pub async fn start(
        &self,
        user_id: &str,
        cameras: &[Camera],
        selected: &[usize],
    ) -> Result<String> {
        let eligible = monitorable_indices(cameras);
        let filtered: Vec<usize> = selected
            .iter()
            .copied()
            .filter(|i| eligible.contains(i))
            .collect();

        if filtered.len() < selected.len() {
            warn!(
                user_id = %user_id,
                requested = selected.len(),
                accepted = filtered.len(),
                "Dropped non-monitorable cameras from selection"
            );
        }
        if filtered.is_empty() {
            return Err(Error::Validation(
                "No monitorable cameras selected".to_string(),
            ));
        }

        let message = self.api.start_monitoring(user_id, &filtered).await?;

        let mut state = self.state.write().await;
        state.active = true;
        state.selection = filtered;
        info!(user_id = %user_id, cameras = state.selection.len(), "Monitoring session active");
        Ok(message)
    }

    /// Stop monitoring for all cameras
    pub async fn stop(&self, user_id: &str) -> Result<String> {
        let message = self.api.stop_monitoring(user_id).await?;

        let mut state = self.state.write().await;
        state.active = false;
        state.selection.clear();
        info!(user_id = %user_id, "Monitoring session stopped");
        Ok(message)
    }

    /// Last acknowledged state
    pub async fn is_active(&self) -> bool {
        self.state.read().await.active
    }

    /// Camera positions accepted by the last successful start
    pub async fn selection(&self) -> Vec<usize> {
        self.state.read().await.selection.clone()
    }
}
