//! Shared wire types for the FallWatch backend
//!
//! Request bodies use the backend's camelCase field names; response bodies
//! are snake_case. Optional fields carry `#[serde(default)]` because the
//! backend omits rather than nulls them.

use serde::{Deserialize, Serialize};

/// Authenticated user session
///
/// Created from the login/signup response, held for the app session,
/// cleared on logout. There is no server-side teardown call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    pub user_id: String,
    pub username: String,
    pub email: String,
}

/// A registered camera
///
/// Cameras are addressed by their position in the per-user list; the backend
/// issues no stable identifier. `rtsp_url` is absent for relay cameras fed
/// by an external agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub name: String,
    #[serde(default)]
    pub rtsp_url: Option<String>,
    #[serde(default)]
    pub relay: bool,
    /// Server-assigned creation timestamp (ISO 8601)
    #[serde(default)]
    pub added_time: Option<String>,
}

impl Camera {
    /// Whether this camera can be fed to AI monitoring: it needs a non-empty
    /// RTSP URL and must not be a relay entry.
    pub fn monitorable(&self) -> bool {
        !self.relay && self.rtsp_url.as_deref().map_or(false, |u| !u.is_empty())
    }
}

/// A recorded video clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub filename: String,
    #[serde(default)]
    pub url: Option<String>,
    /// Creation time as a Unix timestamp (fractional seconds)
    #[serde(default)]
    pub created: Option<f64>,
    #[serde(default)]
    pub motion_detected: Option<bool>,
    #[serde(default)]
    pub duration: Option<f64>,
}

/// A clip the backend flagged as containing a detected fall
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccidentVideoRecord {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub camera_name: Option<String>,
    /// Creation time as a Unix timestamp (whole seconds)
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub duration: Option<f64>,
}

/// Backend system status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemStatus {
    pub model_loaded: bool,
    pub active_websockets: u32,
}

// ========================================
// Response envelopes
// ========================================

/// `GET /cctv/cameras/{userId}`
#[derive(Debug, Clone, Deserialize)]
pub struct CamerasResponse {
    #[serde(default)]
    pub cameras: Vec<Camera>,
}

/// `GET /videos/{userId}`
#[derive(Debug, Clone, Deserialize)]
pub struct VideosResponse {
    #[serde(default)]
    pub videos: Vec<VideoRecord>,
}

/// `GET /accident-videos/{userId}`
#[derive(Debug, Clone, Deserialize)]
pub struct AccidentVideosResponse {
    #[serde(default)]
    pub videos: Vec<AccidentVideoRecord>,
}

/// Mutation confirmation: `{success, message?}`
///
/// Successful mutations do not echo the affected record in any form the
/// client relies on; callers re-fetch the list to observe changes.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// `POST /login`
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub uuid: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// `POST /register`
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    pub uuid: String,
}

// ========================================
// Request bodies
// ========================================

/// `POST /login`
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// `POST /register`
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// `POST /cctv/add-camera`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCameraRequest<'a> {
    pub user_id: &'a str,
    pub camera_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rtsp_url: Option<&'a str>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub relay: bool,
}

/// `PATCH /cctv/edit-camera`
///
/// Absent fields are left untouched by the backend (partial update).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditCameraRequest<'a> {
    pub user_id: &'a str,
    pub camera_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rtsp_url: Option<&'a str>,
}

/// `POST /start-monitoring/{userId}`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartMonitoringRequest {
    pub selected_cameras: Vec<usize>,
}

/// `POST /change-name`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeNameRequest<'a> {
    pub user_id: &'a str,
    pub new_name: &'a str,
}

/// `POST /change-password`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest<'a> {
    pub user_id: &'a str,
    pub old_password: &'a str,
    pub new_password: &'a str,
}
