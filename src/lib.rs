//! FallWatch client core
//!
//! Client-side core for a fall-detection camera monitoring product. The
//! backend runs the cameras, the inference, and the recordings; this crate
//! owns everything the device has to get right on its side of the wire.
//!
//! ## Components
//!
//! 1. ApiClient - backend HTTP adapter (auth, catalogs, commands)
//! 2. AlertHub - single-owner push channel for fall-detection alerts
//! 3. VideoCatalog - process-wide cache of recorded clips
//! 4. CameraCatalog / MonitoringSession - camera commands and inference toggle
//! 5. SessionStore - authenticated user state
//! 6. Discovery - best-effort ONVIF probe on the LAN
//!
//! ## Design principles
//!
//! - One alert channel per process, many subscribers
//! - Mutations are fire-and-confirm; reads are re-fetched, never patched
//! - A stale response never overwrites a newer one

pub mod alert_hub;
pub mod api_client;
pub mod camera_catalog;
pub mod config;
pub mod discovery;
pub mod error;
pub mod models;
pub mod session;
pub mod state;
pub mod video_catalog;

pub use config::ClientConfig;
pub use error::{Error, Result};
pub use state::AppState;
