//! FallWatch monitor daemon
//!
//! Headless client: logs in, opens the alert channel, mirrors alerts to the
//! log, and keeps the video catalog fresh. Useful on a box that should react
//! to fall alerts without a phone in hand.

use fallwatch_client::{discovery, AppState, ClientConfig};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fallwatch_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting FallWatch monitor v{}", env!("CARGO_PKG_VERSION"));

    let config = ClientConfig::from_env();
    tracing::info!(base_url = %config.base_url, "Loaded configuration");

    let state = AppState::new(config);

    // Backend reachability and AI readiness, best effort
    match state.api.system_status().await {
        Ok(status) => tracing::info!(
            model_loaded = status.model_loaded,
            active_websockets = status.active_websockets,
            "Backend status"
        ),
        Err(e) => tracing::warn!(error = %e, "Backend status check failed"),
    }

    // LAN camera discovery on request; handy when filling in add-camera forms
    if std::env::var("FALLWATCH_DISCOVER").is_ok() {
        match discovery::probe(Duration::from_secs(3)).await {
            Ok(found) if found.is_empty() => tracing::info!("No ONVIF cameras answered"),
            Ok(found) => {
                for camera in &found {
                    tracing::info!(ip = %camera.ip, rtsp_url = %camera.rtsp_url, "Discovered camera");
                }
            }
            Err(e) => tracing::warn!(error = %e, "ONVIF discovery failed"),
        }
    }

    let username = std::env::var("FALLWATCH_USERNAME").ok();
    let password = std::env::var("FALLWATCH_PASSWORD").ok();

    match (username, password) {
        (Some(username), Some(password)) => {
            match state.api.login(&username, &password).await {
                Ok(session) => {
                    let user_id = session.user_id.clone();
                    state.attach_user(session).await;

                    let cameras = state.cameras.list_or_empty(&user_id).await;
                    let accidents = state
                        .api
                        .list_accident_videos(&user_id)
                        .await
                        .map(|v| v.len())
                        .unwrap_or(0);
                    tracing::info!(
                        cameras = cameras.len(),
                        videos = state.videos.len().await,
                        accident_clips = accidents,
                        "Initial snapshots loaded"
                    );

                    // Opt-in: ask the backend to watch every monitorable camera
                    if std::env::var("FALLWATCH_MONITOR").is_ok() {
                        let selection: Vec<usize> = (0..cameras.len()).collect();
                        match state.monitoring.start(&user_id, &cameras, &selection).await {
                            Ok(message) => tracing::info!(message = %message, "Monitoring requested"),
                            Err(e) => tracing::warn!(error = %e, "Could not start monitoring"),
                        }
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Login failed - running logged out");
                }
            }
        }
        _ => {
            tracing::warn!(
                "FALLWATCH_USERNAME / FALLWATCH_PASSWORD not set - running logged out"
            );
        }
    }

    let (subscriber_id, mut alerts) = state.alerts.subscribe().await;
    tracing::info!("Monitoring for alerts, ctrl-c to stop");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown requested");
                break;
            }
            event = alerts.recv() => match event {
                Some(event) => {
                    if event.is_urgent() {
                        tracing::warn!(alert = %event.summary(), "FALL ALERT");
                    } else {
                        tracing::info!(alert = %event.summary(), "Notification");
                    }
                }
                None => break,
            }
        }
    }

    state.alerts.unsubscribe(&subscriber_id).await;
    if state.monitoring.is_active().await {
        if let Some(user_id) = state.session.user_id().await {
            if let Err(e) = state.monitoring.stop(&user_id).await {
                tracing::warn!(error = %e, "Could not stop monitoring");
            }
        }
    }
    state.detach_user().await;
    tracing::info!("Shutdown complete");

    Ok(())
}
