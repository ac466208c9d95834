//! AlertHub - fall-detection push channel
//!
//! ## Responsibilities
//!
//! - Maintain at most one live WebSocket alert channel per process, keyed by
//!   the authenticated user
//! - Decode inbound payloads into typed events (with a compatibility decoder
//!   for the legacy bare-text sentinel)
//! - Fan events out to any number of subscribers
//! - Trigger a video catalog refresh for every inbound payload
//! - Keep a bounded log of recent alerts
//!
//! The hub is the single owner of the channel: views subscribe to it instead
//! of opening their own sockets. A dropped connection is not reopened here;
//! whoever owns the hub decides if and when to call `open` again, and until
//! then no alerts are delivered.

use crate::config::ClientConfig;
use crate::video_catalog::VideoCatalog;
use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Legacy bare-text payload announcing a detected fall
pub const FALL_SENTINEL: &str = "Fall detected!";

/// Retained alert history
const ALERT_LOG_CAPACITY: usize = 256;

/// Inbound alert event
///
/// The wire format is a tagged JSON object; bare text arrives from older
/// backends and goes through the compatibility decoder in [`AlertEvent::decode`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlertEvent {
    /// A fall was detected; demands immediate user attention
    FallDetected {
        #[serde(default)]
        message: String,
    },
    /// A camera stopped responding
    CameraOffline {
        #[serde(default)]
        camera: String,
    },
    /// Anything else worth a notification
    Notice {
        #[serde(default)]
        message: String,
    },
}

impl AlertEvent {
    /// Decode a payload: structured JSON first, then the bare-text shim.
    /// The exact sentinel string maps to `FallDetected`; any other text is a
    /// generic notice.
    pub fn decode(payload: &str) -> Self {
        if let Ok(event) = serde_json::from_str::<AlertEvent>(payload) {
            return event;
        }
        if payload == FALL_SENTINEL {
            AlertEvent::FallDetected {
                message: payload.to_string(),
            }
        } else {
            AlertEvent::Notice {
                message: payload.to_string(),
            }
        }
    }

    /// Whether this event interrupts the user (blocking alert) rather than
    /// being a passive notification
    pub fn is_urgent(&self) -> bool {
        matches!(self, AlertEvent::FallDetected { .. })
    }

    /// Notification body text
    pub fn summary(&self) -> String {
        match self {
            AlertEvent::FallDetected { message } if !message.is_empty() => message.clone(),
            AlertEvent::FallDetected { .. } => "Fall detected from camera!".to_string(),
            AlertEvent::CameraOffline { camera } => format!("Camera offline: {}", camera),
            AlertEvent::Notice { message } => message.clone(),
        }
    }
}

/// One received alert with its arrival time
#[derive(Debug, Clone, Serialize)]
pub struct AlertLogEntry {
    pub event: AlertEvent,
    pub received_at: DateTime<Utc>,
}

/// Ring buffer of recent alerts
struct AlertRingBuffer {
    entries: VecDeque<AlertLogEntry>,
    capacity: usize,
}

impl AlertRingBuffer {
    fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    fn push(&mut self, entry: AlertLogEntry) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    fn latest(&self, count: usize) -> Vec<AlertLogEntry> {
        self.entries.iter().rev().take(count).cloned().collect()
    }
}

/// State shared with the channel reader task
struct HubShared {
    subscribers: RwLock<HashMap<Uuid, mpsc::UnboundedSender<AlertEvent>>>,
    log: RwLock<AlertRingBuffer>,
    catalog: Arc<VideoCatalog>,
}

impl HubShared {
    /// Decode one payload and run both delivery paths: fan-out to
    /// subscribers (the urgent path is flagged on the event itself) and the
    /// fire-and-forget catalog refresh that runs for every payload.
    async fn dispatch(&self, user_id: &str, payload: &str) {
        let event = AlertEvent::decode(payload);

        if event.is_urgent() {
            warn!(user_id = %user_id, "Fall detected - immediate attention alert");
        } else {
            debug!(user_id = %user_id, "Alert notification received");
        }

        {
            let mut log = self.log.write().await;
            log.push(AlertLogEntry {
                event: event.clone(),
                received_at: Utc::now(),
            });
        }

        let mut dead = Vec::new();
        {
            let subscribers = self.subscribers.read().await;
            for (id, tx) in subscribers.iter() {
                if tx.send(event.clone()).is_err() {
                    dead.push(*id);
                }
            }
        }
        if !dead.is_empty() {
            let mut subscribers = self.subscribers.write().await;
            for id in &dead {
                subscribers.remove(id);
            }
            debug!(pruned = dead.len(), "Removed dropped alert subscribers");
        }

        let catalog = self.catalog.clone();
        let user = user_id.to_string();
        tokio::spawn(async move {
            catalog.refresh(&user).await;
        });
    }
}

struct ActiveChannel {
    user_id: String,
    handle: JoinHandle<()>,
}

/// Process-wide alert channel owner
pub struct AlertHub {
    config: Arc<ClientConfig>,
    shared: Arc<HubShared>,
    active: Mutex<Option<ActiveChannel>>,
}

impl AlertHub {
    pub fn new(config: Arc<ClientConfig>, catalog: Arc<VideoCatalog>) -> Self {
        Self {
            config,
            shared: Arc::new(HubShared {
                subscribers: RwLock::new(HashMap::new()),
                log: RwLock::new(AlertRingBuffer::new(ALERT_LOG_CAPACITY)),
                catalog,
            }),
            active: Mutex::new(None),
        }
    }

    /// Register a subscriber; events arrive on the returned receiver until
    /// it is dropped or unsubscribed
    pub async fn subscribe(&self) -> (Uuid, mpsc::UnboundedReceiver<AlertEvent>) {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        self.shared.subscribers.write().await.insert(id, tx);
        info!(subscriber_id = %id, "Alert subscriber registered");
        (id, rx)
    }

    /// Remove a subscriber
    pub async fn unsubscribe(&self, id: &Uuid) {
        if self.shared.subscribers.write().await.remove(id).is_some() {
            info!(subscriber_id = %id, "Alert subscriber removed");
        }
    }

    pub async fn subscriber_count(&self) -> usize {
        self.shared.subscribers.read().await.len()
    }

    /// Open the alert channel for a user.
    ///
    /// Any live channel (same or different user) is closed first: the hub
    /// owns at most one connection. An empty user id means logged out and
    /// leaves the channel closed. Connect failures are logged and not
    /// retried; the owner may call `open` again later.
    pub async fn open(&self, user_id: &str) {
        let mut active = self.active.lock().await;
        if let Some(prev) = active.take() {
            prev.handle.abort();
            info!(user_id = %prev.user_id, "Closed previous alert channel");
        }

        if user_id.is_empty() {
            debug!("Empty user id - alert channel disabled");
            return;
        }

        let url = self.config.alert_ws_url(user_id);
        info!(user_id = %user_id, url = %url, "Opening alert channel");

        let shared = self.shared.clone();
        let user = user_id.to_string();
        let handle = tokio::spawn(run_channel(shared, url, user.clone()));
        *active = Some(ActiveChannel {
            user_id: user,
            handle,
        });
    }

    /// Close the channel. Closing an already-closed or never-opened channel
    /// is a no-op.
    pub async fn close(&self) {
        let mut active = self.active.lock().await;
        if let Some(prev) = active.take() {
            prev.handle.abort();
            info!(user_id = %prev.user_id, "Alert channel closed");
        }
    }

    /// User the channel is currently bound to, if any
    pub async fn current_user(&self) -> Option<String> {
        self.active
            .lock()
            .await
            .as_ref()
            .map(|a| a.user_id.clone())
    }

    /// Whether the channel reader is still running. False once the
    /// connection dropped or failed; alerts stay silent until `open` is
    /// called again.
    pub async fn is_open(&self) -> bool {
        self.active
            .lock()
            .await
            .as_ref()
            .map_or(false, |a| !a.handle.is_finished())
    }

    /// Most recent alerts, newest first
    pub async fn recent_alerts(&self, count: usize) -> Vec<AlertLogEntry> {
        self.shared.log.read().await.latest(count)
    }

    /// Inject a payload directly (tests and internal delivery)
    pub async fn deliver(&self, user_id: &str, payload: &str) {
        self.shared.dispatch(user_id, payload).await;
    }
}

/// Channel reader: connect, then pump frames until the stream ends.
/// No reconnect and no backoff live here by design.
async fn run_channel(shared: Arc<HubShared>, url: String, user_id: String) {
    let (mut stream, _) = match connect_async(url.as_str()).await {
        Ok(pair) => pair,
        Err(e) => {
            error!(user_id = %user_id, error = %e, "Alert channel connect failed");
            return;
        }
    };
    info!(user_id = %user_id, "Alert channel established");

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(payload)) => shared.dispatch(&user_id, &payload).await,
            Ok(Message::Close(_)) => {
                info!(user_id = %user_id, "Alert channel closed by server");
                break;
            }
            // the contract is inbound text frames only
            Ok(_) => {}
            Err(e) => {
                error!(user_id = %user_id, error = %e, "Alert channel transport error");
                break;
            }
        }
    }

    info!(user_id = %user_id, "Alert channel reader stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_client::ApiClient;

    fn hub() -> AlertHub {
        let config = Arc::new(ClientConfig::new("http://127.0.0.1:1"));
        let catalog = Arc::new(VideoCatalog::new(Arc::new(ApiClient::new(config.clone()))));
        AlertHub::new(config, catalog)
    }

    #[test]
    fn test_decode_sentinel_is_fall() {
        let event = AlertEvent::decode("Fall detected!");
        assert!(event.is_urgent());
        assert_eq!(
            event,
            AlertEvent::FallDetected {
                message: "Fall detected!".to_string()
            }
        );
    }

    #[test]
    fn test_decode_other_text_is_notice() {
        let event = AlertEvent::decode("camera offline");
        assert!(!event.is_urgent());
        assert_eq!(
            event,
            AlertEvent::Notice {
                message: "camera offline".to_string()
            }
        );
    }

    #[test]
    fn test_decode_structured_events() {
        let event = AlertEvent::decode(r#"{"kind": "fall_detected", "message": "bedroom"}"#);
        assert_eq!(
            event,
            AlertEvent::FallDetected {
                message: "bedroom".to_string()
            }
        );

        let event = AlertEvent::decode(r#"{"kind": "camera_offline", "camera": "front"}"#);
        assert_eq!(
            event,
            AlertEvent::CameraOffline {
                camera: "front".to_string()
            }
        );
        assert!(!event.is_urgent());
    }

    #[test]
    fn test_ring_buffer_evicts_oldest() {
        let mut ring = AlertRingBuffer::new(2);
        for message in ["a", "b", "c"] {
            ring.push(AlertLogEntry {
                event: AlertEvent::Notice {
                    message: message.to_string(),
                },
                received_at: Utc::now(),
            });
        }
        let latest = ring.latest(10);
        assert_eq!(latest.len(), 2);
        // newest first
        assert_eq!(latest[0].event.summary(), "c");
        assert_eq!(latest[1].event.summary(), "b");
    }

    #[tokio::test]
    async fn test_deliver_fans_out_to_all_subscribers() {
        let hub = hub();
        let (_id_a, mut rx_a) = hub.subscribe().await;
        let (_id_b, mut rx_b) = hub.subscribe().await;

        hub.deliver("u-123", "Fall detected!").await;

        let event_a = rx_a.recv().await.unwrap();
        let event_b = rx_b.recv().await.unwrap();
        assert!(event_a.is_urgent());
        assert_eq!(event_a, event_b);
    }

    #[tokio::test]
    async fn test_deliver_prunes_dropped_subscribers() {
        let hub = hub();
        let (_id_a, rx_a) = hub.subscribe().await;
        let (_id_b, mut rx_b) = hub.subscribe().await;
        assert_eq!(hub.subscriber_count().await, 2);

        drop(rx_a);
        hub.deliver("u-123", "camera offline").await;

        assert_eq!(hub.subscriber_count().await, 1);
        assert!(!rx_b.recv().await.unwrap().is_urgent());
    }

    #[tokio::test]
    async fn test_deliver_records_alert_log() {
        let hub = hub();
        hub.deliver("u-123", "Fall detected!").await;
        hub.deliver("u-123", "camera offline").await;

        let recent = hub.recent_alerts(10).await;
        assert_eq!(recent.len(), 2);
        // newest first
        assert!(!recent[0].event.is_urgent());
        assert!(recent[1].event.is_urgent());
    }

    #[tokio::test]
    async fn test_open_with_empty_user_leaves_channel_closed() {
        let hub = hub();
        hub.open("").await;
        assert!(hub.current_user().await.is_none());
        assert!(!hub.is_open().await);
    }

    #[tokio::test]
    async fn test_open_replaces_previous_channel() {
        let hub = hub();
        hub.open("u-1").await;
        assert_eq!(hub.current_user().await.as_deref(), Some("u-1"));

        // opening for another user closes the first channel before the
        // second exists; the hub never holds two
        hub.open("u-2").await;
        assert_eq!(hub.current_user().await.as_deref(), Some("u-2"));

        hub.close().await;
        assert!(hub.current_user().await.is_none());
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let hub = hub();
        // never opened: no-op
        hub.close().await;
        hub.open("u-1").await;
        hub.close().await;
        // already closed: no-op
        hub.close().await;
        assert!(!hub.is_open().await);
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_delivery() {
        let hub = hub();
        let (id, mut rx) = hub.subscribe().await;
        hub.unsubscribe(&id).await;
        assert_eq!(hub.subscriber_count().await, 0);

        hub.deliver("u-123", "notice").await;
        // sender side is gone, so the receiver yields None
        assert!(rx.recv().await.is_none());
    }
}
