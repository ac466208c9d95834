//! VideoCatalog - process-wide cache of the user's recorded clips
//!
//! ## Responsibilities
//!
//! - Hold the current user's video list, replaced wholesale on refresh
//! - Keep the previous list when a refresh fails
//! - Drop out-of-order responses so a slow early fetch can never overwrite
//!   the result of a later one
//!
//! Refreshes are triggered when a user id first becomes available and once
//! per inbound alert event. Bursts are allowed: overlapping refreshes are
//! idempotent wholesale replaces, and the sequence guard below is what keeps
//! "last request issued" and "last response applied" in agreement.

use crate::api_client::ApiClient;
use crate::models::VideoRecord;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error};

struct CatalogState {
    videos: Vec<VideoRecord>,
    /// Sequence number of the refresh whose result is currently cached
    applied_seq: u64,
}

/// Process-wide video list cache
pub struct VideoCatalog {
    api: Arc<ApiClient>,
    state: RwLock<CatalogState>,
    /// Monotonic refresh counter; issued at request time, checked at apply time
    issue_seq: AtomicU64,
}

impl VideoCatalog {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            state: RwLock::new(CatalogState {
                videos: Vec::new(),
                applied_seq: 0,
            }),
            issue_seq: AtomicU64::new(0),
        }
    }

    /// Issue the next refresh sequence number
    pub fn begin_refresh(&self) -> u64 {
        self.issue_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Install a fetched list if it is not stale. Returns whether the cache
    /// was updated.
    pub async fn apply(&self, seq: u64, videos: Vec<VideoRecord>) -> bool {
        let mut state = self.state.write().await;
        if seq <= state.applied_seq {
            debug!(
                seq = seq,
                applied_seq = state.applied_seq,
                "Dropping stale video list response"
            );
            return false;
        }
        state.applied_seq = seq;
        state.videos = videos;
        debug!(seq = seq, count = state.videos.len(), "Video catalog updated");
        true
    }

    /// Re-fetch the full video list for the user.
    ///
    /// An empty user id means logged out and disables the refresh. On
    /// failure the previous list is retained and the error goes to the log
    /// only; nothing is surfaced to callers.
    pub async fn refresh(&self, user_id: &str) {
        if user_id.is_empty() {
            return;
        }

        let seq = self.begin_refresh();
        match self.api.list_videos(user_id).await {
            Ok(videos) => {
                self.apply(seq, videos).await;
            }
            Err(e) => {
                error!(user_id = %user_id, seq = seq, error = %e, "Video catalog refresh failed");
            }
        }
    }

    /// Current cached list
    pub async fn snapshot(&self) -> Vec<VideoRecord> {
        self.state.read().await.videos.clone()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.videos.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.videos.is_empty()
    }

    /// Drop the cached list (logout)
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.videos.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;

    fn catalog() -> VideoCatalog {
        let config = Arc::new(ClientConfig::new("http://127.0.0.1:1"));
        VideoCatalog::new(Arc::new(ApiClient::new(config)))
    }

    fn clip(filename: &str) -> VideoRecord {
        VideoRecord {
            filename: filename.to_string(),
            url: None,
            created: None,
            motion_detected: None,
            duration: None,
        }
    }

    #[tokio::test]
    async fn test_apply_installs_list() {
        let catalog = catalog();
        let seq = catalog.begin_refresh();
        assert!(catalog.apply(seq, vec![clip("a.mp4")]).await);
        assert_eq!(catalog.len().await, 1);
    }

    #[tokio::test]
    async fn test_last_issued_refresh_wins_regardless_of_arrival_order() {
        let catalog = catalog();
        let first = catalog.begin_refresh();
        let second = catalog.begin_refresh();

        // the later request's response arrives first
        assert!(catalog.apply(second, vec![clip("new.mp4")]).await);
        // the earlier request's response straggles in afterwards and is dropped
        assert!(!catalog.apply(first, vec![clip("old.mp4")]).await);

        let videos = catalog.snapshot().await;
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].filename, "new.mp4");
    }

    #[tokio::test]
    async fn test_refresh_with_empty_user_is_a_noop() {
        let catalog = catalog();
        catalog.refresh("").await;
        assert_eq!(catalog.len().await, 0);
        // no sequence number was consumed
        assert_eq!(catalog.begin_refresh(), 1);
    }

    #[tokio::test]
    async fn test_failed_refresh_retains_previous_list() {
        let catalog = catalog();
        let seq = catalog.begin_refresh();
        catalog.apply(seq, vec![clip("keep.mp4")]).await;

        // nothing listens on port 1, so this fetch fails and must not clobber
        catalog.refresh("u-123").await;

        let videos = catalog.snapshot().await;
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].filename, "keep.mp4");
    }

    #[tokio::test]
    async fn test_clear_drops_cached_list() {
        let catalog = catalog();
        let seq = catalog.begin_refresh();
        catalog.apply(seq, vec![clip("a.mp4")]).await;
        catalog.clear().await;
        assert!(catalog.is_empty().await);
    }
}
