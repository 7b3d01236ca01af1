//! Approximate per-course view counters.
//!
//! Counter state lives exclusively in the cache tier; the relational store
//! never mirrors it, so a cache flush silently resets accumulated counts.
//! All arithmetic happens in the backend's atomic increment - there is no
//! read-modify-write at this layer.

use std::time::Duration;

use uuid::Uuid;

use super::client::CacheClient;

const VIEWS_KEY_PREFIX: &str = "course:views:";

/// Per-course view counters with a rolling expiry window.
///
/// Every bump refreshes the window, so a counter expires only after the
/// configured period of inactivity.
#[derive(Clone)]
pub struct ViewCounters {
    client: CacheClient,
    window: Duration,
}

impl ViewCounters {
    /// Create view counters over the given client with the given window.
    pub fn new(client: CacheClient, window: Duration) -> Self {
        Self { client, window }
    }

    fn views_key(course_id: &Uuid) -> String {
        format!("{VIEWS_KEY_PREFIX}{course_id}")
    }

    /// Record one view. Returns the new count, or `None` when the cache is
    /// unavailable (the view is then simply not counted).
    pub async fn bump(&self, course_id: &Uuid) -> Option<i64> {
        self.client
            .incr_expire(&Self::views_key(course_id), self.window)
            .await
    }

    /// Read the current count; 0 when absent, expired or unreachable.
    pub async fn read(&self, course_id: &Uuid) -> i64 {
        self.client.counter(&Self::views_key(course_id)).await
    }
}
