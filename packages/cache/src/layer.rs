use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::store::CacheStore;

/// TTL for ordinary results.
pub const DEFAULT_TTL_SECS: u64 = 3600;
/// TTL for results above [`LARGE_RESULT_THRESHOLD`] commits.
pub const LARGE_RESULT_TTL_SECS: u64 = 1800;
pub const LARGE_RESULT_THRESHOLD: usize = 500;

/// Source of the current time, swappable for tests.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// TTL for a result holding `commit_count` commits.
#[must_use]
pub const fn ttl_for_commit_count(commit_count: usize) -> u64 {
    if commit_count > LARGE_RESULT_THRESHOLD {
        LARGE_RESULT_TTL_SECS
    } else {
        DEFAULT_TTL_SECS
    }
}

/// What the layer writes into the store for each key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub data: serde_json::Value,
    /// Epoch milliseconds.
    pub expires_at: i64,
}

/// Best-effort TTL cache over a [`CacheStore`].
///
/// Store failures never surface: a failed read is a miss, a failed write is
/// skipped. Both are logged.
#[derive(Clone)]
pub struct CacheLayer {
    store: Arc<dyn CacheStore>,
    clock: Clock,
}

impl CacheLayer {
    #[must_use]
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self {
            store,
            clock: Arc::new(Utc::now),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    fn now_millis(&self) -> i64 {
        (self.clock)().timestamp_millis()
    }

    /// The cached value under `key`, unless absent, expired or unreadable.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let stored = match self.store.get(key).await {
            Ok(Some(stored)) => stored,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("Cache read failed for {key}, treating as miss: {e}");
                return None;
            }
        };

        let entry: CacheEntry = serde_json::from_value(stored)
            .inspect_err(|e| log::warn!("Discarding malformed cache entry {key}: {e}"))
            .ok()?;

        if entry.expires_at <= self.now_millis() {
            log::debug!("Cache entry {key} expired");
            return None;
        }

        serde_json::from_value(entry.data)
            .inspect_err(|e| log::warn!("Discarding cache entry {key} of unexpected shape: {e}"))
            .ok()
    }

    /// Store `value` under `key` for `ttl_secs`.
    pub async fn set<T: Serialize + Sync>(&self, key: &str, value: &T, ttl_secs: u64) {
        let data = match serde_json::to_value(value) {
            Ok(data) => data,
            Err(e) => {
                log::warn!("Not caching {key}, serialization failed: {e}");
                return;
            }
        };

        let ttl_millis = i64::try_from(ttl_secs.saturating_mul(1000)).unwrap_or(i64::MAX);
        let entry = CacheEntry {
            data,
            expires_at: self.now_millis().saturating_add(ttl_millis),
        };

        let stored = match serde_json::to_value(&entry) {
            Ok(stored) => stored,
            Err(e) => {
                log::warn!("Not caching {key}, serialization failed: {e}");
                return;
            }
        };

        if let Err(e) = self.store.put(key, stored, ttl_secs).await {
            log::warn!("Cache write failed for {key}, skipping: {e}");
        }
    }

    /// Drop every entry under `prefix`. Best effort, returns 0 on failure.
    pub async fn invalidate_prefix(&self, prefix: &str) -> usize {
        match self.store.delete_prefix(prefix).await {
            Ok(removed) => {
                log::debug!("Invalidated {removed} cache entries under {prefix}");
                removed
            }
            Err(e) => {
                log::warn!("Cache invalidation failed for {prefix}: {e}");
                0
            }
        }
    }
}
