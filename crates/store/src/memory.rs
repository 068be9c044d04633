//! Expiring in-memory cache backed by a `HashMap` behind a `RwLock`.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};

/// Upper bound on a single entry's lifetime (about 30 years).
const MAX_TTL: Duration = Duration::from_secs(30 * 365 * 24 * 60 * 60);

struct CacheEntry {
    value: String,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// A key → string store whose entries vanish once their TTL elapses.
///
/// Expired entries are never returned by [`get`](Self::get), whether or not
/// a sweep has run; the sweep only bounds memory.
pub struct ExpiringCache {
    data: RwLock<HashMap<String, CacheEntry>>,
}

impl ExpiringCache {
    /// Creates an empty cache without a background sweep.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a shared cache, sweeping expired entries every `interval`.
    ///
    /// The sweep task holds a weak reference and exits once the cache is
    /// dropped. Without a tokio runtime (or with a zero interval) the sweep
    /// is skipped and expiry stays purely lazy.
    #[must_use]
    pub fn with_sweep(interval: Duration) -> Arc<Self> {
        let cache = Arc::new(Self::new());
        if interval.is_zero() {
            return cache;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("no tokio runtime available, cache sweep disabled");
            return cache;
        };

        let weak = Arc::downgrade(&cache);
        handle.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(cache) = weak.upgrade() else {
                    break;
                };
                let removed = cache.purge_expired();
                if removed > 0 {
                    tracing::debug!(removed, "swept expired cache entries");
                }
            }
        });
        cache
    }

    /// Creates a shared cache, with a sweep when `sweep_interval` is set.
    #[must_use]
    pub fn shared(sweep_interval: Option<Duration>) -> Arc<Self> {
        match sweep_interval {
            Some(interval) => Self::with_sweep(interval),
            None => Arc::new(Self::new()),
        }
    }

    /// Stores `value` under `key` for `ttl`, replacing any previous entry.
    ///
    /// `ttl` is clamped to about 30 years.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>, ttl: Duration) {
        let now = Instant::now();
        let expires_at = now
            .checked_add(ttl.min(MAX_TTL))
            .unwrap_or_else(|| now.checked_add(Duration::from_secs(1)).unwrap_or(now));
        let entry = CacheEntry {
            value: value.into(),
            expires_at,
        };
        self.data.write().insert(key.into(), entry);
    }

    /// Returns the live value for `key`, evicting it if it has expired.
    pub fn get(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        {
            let data = self.data.read();
            match data.get(key) {
                None => return None,
                Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
                Some(_) => {}
            }
        }
        // Re-check under the write lock: a writer may have replaced the entry.
        let mut data = self.data.write();
        if data.get(key).is_some_and(|entry| entry.is_expired(now)) {
            data.remove(key);
        }
        None
    }

    /// Removes `key`, returning its value if it was still live.
    pub fn remove(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        self.data
            .write()
            .remove(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.value)
    }

    /// Deletes every expired entry and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut data = self.data.write();
        let before = data.len();
        data.retain(|_, entry| !entry.is_expired(now));
        before - data.len()
    }

    /// Number of stored entries, including expired ones not yet evicted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

impl Default for ExpiringCache {
    fn default() -> Self {
        Self::new()
    }
}
