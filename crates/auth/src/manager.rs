//! Cached access-token lifecycle for one application.
//!
//! Responsibilities:
//! - Serve the cached token while it is valid.
//! - Treat a token past its own `expires_at` as a miss, even if the cache
//!   entry is still alive (legacy tokens expire 200 s early).
//! - Acquire through the [`TokenSource`] on a miss and cache the result under
//!   `"{app_id}_access_token"` for `expires_in` seconds.
//!
//! Concurrent misses are not coalesced: each caller acquires on its own and
//! the last write wins.
use std::{sync::Arc, time::Duration};
use weapi_store::ExpiringCache;
use weapi_types::{AccessToken, Result, TokenSource, TokenState, WeError};

pub struct TokenManager {
    cache: Arc<ExpiringCache>,
    source: Arc<dyn TokenSource>,
}

impl TokenManager {
    pub fn new(cache: Arc<ExpiringCache>, source: Arc<dyn TokenSource>) -> Self {
        Self { cache, source }
    }

    #[must_use]
    pub fn app_id(&self) -> &str {
        self.source.app_id()
    }

    /// Cache key holding this application's token.
    #[must_use]
    pub fn cache_key(&self) -> String {
        format!("{}_access_token", self.source.app_id())
    }

    /// Return a valid token, acquiring a new one on a cache miss.
    ///
    /// # Errors
    ///
    /// Propagates the acquisition error (transport, status, business or decode).
    /// Nothing is cached on failure.
    pub async fn get_token(&self) -> Result<AccessToken> {
        if let Some(token) = self.cached() {
            tracing::debug!(app_id = %self.app_id(), "access token cache hit");
            return Ok(token);
        }
        self.acquire(false).await
    }

    /// Shorthand for the token string of [`get_token`](Self::get_token).
    ///
    /// # Errors
    ///
    /// See [`get_token`](Self::get_token).
    pub async fn access_token(&self) -> Result<String> {
        self.get_token().await.map(|t| t.access_token)
    }

    /// Acquire a new token regardless of the cache, asking the platform to
    /// invalidate the previous one where the flow supports it.
    ///
    /// # Errors
    ///
    /// See [`get_token`](Self::get_token).
    pub async fn force_refresh(&self) -> Result<AccessToken> {
        self.acquire(true).await
    }

    /// Drop the cached token so the next call acquires a new one.
    pub fn invalidate(&self) {
        if self.cache.remove(&self.cache_key()).is_some() {
            tracing::debug!(app_id = %self.app_id(), "access token invalidated");
        }
    }

    /// Peek at the cached token without acquiring. Expired tokens read as `None`.
    #[must_use]
    pub fn cached(&self) -> Option<AccessToken> {
        let key = self.cache_key();
        let raw = self.cache.get(&key)?;
        let token = match serde_json::from_str::<AccessToken>(&raw) {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(app_id = %self.app_id(), error = %e, "discarding unreadable cached token");
                self.cache.remove(&key);
                return None;
            }
        };
        match token.state() {
            TokenState::Valid => Some(token),
            TokenState::Expired => None,
        }
    }

    async fn acquire(&self, force_refresh: bool) -> Result<AccessToken> {
        let token = self.source.fetch(force_refresh).await?;
        let json = serde_json::to_string(&token).map_err(|e| WeError::decode(&e, &[]))?;
        self.cache.set(
            self.cache_key(),
            json,
            Duration::from_secs(token.expires_in),
        );
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use weapi_types::{TokenGrant, unix_now};

    struct FakeSource {
        calls: AtomicUsize,
        last_force: AtomicBool,
        expires_in: u64,
        margin: u64,
        delay: Duration,
        fail: bool,
    }

    impl FakeSource {
        fn new(expires_in: u64) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                last_force: AtomicBool::new(false),
                expires_in,
                margin: 0,
                delay: Duration::ZERO,
                fail: false,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TokenSource for FakeSource {
        fn app_id(&self) -> &str {
            "wx_test"
        }

        async fn fetch(&self, force_refresh: bool) -> Result<AccessToken> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            self.last_force.store(force_refresh, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.fail {
                return Err(WeError::Business {
                    code: 40001,
                    message: "invalid credential".into(),
                });
            }
            Ok(AccessToken {
                access_token: format!("token-{n}"),
                expires_in: self.expires_in,
                expires_at: unix_now()
                    .saturating_add(self.expires_in)
                    .saturating_sub(self.margin),
            })
        }
    }

    fn make_manager(source: FakeSource) -> (TokenManager, Arc<FakeSource>, Arc<ExpiringCache>) {
        let source = Arc::new(source);
        let cache = Arc::new(ExpiringCache::new());
        let manager = TokenManager::new(
            Arc::clone(&cache),
            Arc::clone(&source) as Arc<dyn TokenSource>,
        );
        (manager, source, cache)
    }

    #[tokio::test]
    async fn test_second_call_hits_cache() {
        let (m, src, _) = make_manager(FakeSource::new(7200));
        let first = m.get_token().await.unwrap();
        let second = m.get_token().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(src.calls(), 1);
        assert_eq!(m.access_token().await.unwrap(), "token-1");
    }

    #[tokio::test]
    async fn test_cache_key_and_contents() {
        let (m, _, cache) = make_manager(FakeSource::new(7200));
        let token = m.get_token().await.unwrap();
        assert_eq!(m.cache_key(), "wx_test_access_token");
        let raw = cache.get("wx_test_access_token").unwrap();
        let stored: AccessToken = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored, token);
    }

    #[tokio::test]
    async fn test_concurrent_misses_both_acquire() {
        let mut src = FakeSource::new(7200);
        src.delay = Duration::from_millis(50);
        let (m, src, _) = make_manager(src);

        let (a, b) = tokio::join!(m.get_token(), m.get_token());
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!(src.calls(), 2);
        assert_eq!(a.state(), TokenState::Valid);
        assert_eq!(b.state(), TokenState::Valid);

        let cached = m.cached().unwrap();
        assert!(cached == a || cached == b);
    }

    #[tokio::test]
    async fn test_expired_cached_token_is_a_miss() {
        // Margin larger than the lifetime: the cache entry lives, the token does not.
        let mut src = FakeSource::new(100);
        src.margin = 1000;
        let (m, src, cache) = make_manager(src);

        m.get_token().await.unwrap();
        assert_eq!(cache.len(), 1);
        assert!(m.cached().is_none());

        m.get_token().await.unwrap();
        assert_eq!(src.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_ttl_expiry_triggers_reacquire() {
        let (m, src, _) = make_manager(FakeSource::new(10));
        m.get_token().await.unwrap();
        tokio::time::advance(Duration::from_secs(5)).await;
        m.get_token().await.unwrap();
        assert_eq!(src.calls(), 1);

        tokio::time::advance(Duration::from_secs(6)).await;
        assert_eq!(m.get_token().await.unwrap().access_token, "token-2");
        assert_eq!(src.calls(), 2);
    }

    #[tokio::test]
    async fn test_force_refresh_bypasses_cache() {
        let (m, src, _) = make_manager(FakeSource::new(7200));
        m.get_token().await.unwrap();
        let refreshed = m.force_refresh().await.unwrap();
        assert_eq!(refreshed.access_token, "token-2");
        assert!(src.last_force.load(Ordering::SeqCst));
        assert_eq!(m.cached().unwrap().access_token, "token-2");
    }

    struct LongLivedSource;

    #[async_trait]
    impl TokenSource for LongLivedSource {
        fn app_id(&self) -> &str {
            "wx_long"
        }

        async fn fetch(&self, _force_refresh: bool) -> Result<AccessToken> {
            TokenGrant {
                access_token: "forever".into(),
                expires_in: u64::MAX,
                ..TokenGrant::default()
            }
            .into_token(unix_now(), 200)
        }
    }

    #[tokio::test]
    async fn test_huge_expires_in_is_cached_without_overflow() {
        let cache = Arc::new(ExpiringCache::new());
        let m = TokenManager::new(Arc::clone(&cache), Arc::new(LongLivedSource));
        assert_eq!(m.access_token().await.unwrap(), "forever");
        assert_eq!(m.cached().unwrap().access_token, "forever");
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_invalidate() {
        let (m, src, _) = make_manager(FakeSource::new(7200));
        m.get_token().await.unwrap();
        m.invalidate();
        assert!(m.cached().is_none());
        m.get_token().await.unwrap();
        assert_eq!(src.calls(), 2);
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let mut src = FakeSource::new(7200);
        src.fail = true;
        let (m, _, cache) = make_manager(src);
        let err = m.get_token().await.unwrap_err();
        assert_eq!(err.code(), Some(40001));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_entry_discarded() {
        let (m, src, cache) = make_manager(FakeSource::new(7200));
        cache.set("wx_test_access_token", "not json", Duration::from_secs(60));
        assert!(m.cached().is_none());
        assert!(cache.is_empty());
        m.get_token().await.unwrap();
        assert_eq!(src.calls(), 1);
    }
}
