//! Async traits shared across weapi crates.
//!
//! Cross-crate seams live here so that higher layers depend only on
//! `weapi-types`, not on each other.

use crate::AccessToken;
use async_trait::async_trait;

pub use crate::error::Result;

/// Acquires a fresh access token from the platform.
///
/// Implementations perform exactly one upstream call per invocation and never
/// consult a cache; caching is the caller's concern.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Application id the issued token belongs to.
    fn app_id(&self) -> &str;

    /// Acquire a new token. `force_refresh` asks the platform to invalidate
    /// the previous one where the flow supports it.
    async fn fetch(&self, force_refresh: bool) -> Result<AccessToken>;
}
