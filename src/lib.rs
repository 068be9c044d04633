//! Access layer for the WeChat platform APIs.
//!
//! [`Platform`] wires the pieces together for one application:
//!
//! - a [`RequestExecutor`] that sends every call and classifies failures,
//! - a [`TokenManager`] caching the application's access token,
//! - a [`PayloadCipher`] for mini-program encrypted payloads,
//! - an [`OAuthClient`] for web OAuth and mini-program session exchanges.
//!
//! ```no_run
//! # async fn run() -> weapi::Result<()> {
//! let platform = weapi::Platform::new(weapi::Config::new("wx123", "secret"))?;
//! let url = platform.api_url("/cgi-bin/get_api_domain_ip").await?;
//! let ips: serde_json::Value = platform.executor().get(&url).await?;
//! # let _ = ips;
//! # Ok(())
//! # }
//! ```

pub mod logging;

use std::{path::Path, sync::Arc};

pub use logging::{build_filter, init_tracing};
pub use weapi_auth::{OAuthClient, PlatformTokenSource, Session, TokenManager, WebAccessToken};
pub use weapi_client::{BodyMap, BodyValue, FilePart, RequestExecutor, Scalar, endpoint};
pub use weapi_config::{CacheConfig, Config, HttpConfig, LogConfig, TokenFlow};
pub use weapi_crypto::{PayloadCipher, PhoneInfo, UserInfo, Watermark, verify_signature};
pub use weapi_store::ExpiringCache;
pub use weapi_types::{AccessToken, Result, Subsystem, TokenSource, WeError};

/// One application's view of the platform.
pub struct Platform {
    config: Config,
    executor: RequestExecutor,
    tokens: TokenManager,
    cipher: PayloadCipher,
    oauth: OAuthClient,
}

impl Platform {
    /// Builds a platform with its own cache, swept per `config.cache`.
    ///
    /// # Errors
    ///
    /// Returns [`WeError::Config`] if the configuration is invalid or the
    /// HTTP client cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        let cache = ExpiringCache::shared(config.cache.sweep_interval());
        Self::with_cache(config, cache)
    }

    /// Builds a platform on a shared cache. Platforms for the same app id
    /// then share one cached access token.
    ///
    /// # Errors
    ///
    /// See [`Platform::new`].
    pub fn with_cache(config: Config, cache: Arc<ExpiringCache>) -> Result<Self> {
        config.validate()?;
        let executor = RequestExecutor::from_config(&config.http)?;
        let source = PlatformTokenSource::from_config(&config, executor.clone());
        let tokens = TokenManager::new(cache, Arc::new(source));
        let cipher = PayloadCipher::new(config.app_id.clone());
        let oauth = OAuthClient::new(
            executor.clone(),
            config.http.base_url.clone(),
            config.app_id.clone(),
            config.app_secret.clone(),
        );
        tracing::debug!(app_id = %config.app_id, flow = ?config.token_flow, "platform initialised");
        Ok(Self {
            config,
            executor,
            tokens,
            cipher,
            oauth,
        })
    }

    /// Loads configuration from a YAML or JSON file and builds a platform.
    ///
    /// # Errors
    ///
    /// Returns [`WeError::Config`] if the file cannot be read or parsed, or
    /// see [`Platform::new`].
    pub fn from_file(path: &Path) -> Result<Self> {
        let config = Config::from_file(path)
            .map_err(|e| WeError::Config(format!("{}: {e}", path.display())))?;
        Self::new(config)
    }

    /// A valid access token, acquired on a cache miss.
    ///
    /// # Errors
    ///
    /// Propagates the acquisition error.
    pub async fn access_token(&self) -> Result<String> {
        self.tokens.access_token().await
    }

    /// `{base_url}{path}?access_token=…` for an authenticated endpoint.
    ///
    /// # Errors
    ///
    /// Propagates the acquisition error.
    pub async fn api_url(&self, path: &str) -> Result<String> {
        let token = self.access_token().await?;
        endpoint(
            &self.config.http.base_url,
            path,
            &[("access_token", token.as_str())],
        )
    }

    #[must_use]
    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    #[must_use]
    pub fn cipher(&self) -> &PayloadCipher {
        &self.cipher
    }

    #[must_use]
    pub fn oauth(&self) -> &OAuthClient {
        &self.oauth
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}
