//! HTTP-backed [`TokenSource`] for both credential flows.
use crate::grant::{
    LEGACY_EXPIRY_MARGIN_SECS, LEGACY_TOKEN_PATH, STABLE_EXPIRY_MARGIN_SECS, STABLE_TOKEN_PATH,
    build_legacy_params, build_stable_body,
};
use async_trait::async_trait;
use weapi_client::{RequestExecutor, endpoint};
use weapi_config::{Config, TokenFlow};
use weapi_types::{AccessToken, Result, TokenGrant, TokenSource, unix_now};

/// Acquires access tokens from the platform's credential endpoints.
pub struct PlatformTokenSource {
    executor: RequestExecutor,
    base_url: String,
    app_id: String,
    app_secret: String,
    flow: TokenFlow,
    force_refresh: bool,
}

impl PlatformTokenSource {
    #[must_use]
    pub fn new(
        executor: RequestExecutor,
        base_url: impl Into<String>,
        app_id: impl Into<String>,
        app_secret: impl Into<String>,
        flow: TokenFlow,
    ) -> Self {
        Self {
            executor,
            base_url: base_url.into(),
            app_id: app_id.into(),
            app_secret: app_secret.into(),
            flow,
            force_refresh: false,
        }
    }

    /// Builds a source from the credentials, flow and base URL in `config`.
    #[must_use]
    pub fn from_config(config: &Config, executor: RequestExecutor) -> Self {
        Self::new(
            executor,
            config.http.base_url.clone(),
            config.app_id.clone(),
            config.app_secret.clone(),
            config.token_flow,
        )
        .with_force_refresh(config.force_refresh)
    }

    /// Sends `force_refresh = true` on every stable-flow acquisition.
    #[must_use]
    pub fn with_force_refresh(mut self, force_refresh: bool) -> Self {
        self.force_refresh = force_refresh;
        self
    }

    #[must_use]
    pub fn flow(&self) -> TokenFlow {
        self.flow
    }

    async fn fetch_legacy(&self) -> Result<AccessToken> {
        let url = endpoint(
            &self.base_url,
            LEGACY_TOKEN_PATH,
            &build_legacy_params(&self.app_id, &self.app_secret),
        )?;
        let grant: TokenGrant = self.executor.get(&url).await?;
        grant.into_token(unix_now(), LEGACY_EXPIRY_MARGIN_SECS)
    }

    async fn fetch_stable(&self, force_refresh: bool) -> Result<AccessToken> {
        let url = format!(
            "{}{STABLE_TOKEN_PATH}",
            self.base_url.trim_end_matches('/')
        );
        let body = build_stable_body(&self.app_id, &self.app_secret, force_refresh);
        let grant: TokenGrant = self.executor.post(&url, &body).await?;
        grant.into_token(unix_now(), STABLE_EXPIRY_MARGIN_SECS)
    }
}

#[async_trait]
impl TokenSource for PlatformTokenSource {
    fn app_id(&self) -> &str {
        &self.app_id
    }

    /// The legacy endpoint has no force flag; `force_refresh` only affects
    /// the stable flow.
    async fn fetch(&self, force_refresh: bool) -> Result<AccessToken> {
        let token = match self.flow {
            TokenFlow::Legacy => self.fetch_legacy().await?,
            TokenFlow::Stable => self.fetch_stable(force_refresh || self.force_refresh).await?,
        };
        tracing::info!(
            app_id = %self.app_id,
            flow = ?self.flow,
            expires_in = token.expires_in,
            "acquired access token"
        );
        Ok(token)
    }
}
