//! User-facing code exchanges.
//!
//! - Web OAuth (official accounts and the open platform): the authorize URL,
//!   `code` → [`WebAccessToken`], and refresh-token renewal.
//! - Mini programs: `js_code` → [`Session`], whose `session_key` decrypts
//!   client payloads.
use serde::{Deserialize, Serialize};
use weapi_client::{RequestExecutor, endpoint};
use weapi_types::{Result, unix_now};

pub const WEB_TOKEN_PATH: &str = "/sns/oauth2/access_token";
pub const WEB_REFRESH_PATH: &str = "/sns/oauth2/refresh_token";
pub const SESSION_PATH: &str = "/sns/jscode2session";
pub const AUTHORIZE_URL: &str = "https://open.weixin.qq.com/connect/oauth2/authorize";
pub const DEFAULT_SCOPE: &str = "snsapi_base";

/// Web OAuth token. Only valid for the `sns/*` endpoints, not the platform APIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebAccessToken {
    pub access_token: String,
    pub expires_in: u64,
    /// Unix seconds; filled in locally from `expires_in`.
    #[serde(default)]
    pub expires_at: u64,
    #[serde(default)]
    pub refresh_token: String,
    pub openid: String,
    #[serde(default)]
    pub scope: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unionid: Option<String>,
}

/// Mini-program login session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub openid: String,
    pub session_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unionid: Option<String>,
}

#[must_use]
pub fn build_exchange_params(app_id: &str, app_secret: &str, code: &str) -> Vec<(String, String)> {
    vec![
        ("appid".into(), app_id.into()),
        ("secret".into(), app_secret.into()),
        ("code".into(), code.into()),
        ("grant_type".into(), "authorization_code".into()),
    ]
}

#[must_use]
pub fn build_refresh_params(app_id: &str, refresh_token: &str) -> Vec<(String, String)> {
    vec![
        ("grant_type".into(), "refresh_token".into()),
        ("appid".into(), app_id.into()),
        ("refresh_token".into(), refresh_token.into()),
    ]
}

#[must_use]
pub fn build_session_params(app_id: &str, app_secret: &str, js_code: &str) -> Vec<(String, String)> {
    vec![
        ("appid".into(), app_id.into()),
        ("secret".into(), app_secret.into()),
        ("js_code".into(), js_code.into()),
        ("grant_type".into(), "authorization_code".into()),
    ]
}

pub struct OAuthClient {
    executor: RequestExecutor,
    base_url: String,
    app_id: String,
    app_secret: String,
}

impl OAuthClient {
    #[must_use]
    pub fn new(
        executor: RequestExecutor,
        base_url: impl Into<String>,
        app_id: impl Into<String>,
        app_secret: impl Into<String>,
    ) -> Self {
        Self {
            executor,
            base_url: base_url.into(),
            app_id: app_id.into(),
            app_secret: app_secret.into(),
        }
    }

    /// Browser URL that starts web authorization. An empty `scope` means
    /// `snsapi_base`.
    ///
    /// # Errors
    ///
    /// Returns [`weapi_types::WeError::Validation`] if the query cannot be encoded.
    pub fn authorize_url(&self, redirect_uri: &str, state: &str, scope: &str) -> Result<String> {
        let scope = if scope.is_empty() { DEFAULT_SCOPE } else { scope };
        let url = endpoint(
            AUTHORIZE_URL,
            "",
            &[
                ("appid", self.app_id.as_str()),
                ("redirect_uri", redirect_uri),
                ("response_type", "code"),
                ("scope", scope),
                ("state", state),
                ("lang", "zh_CN"),
            ],
        )?;
        Ok(format!("{url}#wechat_redirect"))
    }

    /// Exchange a web authorization `code` for a [`WebAccessToken`].
    ///
    /// # Errors
    ///
    /// Returns the executor's error taxonomy; an expired or reused code is a
    /// [`weapi_types::WeError::Business`].
    pub async fn exchange_code(&self, code: &str) -> Result<WebAccessToken> {
        let url = endpoint(
            &self.base_url,
            WEB_TOKEN_PATH,
            &build_exchange_params(&self.app_id, &self.app_secret, code),
        )?;
        self.fetch_web_token(&url).await
    }

    /// Renew a web token with its `refresh_token`.
    ///
    /// # Errors
    ///
    /// See [`exchange_code`](Self::exchange_code).
    pub async fn refresh_web_token(&self, refresh_token: &str) -> Result<WebAccessToken> {
        let url = endpoint(
            &self.base_url,
            WEB_REFRESH_PATH,
            &build_refresh_params(&self.app_id, refresh_token),
        )?;
        self.fetch_web_token(&url).await
    }

    /// Exchange a mini-program login `js_code` for a [`Session`].
    ///
    /// # Errors
    ///
    /// See [`exchange_code`](Self::exchange_code).
    pub async fn code_to_session(&self, js_code: &str) -> Result<Session> {
        let url = endpoint(
            &self.base_url,
            SESSION_PATH,
            &build_session_params(&self.app_id, &self.app_secret, js_code),
        )?;
        let session: Session = self.executor.get(&url).await?;
        tracing::debug!(app_id = %self.app_id, "mini program session established");
        Ok(session)
    }

    async fn fetch_web_token(&self, url: &str) -> Result<WebAccessToken> {
        let mut token: WebAccessToken = self.executor.get(url).await?;
        token.expires_at = unix_now().saturating_add(token.expires_in);
        tracing::debug!(app_id = %self.app_id, scope = %token.scope, "web access token issued");
        Ok(token)
    }
}
