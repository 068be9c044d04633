use serde::{Deserialize, Serialize};
use std::time::Duration;
use weapi_types::WeError;

/// Which credential endpoint issues access tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenFlow {
    /// `GET /cgi-bin/token`; cached tokens expire 200 s early.
    #[default]
    Legacy,
    /// `POST /cgi-bin/stable_token`; cached tokens live for the full `expires_in`.
    Stable,
}

fn default_base_url() -> String {
    "https://api.weixin.qq.com".to_string()
}

fn default_user_agent() -> String {
    concat!("weapi/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Outbound HTTP settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Platform API origin (defaults to `https://api.weixin.qq.com`).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout. Absent means the caller's cancellation is the only limit.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
            user_agent: default_user_agent(),
        }
    }
}

impl HttpConfig {
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// In-process cache settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Background sweep interval. Absent or `0` disables the sweep.
    #[serde(default)]
    pub sweep_interval_secs: Option<u64>,
}

impl CacheConfig {
    #[must_use]
    pub fn sweep_interval(&self) -> Option<Duration> {
        self.sweep_interval_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Tracing output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Filter directive, e.g. `info` or `weapi_client=debug,info`.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub app_id: String,
    #[serde(default)]
    pub app_secret: String,
    #[serde(default)]
    pub token_flow: TokenFlow,
    /// Sent as `force_refresh` on stable-flow acquisitions.
    #[serde(default)]
    pub force_refresh: bool,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    /// Creates a configuration with the given credentials and defaults elsewhere.
    pub fn new(app_id: impl Into<String>, app_secret: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            app_secret: app_secret.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_token_flow(mut self, flow: TokenFlow) -> Self {
        self.token_flow = flow;
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.http.base_url = base_url.into();
        self
    }

    /// Checks that the credentials needed for every call are present.
    ///
    /// # Errors
    ///
    /// Returns [`WeError::Config`] if `app_id`, `app_secret` or `http.base_url` is empty.
    pub fn validate(&self) -> Result<(), WeError> {
        if self.app_id.trim().is_empty() {
            return Err(WeError::Config("app_id must not be empty".into()));
        }
        if self.app_secret.trim().is_empty() {
            return Err(WeError::Config("app_secret must not be empty".into()));
        }
        if self.http.base_url.trim().is_empty() {
            return Err(WeError::Config("http.base_url must not be empty".into()));
        }
        Ok(())
    }

    /// Parses configuration from a YAML string, merged with defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`figment::Error`] if the YAML is invalid or extraction fails.
    #[allow(clippy::result_large_err)]
    pub fn from_yaml(yaml: &str) -> Result<Self, figment::Error> {
        use figment::{
            Figment,
            providers::{Format as _, Serialized, Yaml},
        };
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Yaml::string(yaml))
            .extract()
    }

    /// Parses configuration from a JSON string, merged with defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`figment::Error`] if the JSON is invalid or extraction fails.
    #[allow(clippy::result_large_err)]
    pub fn from_json(json: &str) -> Result<Self, figment::Error> {
        use figment::{
            Figment,
            providers::{Format as _, Json, Serialized},
        };
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Json::string(json))
            .extract()
    }

    /// Loads configuration from a file path, merged with defaults.
    ///
    /// Files ending in `.json` are read as JSON, anything else as YAML.
    ///
    /// # Errors
    ///
    /// Returns a [`figment::Error`] if the file cannot be read or parsed.
    #[allow(clippy::result_large_err)]
    pub fn from_file(path: &std::path::Path) -> Result<Self, figment::Error> {
        use figment::{
            Figment,
            providers::{Format as _, Json, Serialized, Yaml},
        };
        let base = Figment::from(Serialized::defaults(Config::default()));
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            base.merge(Json::file(path)).extract()
        } else {
            base.merge(Yaml::file(path)).extract()
        }
    }
}
