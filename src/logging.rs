//! Tracing subscriber setup driven by [`LogConfig`].
use tracing_subscriber::EnvFilter;
use weapi_config::LogConfig;
use weapi_types::{Result, WeError};

/// Parses `config.level` as an `EnvFilter` directive.
///
/// # Errors
///
/// Returns [`WeError::Config`] if the directive is malformed.
pub fn build_filter(config: &LogConfig) -> Result<EnvFilter> {
    EnvFilter::try_new(&config.level)
        .map_err(|e| WeError::Config(format!("invalid log level {:?}: {e}", config.level)))
}

/// Installs a global `fmt` subscriber, JSON lines when `config.json` is set.
///
/// # Errors
///
/// Returns [`WeError::Config`] if the filter is malformed or a global
/// subscriber is already installed.
pub fn init_tracing(config: &LogConfig) -> Result<()> {
    let filter = build_filter(config)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| WeError::Config(format!("failed to install tracing subscriber: {e}")))
}
