//! Configuration loading for the weapi platform client.
//!
//! Uses figment to merge YAML or JSON sources over sensible defaults.
//! Credentials may equally be supplied programmatically via [`Config::new`].

pub mod schema;

pub use schema::{CacheConfig, Config, HttpConfig, LogConfig, TokenFlow};
