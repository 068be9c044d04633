//! Credential acquisition and caching for the platform APIs.
//!
//! [`grant`] holds the endpoint shapes for both access-token flows,
//! [`PlatformTokenSource`] performs one acquisition per call, and the
//! [`TokenManager`] caches the result. [`OAuthClient`] covers the user-facing
//! code exchanges (web OAuth and mini-program sessions).

pub mod grant;
pub mod manager;
pub mod oauth;
pub mod source;

pub use manager::TokenManager;
pub use oauth::{OAuthClient, Session, WebAccessToken};
pub use source::PlatformTokenSource;
