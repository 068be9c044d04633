//! In-process storage for short-lived values such as access tokens.
//!
//! Provides an expiring key/value cache with an optional background sweep.

pub mod memory;

pub use memory::ExpiringCache;
