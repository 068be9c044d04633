//! Core types and traits for the weapi workspace.
//!
//! This crate defines the shared abstractions used by every layer of the
//! platform access stack: the error taxonomy, the response envelope, access
//! token representation, the business error-code catalog, and the async
//! traits the other crates implement.

pub mod codes;
pub mod envelope;
pub mod error;
pub mod token;
pub mod traits;

pub use codes::Subsystem;
pub use envelope::ResponseEnvelope;
pub use error::{Result, WeError};
pub use token::{AccessToken, TokenGrant, TokenState, unix_now};
pub use traits::TokenSource;
