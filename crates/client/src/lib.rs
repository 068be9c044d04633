//! HTTP request pipeline for the platform APIs.
//!
//! [`BodyMap`] builds request bodies, [`RequestExecutor`] sends them and
//! classifies every failure into a [`weapi_types::WeError`] variant.

pub mod body;
pub mod endpoint;
pub mod executor;
pub mod request_id;

pub use body::{BodyMap, BodyValue, FilePart, Scalar};
pub use endpoint::{endpoint, redact};
pub use executor::RequestExecutor;
pub use request_id::REQUEST_ID_HEADER;
