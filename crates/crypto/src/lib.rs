//! Client payload decryption and server signature checks.
//!
//! Mini programs hand the backend AES-128-CBC encrypted blobs (user profile,
//! phone number) keyed by the login `session_key`. [`PayloadCipher`] decrypts
//! them and verifies the embedded watermark names this application.

pub mod cipher;
pub mod records;
pub mod signature;

pub use cipher::PayloadCipher;
pub use records::{PhoneInfo, UserInfo, Watermark};
pub use signature::verify_signature;
