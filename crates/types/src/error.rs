//! Unified error type for the weapi workspace.

use thiserror::Error;

/// Enumerates every failure a platform call or payload operation can produce.
///
/// Callers branch on the variant; no variant ever accompanies a partial result.
#[derive(Debug, Error)]
pub enum WeError {
    /// Network, DNS or TLS failure before a response was received.
    #[error("transport error: {0}")]
    Transport(String),

    /// The platform answered with an HTTP status other than 200.
    #[error("unexpected http status: {status}")]
    HttpStatus { status: u16 },

    /// The response body could not be decoded into the requested shape.
    #[error("decode error: {reason}, body={raw}")]
    Decode { reason: String, raw: String },

    /// The platform reported a business failure (`errcode != 0`).
    #[error("business error: code={code}, message={message}")]
    Business { code: i64, message: String },

    /// A precondition on caller-supplied data failed (crypto input, origin check, body encoding).
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration is missing or inconsistent.
    #[error("configuration error: {0}")]
    Config(String),
}

// ── Feature-gated From impls ──────────────────────────────────────────────────

#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for WeError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.without_url().to_string())
    }
}

impl WeError {
    /// Builds a [`WeError::Decode`] from a serde failure and the offending body.
    #[must_use]
    pub fn decode(err: &serde_json::Error, raw: &[u8]) -> Self {
        Self::Decode {
            reason: err.to_string(),
            raw: String::from_utf8_lossy(raw).into_owned(),
        }
    }

    /// Prefixes a [`WeError::Transport`] message with the operation that
    /// failed, e.g. `GET /cgi-bin/token`. Other variants pass through.
    #[must_use]
    pub fn context(self, operation: &str) -> Self {
        match self {
            Self::Transport(msg) => Self::Transport(format!("{operation}: {msg}")),
            other => other,
        }
    }

    /// Returns the platform business code if this is a [`WeError::Business`].
    #[must_use]
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Business { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, WeError>;
