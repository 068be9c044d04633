//! Access token representation and expiry logic.

use crate::{Result, WeError};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Current wall-clock time in unix seconds.
#[must_use]
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_secs()
}

/// Raw body returned by both credential endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenGrant {
    #[serde(default)]
    pub access_token: String,
    /// Lifetime in seconds, currently at most 7200.
    #[serde(default)]
    pub expires_in: u64,
    #[serde(default)]
    pub errcode: i64,
    #[serde(default)]
    pub errmsg: String,
}

impl TokenGrant {
    /// Turns a successful grant into an [`AccessToken`] expiring at
    /// `now + expires_in - margin_secs`, saturating at both ends.
    ///
    /// # Errors
    ///
    /// Returns [`WeError::Business`] if the grant carries a non-zero `errcode`,
    /// or [`WeError::Decode`] if it has no `access_token`.
    pub fn into_token(self, now: u64, margin_secs: u64) -> Result<AccessToken> {
        if self.errcode != 0 {
            return Err(WeError::Business {
                code: self.errcode,
                message: self.errmsg,
            });
        }
        if self.access_token.is_empty() {
            return Err(WeError::Decode {
                reason: "missing access_token".into(),
                raw: String::new(),
            });
        }
        Ok(AccessToken {
            access_token: self.access_token,
            expires_in: self.expires_in,
            expires_at: now
                .saturating_add(self.expires_in)
                .saturating_sub(margin_secs),
        })
    }
}

/// A platform access token. Superseded, never mutated, on refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub expires_in: u64,
    /// Unix seconds after which the token must not be used.
    pub expires_at: u64,
}

impl AccessToken {
    #[must_use]
    pub fn is_expired_at(&self, now: u64) -> bool {
        now >= self.expires_at
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(unix_now())
    }

    #[must_use]
    pub fn state(&self) -> TokenState {
        if self.is_expired() {
            TokenState::Expired
        } else {
            TokenState::Valid
        }
    }
}

/// Describes the usability state of an [`AccessToken`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    Valid,
    /// Past `expires_at`; a new acquisition is required.
    Expired,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant(expires_in: u64) -> TokenGrant {
        TokenGrant {
            access_token: "tok".into(),
            expires_in,
            errcode: 0,
            errmsg: String::new(),
        }
    }

    #[test]
    fn test_margin_applied() {
        let t = grant(7200).into_token(1_000_000, 200).unwrap();
        assert_eq!(t.expires_at, 1_007_000);
        assert_eq!(t.expires_in, 7200);
    }

    #[test]
    fn test_no_margin() {
        let t = grant(7200).into_token(1_000_000, 0).unwrap();
        assert_eq!(t.expires_at, 1_007_200);
    }

    #[test]
    fn test_huge_expires_in_saturates() {
        let t = grant(u64::MAX).into_token(unix_now(), 200).unwrap();
        assert_eq!(t.expires_at, u64::MAX - 200);
        assert_eq!(t.state(), TokenState::Valid);
    }

    #[test]
    fn test_business_error_rejected() {
        let g = TokenGrant {
            errcode: 40125,
            errmsg: "invalid appsecret".into(),
            ..TokenGrant::default()
        };
        let err = g.into_token(0, 0).unwrap_err();
        assert!(matches!(err, WeError::Business { code: 40125, .. }));
    }

    #[test]
    fn test_empty_token_rejected() {
        let err = TokenGrant::default().into_token(0, 0).unwrap_err();
        assert!(matches!(err, WeError::Decode { .. }));
    }

    #[test]
    fn test_expiry_boundary() {
        let t = grant(100).into_token(1000, 0).unwrap();
        assert!(!t.is_expired_at(1099));
        assert!(t.is_expired_at(1100));
    }

    #[test]
    fn test_fresh_token_is_valid() {
        let t = grant(7200).into_token(unix_now(), 200).unwrap();
        assert_eq!(t.state(), TokenState::Valid);
    }

    #[test]
    fn test_past_token_is_expired() {
        let t = grant(10).into_token(unix_now() - 100, 0).unwrap();
        assert_eq!(t.state(), TokenState::Expired);
    }

    #[test]
    fn test_serde_roundtrip() {
        let t = grant(7200).into_token(5, 0).unwrap();
        let json = serde_json::to_string(&t).unwrap();
        let back: AccessToken = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }
}
