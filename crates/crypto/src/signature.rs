//! Push-callback authentication.
use sha1::{Digest, Sha1};

/// Checks that a callback came from the platform: `signature` must be the
/// lowercase hex SHA-1 of `token`, `timestamp` and `nonce` sorted and
/// concatenated.
#[must_use]
pub fn verify_signature(token: &str, signature: &str, timestamp: &str, nonce: &str) -> bool {
    let mut parts = [token, timestamp, nonce];
    parts.sort_unstable();

    let mut hasher = Sha1::new();
    for part in parts {
        hasher.update(part.as_bytes());
    }
    hex::encode(hasher.finalize()) == signature
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(token: &str, timestamp: &str, nonce: &str) -> String {
        let mut parts = [token, timestamp, nonce];
        parts.sort_unstable();
        hex::encode(Sha1::digest(parts.concat().as_bytes()))
    }

    #[test]
    fn test_known_digest() {
        // sorted concatenation is "abc"
        assert!(verify_signature(
            "b",
            "a9993e364706816aba3e25717850c26c9cd0d89d",
            "c",
            "a"
        ));
    }

    #[test]
    fn test_accepts_valid() {
        let sig = sign("weapi", "1714000000", "372856221");
        assert!(verify_signature("weapi", &sig, "1714000000", "372856221"));
    }

    #[test]
    fn test_rejects_tampered() {
        let sig = sign("weapi", "1714000000", "372856221");
        assert!(!verify_signature("weapi", &sig, "1714000001", "372856221"));
        assert!(!verify_signature("other", &sig, "1714000000", "372856221"));
        assert!(!verify_signature("weapi", &sig.to_uppercase(), "1714000000", "372856221"));
    }

    #[test]
    fn test_order_independent_of_arguments() {
        // Sorting makes the digest depend on the set of values only.
        let sig = sign("b", "a", "c");
        assert!(verify_signature("b", &sig, "a", "c"));
        assert!(verify_signature("a", &sig, "c", "b"));
    }
}
