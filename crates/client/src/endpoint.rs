//! Endpoint URL templates.

use serde::Serialize;
use weapi_types::{Result, WeError};

/// Joins `base` and `path` and appends `params` as a url-encoded query.
///
/// # Errors
///
/// Returns [`WeError::Validation`] if `params` cannot be encoded as a query string.
pub fn endpoint<P: Serialize + ?Sized>(base: &str, path: &str, params: &P) -> Result<String> {
    let query = serde_urlencoded::to_string(params)
        .map_err(|e| WeError::Validation(format!("query for {path}: {e}")))?;
    let base = base.trim_end_matches('/');
    if query.is_empty() {
        Ok(format!("{base}{path}"))
    } else {
        Ok(format!("{base}{path}?{query}"))
    }
}

/// Strips the query string, which carries credentials and tokens, for logging.
#[must_use]
pub fn redact(uri: &str) -> &str {
    uri.split_once('?').map_or(uri, |(path, _)| path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_with_params() {
        let url = endpoint(
            "https://api.weixin.qq.com/",
            "/cgi-bin/token",
            &[
                ("grant_type", "client_credential"),
                ("appid", "wx123"),
                ("secret", "a&b"),
            ],
        )
        .unwrap();
        assert_eq!(
            url,
            "https://api.weixin.qq.com/cgi-bin/token?grant_type=client_credential&appid=wx123&secret=a%26b"
        );
    }

    #[test]
    fn test_endpoint_without_params() {
        let empty: [(&str, &str); 0] = [];
        let url = endpoint("http://127.0.0.1:1", "/cgi-bin/stable_token", &empty).unwrap();
        assert_eq!(url, "http://127.0.0.1:1/cgi-bin/stable_token");
    }

    #[test]
    fn test_redact() {
        assert_eq!(
            redact("https://api.weixin.qq.com/cgi-bin/token?appid=wx&secret=s"),
            "https://api.weixin.qq.com/cgi-bin/token"
        );
        assert_eq!(redact("/plain"), "/plain");
    }
}
