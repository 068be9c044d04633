//! Per-call correlation identifiers.

use rand::Rng as _;
use rand::distributions::Alphanumeric;
use weapi_types::unix_now;

/// Header carrying the correlation id on every outbound call.
pub const REQUEST_ID_HEADER: &str = "Request-ID";

const RANDOM_LEN: usize = 21;

/// Generate `{21 random alphanumerics}-{unix seconds}`.
#[must_use]
pub fn generate() -> String {
    let random: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RANDOM_LEN)
        .map(char::from)
        .collect();
    format!("{random}-{}", unix_now())
}
