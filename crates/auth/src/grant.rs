//! Access-token endpoints: the legacy `GET /cgi-bin/token` flow and the
//! stable `POST /cgi-bin/stable_token` flow.
//!
//! Legacy tokens are treated as expired 200 s before the platform says so;
//! stable tokens are used for their full lifetime.
use weapi_client::BodyMap;

pub const LEGACY_TOKEN_PATH: &str = "/cgi-bin/token";
pub const STABLE_TOKEN_PATH: &str = "/cgi-bin/stable_token";
pub const GRANT_TYPE: &str = "client_credential";
pub const LEGACY_EXPIRY_MARGIN_SECS: u64 = 200;
pub const STABLE_EXPIRY_MARGIN_SECS: u64 = 0;

#[must_use]
pub fn build_legacy_params(app_id: &str, app_secret: &str) -> Vec<(String, String)> {
    vec![
        ("grant_type".into(), GRANT_TYPE.into()),
        ("appid".into(), app_id.into()),
        ("secret".into(), app_secret.into()),
    ]
}

#[must_use]
pub fn build_stable_body(app_id: &str, app_secret: &str, force_refresh: bool) -> BodyMap {
    let mut body = BodyMap::new();
    body.set("grant_type", GRANT_TYPE)
        .set("appid", app_id)
        .set("secret", app_secret)
        .set("force_refresh", force_refresh);
    body
}
