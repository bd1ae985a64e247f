use mople_domain::constants::BEARER_SCHEME;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};

/// `Bearer <token>` header value, or `None` when the token is blank or not a
/// valid header value.
#[must_use]
pub fn bearer_header_value(token: &str) -> Option<HeaderValue> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    let mut value = HeaderValue::from_str(&format!("{BEARER_SCHEME} {token}")).ok()?;
    value.set_sensitive(true);
    Some(value)
}

/// Token carried by the `Authorization` header, if it uses the bearer scheme.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
