//! HTTP Basic credential verification for the write endpoint.

use axum::http::{header, HeaderMap};
use base64::Engine;

use crate::config::AuthConfig;

/// Checks the `Authorization` header against the configured admin
/// credentials. Both fields are compared in constant time so a probe can't
/// learn the username and password separately.
pub fn authorize(headers: &HeaderMap, auth: &AuthConfig) -> bool {
    let Some((username, password)) = parse_basic(headers) else {
        return false;
    };

    let user_ok = constant_time_eq(username.as_bytes(), auth.username.as_bytes());
    let pass_ok = constant_time_eq(password.as_bytes(), auth.password.as_bytes());
    user_ok && pass_ok
}

/// Extracts `(username, password)` from a `Basic` authorization header.
fn parse_basic(headers: &HeaderMap) -> Option<(String, String)> {
    let auth_str = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let encoded = auth_str.strip_prefix("Basic ")?;
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .ok()?;
    let decoded_str = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded_str.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

/// Constant-time equality; the loop runs over every byte regardless of
/// where the first mismatch sits.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
