use axum::http::{HeaderMap, header::AUTHORIZATION};

/// Pulls the bearer credential out of request headers.
pub struct TokenExtractor;

impl TokenExtractor {
    /// `Authorization: Bearer <token>` -> `<token>`.
    ///
    /// Any other scheme, an empty token, or a missing header yields `None`.
    pub fn from_headers(headers: &HeaderMap) -> Option<&str> {
        let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
        extract_bearer(value)
    }
}

/// Scheme match is exact: `bearer x` and `Bearer  x` are not accepted.
pub fn extract_bearer(header_value: &str) -> Option<&str> {
    header_value
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
}
