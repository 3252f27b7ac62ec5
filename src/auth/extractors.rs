use crate::auth::claims::TokenClaims;
use crate::error::OrgAuthError;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Verified claims for the current request.
///
/// Only available on routes behind a [`GuardChain`](crate::auth::GuardChain).
/// Using it elsewhere is a wiring mistake and fails with a 500.
///
/// ```rust,ignore
/// async fn whoami(AuthClaims(claims): AuthClaims) -> String {
///     claims.user_id
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthClaims(pub TokenClaims);

impl<S> FromRequestParts<S> for AuthClaims
where
    S: Send + Sync,
{
    type Rejection = OrgAuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TokenClaims>()
            .cloned()
            .map(AuthClaims)
            .ok_or_else(|| {
                OrgAuthError::internal("Token claims not found in request extensions; is the route guarded?")
            })
    }
}
