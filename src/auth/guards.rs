//! Request guards.
//!
//! A route is protected by a [`GuardChain`]: an ordered list of [`Guard`]s
//! evaluated front to back. The first rejection short-circuits and becomes
//! the response; the handler is never called. When every guard passes, the
//! verified [`TokenClaims`] are placed in the request extensions for the
//! [`AuthClaims`](crate::auth::AuthClaims) extractor.
//!
//! Every chain starts with [`RequireAuthenticated`]; the constructors do not
//! allow building one that doesn't.
//!
//! ```rust,ignore
//! use axum::{Router, middleware, routing::get};
//! use orgauth::auth::{GuardChain, guard_middleware};
//! use orgauth::store::Role;
//!
//! let admins_only = GuardChain::roles(verifier, &[Role::Admin]);
//! let router = Router::new()
//!     .route("/admin", get(handler))
//!     .route_layer(middleware::from_fn_with_state(admins_only, guard_middleware));
//! ```

use crate::auth::claims::TokenClaims;
use crate::auth::jwt::{JwtVerifier, TokenRejection};
use crate::auth::token::TokenExtractor;
use crate::error::{OrgAuthError, Result};
use crate::store::Role;
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::fmt;
use std::sync::Arc;

// =============================================================================
// Guard trait
// =============================================================================

/// What a guard can see while it runs.
pub struct GuardContext<'a> {
    headers: &'a HeaderMap,
    claims: Option<TokenClaims>,
}

impl<'a> GuardContext<'a> {
    pub fn new(headers: &'a HeaderMap) -> Self {
        Self {
            headers,
            claims: None,
        }
    }

    pub fn headers(&self) -> &HeaderMap {
        self.headers
    }

    /// Claims, once an earlier guard has verified the token.
    pub fn claims(&self) -> Option<&TokenClaims> {
        self.claims.as_ref()
    }

    /// Claims for guards that only make sense after authentication.
    pub fn authenticated_claims(&self) -> Result<&TokenClaims> {
        self.claims
            .as_ref()
            .ok_or_else(|| OrgAuthError::internal("Guard evaluated before RequireAuthenticated"))
    }

    pub fn set_claims(&mut self, claims: TokenClaims) {
        self.claims = Some(claims);
    }

    fn into_claims(self) -> Option<TokenClaims> {
        self.claims
    }
}

/// A single access policy.
///
/// Returns `Ok(())` to let the request continue (possibly after enriching
/// the context) or the error that should be sent back instead.
pub trait Guard: Send + Sync {
    fn name(&self) -> &'static str;

    fn evaluate(&self, ctx: &mut GuardContext<'_>) -> Result<()>;
}

// =============================================================================
// Built-in guards
// =============================================================================

/// Requires a valid bearer token and attaches its claims.
#[derive(Clone, Debug)]
pub struct RequireAuthenticated {
    verifier: JwtVerifier,
}

impl RequireAuthenticated {
    pub fn new(verifier: JwtVerifier) -> Self {
        Self { verifier }
    }
}

impl Guard for RequireAuthenticated {
    fn name(&self) -> &'static str {
        "RequireAuthenticated"
    }

    fn evaluate(&self, ctx: &mut GuardContext<'_>) -> Result<()> {
        let verified = TokenExtractor::from_headers(ctx.headers())
            .ok_or(TokenRejection::Missing)
            .and_then(|token| self.verifier.verify(token));

        match verified {
            Ok(claims) => {
                ctx.set_claims(claims);
                Ok(())
            }
            Err(rejection) => {
                tracing::debug!(guard = self.name(), reason = %rejection, "Guard rejected request");
                Err(rejection.into())
            }
        }
    }
}

/// Requires the token to name an organization.
#[derive(Clone, Copy, Debug, Default)]
pub struct RequireOrganization;

impl Guard for RequireOrganization {
    fn name(&self) -> &'static str {
        "RequireOrganization"
    }

    fn evaluate(&self, ctx: &mut GuardContext<'_>) -> Result<()> {
        let claims = ctx.authenticated_claims()?;
        match claims.organization_id.as_deref() {
            Some(org) if !org.is_empty() => Ok(()),
            _ => {
                tracing::debug!(
                    guard = self.name(),
                    user_id = %claims.user_id,
                    "Guard rejected request: token carries no organization"
                );
                Err(OrgAuthError::forbidden("Organization access required"))
            }
        }
    }
}

/// Requires the token's role to be one of `allowed`.
#[derive(Clone, Debug)]
pub struct RequireRole {
    allowed: Vec<Role>,
}

impl RequireRole {
    pub fn new(allowed: &[Role]) -> Self {
        Self {
            allowed: allowed.to_vec(),
        }
    }
}

impl Guard for RequireRole {
    fn name(&self) -> &'static str {
        "RequireRole"
    }

    fn evaluate(&self, ctx: &mut GuardContext<'_>) -> Result<()> {
        let claims = ctx.authenticated_claims()?;
        if claims.has_role(&self.allowed) {
            return Ok(());
        }

        tracing::debug!(
            guard = self.name(),
            user_id = %claims.user_id,
            role = %claims.role,
            "Guard rejected request: role not allowed"
        );
        Err(OrgAuthError::forbidden("Insufficient permissions"))
    }
}

// =============================================================================
// GuardChain
// =============================================================================

/// Ordered guards for one group of routes.
#[derive(Clone)]
pub struct GuardChain {
    guards: Vec<Arc<dyn Guard>>,
}

impl GuardChain {
    /// Valid token required.
    pub fn authenticated(verifier: JwtVerifier) -> Self {
        Self {
            guards: vec![Arc::new(RequireAuthenticated::new(verifier))],
        }
    }

    /// Valid token naming an organization.
    pub fn organization(verifier: JwtVerifier) -> Self {
        Self::authenticated(verifier).with(RequireOrganization)
    }

    /// Valid token whose role is in `allowed`.
    pub fn roles(verifier: JwtVerifier, allowed: &[Role]) -> Self {
        Self::authenticated(verifier).with(RequireRole::new(allowed))
    }

    /// Append a guard; it runs after all the ones already present.
    pub fn with(mut self, guard: impl Guard + 'static) -> Self {
        self.guards.push(Arc::new(guard));
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.guards.iter().map(|g| g.name()).collect()
    }

    /// Run every guard in order and hand back the verified claims.
    pub fn evaluate(&self, headers: &HeaderMap) -> Result<TokenClaims> {
        let mut ctx = GuardContext::new(headers);
        for guard in &self.guards {
            guard.evaluate(&mut ctx)?;
        }
        ctx.into_claims()
            .ok_or_else(|| OrgAuthError::internal("Guard chain finished without claims"))
    }
}

impl fmt::Debug for GuardChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// axum middleware running a [`GuardChain`], for `from_fn_with_state`.
pub async fn guard_middleware(
    State(chain): State<GuardChain>,
    mut request: Request,
    next: Next,
) -> std::result::Result<Response, OrgAuthError> {
    let claims = chain.evaluate(request.headers())?;
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
