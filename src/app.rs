use std::sync::Arc;
use std::time::Duration;

use crate::auth::{
    GuardChain, JwtIssuer, JwtIssuerConfig, JwtVerifier, PasswordHasher, parse_ttl,
};
use crate::config::Config;
use crate::error::{OrgAuthError, Result};
use crate::store::{OrganizationStore, UserStore};

/// Login behaviour switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthPolicy {
    /// Login must name the user's organization domain.
    pub require_organization_domain: bool,
}

/// Shared state handed to every handler.
///
/// Stores are trait objects so tests and alternative backends can be
/// injected; nothing here is global.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub organizations: Arc<dyn OrganizationStore>,
    pub hasher: PasswordHasher,
    pub issuer: JwtIssuer,
    pub verifier: JwtVerifier,
    pub policy: AuthPolicy,
}

impl AppState {
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::new()
    }

    /// Chain for routes that only need a signed-in caller.
    pub fn authenticated_guard(&self) -> GuardChain {
        GuardChain::authenticated(self.verifier.clone())
    }

    /// Chain for routes scoped to the caller's organization.
    pub fn organization_guard(&self) -> GuardChain {
        GuardChain::organization(self.verifier.clone())
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// Builder for [`AppState`].
#[must_use = "builder does nothing until you call build()"]
#[derive(Default)]
pub struct AppStateBuilder {
    users: Option<Arc<dyn UserStore>>,
    organizations: Option<Arc<dyn OrganizationStore>>,
    hasher: Option<PasswordHasher>,
    secret: Option<Vec<u8>>,
    token_ttl: Option<Duration>,
    policy: AuthPolicy,
}

impl AppStateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use one value as both user and organization store.
    pub fn with_store<S>(self, store: S) -> Self
    where
        S: UserStore + OrganizationStore + 'static,
    {
        let store = Arc::new(store);
        self.with_user_store(store.clone())
            .with_organization_store(store)
    }

    pub fn with_user_store(mut self, users: Arc<dyn UserStore>) -> Self {
        self.users = Some(users);
        self
    }

    pub fn with_organization_store(mut self, organizations: Arc<dyn OrganizationStore>) -> Self {
        self.organizations = Some(organizations);
        self
    }

    pub fn with_hasher(mut self, hasher: PasswordHasher) -> Self {
        self.hasher = Some(hasher);
        self
    }

    /// Signing secret, shared by issuer and verifier.
    pub fn with_secret(mut self, secret: impl Into<Vec<u8>>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = Some(ttl);
        self
    }

    pub fn with_policy(mut self, policy: AuthPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Secret, lifetime and policy from a validated [`Config`].
    pub fn with_config(self, config: &Config) -> Result<Self> {
        let ttl = parse_ttl(&config.auth.token_ttl)?;
        Ok(self
            .with_secret(config.auth.secret_bytes()?.to_vec())
            .with_token_ttl(ttl)
            .with_policy(AuthPolicy {
                require_organization_domain: config.auth.require_organization_domain,
            }))
    }

    pub fn build(self) -> Result<AppState> {
        let users = self
            .users
            .ok_or_else(|| OrgAuthError::internal("AppState requires a user store"))?;
        let organizations = self
            .organizations
            .ok_or_else(|| OrgAuthError::internal("AppState requires an organization store"))?;
        let secret = self
            .secret
            .ok_or_else(|| OrgAuthError::internal("AppState requires a signing secret"))?;

        let mut issuer_config = JwtIssuerConfig::with_secret(secret.clone());
        if let Some(ttl) = self.token_ttl {
            issuer_config = issuer_config.token_ttl(ttl);
        }

        Ok(AppState {
            users,
            organizations,
            hasher: self.hasher.unwrap_or_default(),
            issuer: JwtIssuer::new(issuer_config)?,
            verifier: JwtVerifier::from_secret(&secret),
            policy: self.policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{PasswordConfig, TokenSubject};
    use crate::config::ConfigBuilder;
    use crate::store::{InMemoryCredentialStore, Role};

    const SECRET: &str = "app-state-test-secret-of-good-length!";

    #[test]
    fn test_build_requires_parts() {
        assert!(AppState::builder().with_secret(SECRET).build().is_err());
        assert!(AppState::builder()
            .with_store(InMemoryCredentialStore::new())
            .build()
            .is_err());
    }

    #[test]
    fn test_issuer_and_verifier_share_secret() {
        let state = AppState::builder()
            .with_store(InMemoryCredentialStore::new())
            .with_hasher(PasswordHasher::new(PasswordConfig::fast()))
            .with_secret(SECRET)
            .with_token_ttl(Duration::from_secs(60))
            .build()
            .unwrap();

        let token = state
            .issuer
            .issue(TokenSubject {
                user_id: "1",
                email: "admin@company.com",
                organization_id: Some("org-1"),
                role: Role::Admin,
            })
            .unwrap();
        let claims = state.verifier.verify(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, 60);
    }

    #[test]
    fn test_with_config() {
        let config = ConfigBuilder::new()
            .with_jwt_secret(SECRET)
            .with_token_ttl("2h")
            .with_require_organization_domain(true)
            .build()
            .unwrap();

        let state = AppState::builder()
            .with_store(InMemoryCredentialStore::new())
            .with_config(&config)
            .unwrap()
            .build()
            .unwrap();

        assert!(state.policy.require_organization_domain);
        assert_eq!(state.issuer.token_ttl(), Duration::from_secs(7200));
        assert_eq!(
            state.organization_guard().names(),
            ["RequireAuthenticated", "RequireOrganization"]
        );
    }
}
