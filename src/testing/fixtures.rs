//! Ready-made application fixtures for HTTP tests.

use axum::Router;

use crate::app::AppState;
use crate::auth::{PasswordConfig, PasswordHasher, TokenClaims, jwt_issuer::current_timestamp};
use crate::config::{Config, ConfigBuilder};
use crate::core::App;
use crate::store::{InMemoryCredentialStore, Role, seed_demo_data};

/// Signing secret used by every fixture.
pub const TEST_SECRET: &str = "orgauth-test-secret-0123456789abcdef";

/// A fully wired service over a seeded in-memory store.
///
/// Uses cheap Argon2 parameters; never use outside tests.
#[derive(Clone)]
pub struct TestApp {
    pub state: AppState,
    pub store: InMemoryCredentialStore,
    pub config: Config,
}

impl TestApp {
    /// Default configuration plus the demo tenant.
    pub async fn seeded() -> Self {
        Self::from_builder(ConfigBuilder::new()).await
    }

    /// `builder` gets the test secret; everything else is up to the caller.
    pub async fn from_builder(builder: ConfigBuilder) -> Self {
        let config = builder
            .with_jwt_secret(TEST_SECRET)
            .build()
            .expect("valid test configuration");

        let hasher = PasswordHasher::new(PasswordConfig::fast());
        let store = InMemoryCredentialStore::new();
        seed_demo_data(&store, &hasher).await.expect("seed demo data");

        let state = AppState::builder()
            .with_store(store.clone())
            .with_hasher(hasher)
            .with_config(&config)
            .expect("state from config")
            .build()
            .expect("app state");

        Self {
            state,
            store,
            config,
        }
    }

    /// Fresh router over the shared state.
    pub fn router(&self) -> Router {
        App::new(self.config.clone(), self.state.clone()).into_test_router()
    }

    /// Sign arbitrary claims with the fixture secret.
    pub fn sign(&self, claims: &TokenClaims) -> String {
        self.state.issuer.sign(claims).expect("sign test token")
    }

    /// Valid token for the given identity, expiring in an hour.
    pub fn token(&self, user_id: &str, organization_id: Option<&str>, role: Role) -> String {
        let now = current_timestamp();
        self.sign(&TokenClaims {
            user_id: user_id.to_string(),
            email: format!("{}@company.com", user_id),
            organization_id: organization_id.map(String::from),
            role,
            iat: now,
            exp: now + 3600,
        })
    }
}

/// Generated values for tests that need unique input.
pub mod fake {
    use uuid::Uuid;

    pub fn email() -> String {
        format!("test-{}@company.com", Uuid::new_v4().simple())
    }

    pub fn name() -> String {
        format!("Test{}", &Uuid::new_v4().simple().to_string()[..8])
    }
}
