//! # orgauth
//!
//! Organization-scoped login and registration over HTTP.
//!
//! Users sign in with email and password, optionally naming their
//! organization's domain, and get back an HS256 bearer token. Guarded routes
//! verify that token with a [`GuardChain`](auth::GuardChain) before the
//! handler runs.
//!
//! ```rust,no_run
//! use orgauth::{App, AppState, ConfigBuilder, PasswordHasher, store};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigBuilder::new().from_env().build()?;
//!     orgauth::init_tracing_with_config(&config);
//!
//!     let hasher = PasswordHasher::default();
//!     let credentials = store::InMemoryCredentialStore::new();
//!     store::seed_demo_data(&credentials, &hasher).await?;
//!
//!     let state = AppState::builder()
//!         .with_store(credentials)
//!         .with_hasher(hasher)
//!         .with_config(&config)?
//!         .build()?;
//!
//!     App::new(config, state).serve().await?;
//!     Ok(())
//! }
//! ```

mod app;
pub mod auth;
pub mod config;
mod core;
pub mod cors;
mod error;
pub mod handlers;
pub mod health;
pub mod http;
mod middleware;
pub mod store;
pub mod testing;
pub mod utils;

pub use app::{AppState, AppStateBuilder, AuthPolicy};
pub use auth::{PasswordConfig, PasswordHasher};
pub use config::{Config, ConfigBuilder, LoggingConfig, ServerConfig};
pub use core::App;
pub use cors::{CorsConfig, CorsConfigBuilder};
pub use error::{OrgAuthError, Result};
pub use health::{ComponentHealth, HealthCheck, HealthChecker, HealthStatus};
pub use http::{ApiResponse, AuthResponse, JsonBody};
pub use middleware::{MakeRequestUuid, REQUEST_ID_HEADER};

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber from the environment.
///
/// Filter comes from `RUST_LOG` (default `info`); `ORGAUTH_LOG_JSON=true`
/// switches to JSON lines.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json_logs = utils::get_env_with_prefix("LOG_JSON")
        .and_then(|v| utils::parse_bool_flag(&v))
        .unwrap_or(false);

    install_subscriber(env_filter, json_logs);
}

/// Install the global subscriber from [`Config::logging`]. `RUST_LOG` still wins.
pub fn init_tracing_with_config(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    install_subscriber(env_filter, config.logging.json);
}

fn install_subscriber(env_filter: EnvFilter, json: bool) {
    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
