use anyhow::Context;
use orgauth::{App, AppState, ConfigBuilder, PasswordHasher, store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigBuilder::new()
        .from_env()
        .build()
        .context("invalid configuration")?;
    orgauth::init_tracing_with_config(&config);

    for warning in config.startup_warnings() {
        tracing::warn!("{}", warning);
    }

    let hasher = PasswordHasher::default();
    let credentials = store::InMemoryCredentialStore::new();
    if config.auth.seed_demo_data {
        store::seed_demo_data(&credentials, &hasher)
            .await
            .context("failed to seed demo data")?;
    }

    let state = AppState::builder()
        .with_store(credentials)
        .with_hasher(hasher)
        .with_config(&config)?
        .build()?;

    tracing::info!(
        token_ttl = %config.auth.token_ttl,
        require_organization_domain = config.auth.require_organization_domain,
        cors = config.cors.enabled,
        "Starting orgauth"
    );

    App::new(config, state).serve().await?;
    Ok(())
}
