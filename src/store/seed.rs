//! Demo tenant loaded at startup.

use crate::auth::PasswordHasher;
use crate::error::{OrgAuthError, Result};
use crate::store::in_memory::InMemoryCredentialStore;
use crate::store::traits::UserStore;
use crate::store::types::{Organization, Role, UserRecord};
use chrono::{DateTime, NaiveDate, Utc};

pub const DEMO_ORGANIZATION_ID: &str = "org-1";
pub const DEMO_DOMAIN: &str = "company.com";
pub const DEMO_ADMIN_EMAIL: &str = "admin@company.com";
pub const DEMO_USER_EMAIL: &str = "user@company.com";
pub const DEMO_PASSWORD: &str = "password";

fn seeded_at() -> Result<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(2025, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| OrgAuthError::internal("Invalid seed timestamp"))
}

/// Load one organization and two accounts (an admin and a regular user).
///
/// The demo password is hashed here with `hasher`, so the stored hashes
/// always match the running configuration.
pub async fn seed_demo_data(
    store: &InMemoryCredentialStore,
    hasher: &PasswordHasher,
) -> Result<()> {
    let at = seeded_at()?;

    store
        .add_organization(Organization {
            id: DEMO_ORGANIZATION_ID.to_string(),
            name: "Company Inc.".to_string(),
            domain: DEMO_DOMAIN.to_string(),
            sso_config: None,
            created_at: at,
            updated_at: at,
        })
        .await?;

    let accounts = [
        ("1", DEMO_ADMIN_EMAIL, "Admin", Role::Admin),
        ("2", DEMO_USER_EMAIL, "Regular", Role::User),
    ];

    for (id, email, first_name, role) in accounts {
        let password_hash = hasher.hash_blocking(DEMO_PASSWORD.to_string()).await?;
        store
            .insert(UserRecord {
                id: id.to_string(),
                email: email.to_string(),
                password_hash,
                first_name: first_name.to_string(),
                last_name: "User".to_string(),
                organization_id: DEMO_ORGANIZATION_ID.to_string(),
                role,
                is_active: true,
                created_at: at,
                updated_at: at,
            })
            .await?;
    }

    tracing::info!(
        organization_id = DEMO_ORGANIZATION_ID,
        users = accounts.len(),
        "Seeded demo credential store"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::PasswordConfig;
    use crate::store::traits::OrganizationStore;

    #[tokio::test]
    async fn test_seed_contents() {
        let store = InMemoryCredentialStore::new();
        let hasher = PasswordHasher::new(PasswordConfig::fast());
        seed_demo_data(&store, &hasher).await.unwrap();

        let org = store.find_by_domain(DEMO_DOMAIN).await.unwrap().unwrap();
        assert_eq!(org.id, DEMO_ORGANIZATION_ID);
        assert_eq!(org.name, "Company Inc.");

        let admin = store.find_by_email(DEMO_ADMIN_EMAIL).await.unwrap().unwrap();
        assert_eq!(admin.id, "1");
        assert_eq!(admin.role, Role::Admin);
        assert_eq!(admin.first_name, "Admin");
        assert!(hasher.verify(DEMO_PASSWORD, &admin.password_hash));

        let user = store.find_by_email(DEMO_USER_EMAIL).await.unwrap().unwrap();
        assert_eq!(user.id, "2");
        assert_eq!(user.role, Role::User);
        assert_eq!(user.created_at.to_rfc3339(), "2025-01-01T00:00:00+00:00");

        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_seeding_twice_fails() {
        let store = InMemoryCredentialStore::new();
        let hasher = PasswordHasher::new(PasswordConfig::fast());
        seed_demo_data(&store, &hasher).await.unwrap();
        assert!(seed_demo_data(&store, &hasher).await.is_err());
    }
}
