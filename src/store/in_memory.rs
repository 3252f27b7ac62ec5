use crate::error::{OrgAuthError, Result};
use crate::store::traits::{OrganizationStore, UserStore};
use crate::store::types::{Organization, UserRecord};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

pub const DUPLICATE_EMAIL_MESSAGE: &str = "User already exists with this email";

/// Process-local credential store.
///
/// Cloning shares the underlying data. Nothing is persisted.
#[derive(Clone, Default)]
pub struct InMemoryCredentialStore {
    users: Arc<RwLock<Vec<UserRecord>>>,
    organizations: Arc<RwLock<Vec<Organization>>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_organization(&self, organization: Organization) -> Result<()> {
        let mut organizations = self.organizations.write().await;
        if organizations
            .iter()
            .any(|o| o.id == organization.id || o.domain == organization.domain)
        {
            return Err(OrgAuthError::conflict(format!(
                "Organization {} already exists",
                organization.id
            )));
        }
        organizations.push(organization);
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryCredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryCredentialStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl UserStore for InMemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_organization(&self, organization_id: &str) -> Result<Vec<UserRecord>> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .filter(|u| u.organization_id == organization_id)
            .cloned()
            .collect())
    }

    async fn insert(&self, user: UserRecord) -> Result<UserRecord> {
        // Check and append under the same write guard.
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(OrgAuthError::conflict(DUPLICATE_EMAIL_MESSAGE));
        }
        users.push(user.clone());
        Ok(user)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.users.read().await.len())
    }
}

#[async_trait]
impl OrganizationStore for InMemoryCredentialStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Organization>> {
        let organizations = self.organizations.read().await;
        Ok(organizations.iter().find(|o| o.id == id).cloned())
    }

    async fn find_by_domain(&self, domain: &str) -> Result<Option<Organization>> {
        let organizations = self.organizations.read().await;
        Ok(organizations.iter().find(|o| o.domain == domain).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::types::Role;
    use chrono::Utc;

    fn org(id: &str, domain: &str) -> Organization {
        Organization {
            id: id.into(),
            name: format!("{} Inc.", id),
            domain: domain.into(),
            sso_config: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn user(email: &str, org: &str) -> UserRecord {
        UserRecord::new(email, "hash", "First", "Last", org, Role::User)
    }

    #[tokio::test]
    async fn test_find_by_email_is_case_sensitive() {
        let store = InMemoryCredentialStore::new();
        store.insert(user("ada@company.com", "org-1")).await.unwrap();

        assert!(store.find_by_email("ada@company.com").await.unwrap().is_some());
        assert!(store.find_by_email("Ada@Company.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_id_and_organization() {
        let store = InMemoryCredentialStore::new();
        let a = store.insert(user("a@one.test", "org-1")).await.unwrap();
        store.insert(user("b@two.test", "org-2")).await.unwrap();
        store.insert(user("c@one.test", "org-1")).await.unwrap();

        let found = UserStore::find_by_id(&store, &a.id).await.unwrap().unwrap();
        assert_eq!(found.email, "a@one.test");

        let members = store.find_by_organization("org-1").await.unwrap();
        let emails: Vec<_> = members.iter().map(|u| u.email.as_str()).collect();
        assert_eq!(emails, ["a@one.test", "c@one.test"]);

        assert!(store.find_by_organization("org-9").await.unwrap().is_empty());
        assert_eq!(store.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_email() {
        let store = InMemoryCredentialStore::new();
        store.insert(user("dup@company.com", "org-1")).await.unwrap();

        let err = store.insert(user("dup@company.com", "org-1")).await.unwrap_err();
        assert!(matches!(err, OrgAuthError::Conflict(_)));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_inserts_admit_one() {
        let store = InMemoryCredentialStore::new();
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.insert(user("race@company.com", "org-1")).await })
            })
            .collect();

        let mut ok = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => ok += 1,
                Err(OrgAuthError::Conflict(_)) => conflicts += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(ok, 1);
        assert_eq!(conflicts, 15);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_organizations() {
        let store = InMemoryCredentialStore::new();
        store.add_organization(org("org-1", "company.com")).await.unwrap();

        let by_domain = store.find_by_domain("company.com").await.unwrap().unwrap();
        assert_eq!(by_domain.id, "org-1");
        assert!(OrganizationStore::find_by_id(&store, "org-1").await.unwrap().is_some());
        assert!(store.find_by_domain("other.com").await.unwrap().is_none());

        assert!(store.add_organization(org("org-2", "company.com")).await.is_err());
    }
}
