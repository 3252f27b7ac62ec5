//! Storage capabilities the handlers depend on.
//!
//! Handlers only see these traits, so tests can swap in any backing store.

use crate::error::Result;
use crate::store::types::{Organization, UserRecord};
use async_trait::async_trait;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Exact, case-sensitive match.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>>;

    async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>>;

    /// Every user belonging to `organization_id`, in insertion order.
    async fn find_by_organization(&self, organization_id: &str) -> Result<Vec<UserRecord>>;

    /// Append a user.
    ///
    /// Implementations must reject a duplicate email with
    /// [`OrgAuthError::Conflict`](crate::OrgAuthError::Conflict), atomically
    /// with the append, so two concurrent registrations cannot both win.
    async fn insert(&self, user: UserRecord) -> Result<UserRecord>;

    async fn count(&self) -> Result<usize>;
}

#[async_trait]
pub trait OrganizationStore: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Organization>>;

    async fn find_by_domain(&self, domain: &str) -> Result<Option<Organization>>;
}
