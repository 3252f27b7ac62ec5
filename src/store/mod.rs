//! Credential store: users and organizations.

pub mod in_memory;
pub mod seed;
pub mod traits;
pub mod types;

pub use in_memory::InMemoryCredentialStore;
pub use seed::seed_demo_data;
pub use traits::{OrganizationStore, UserStore};
pub use types::{Organization, PublicUser, Role, SsoConfig, UserRecord};
