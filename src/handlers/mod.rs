//! Route handlers.

pub mod auth;
pub mod organization;
pub mod preflight;

pub use auth::{LoginRequest, ProfileData, RegisterRequest, login, profile, register};
pub use organization::{OrganizationUsers, organization_users};
pub use preflight::preflight;
