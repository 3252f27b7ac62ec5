use serde::{Deserialize, Serialize};

use crate::store::Role;

/// Identity carried inside a signed token.
///
/// Field names are camelCase on the wire. `organizationId` is left out of
/// the payload entirely when the subject has no organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenClaims {
    pub user_id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    pub role: Role,
    /// Issued at (unix seconds)
    pub iat: u64,
    /// Expires at (unix seconds)
    pub exp: u64,
}

impl TokenClaims {
    pub fn has_role(&self, allowed: &[Role]) -> bool {
        allowed.contains(&self.role)
    }
}
