use axum::extract::State;
use serde::Serialize;

use crate::app::AppState;
use crate::auth::AuthClaims;
use crate::error::{OrgAuthError, Result};
use crate::http::ApiResponse;
use crate::store::PublicUser;

#[derive(Debug, Serialize)]
pub struct OrganizationUsers {
    pub users: Vec<PublicUser>,
    pub total: usize,
}

/// `GET /api/organization/users`: members of the caller's organization.
pub async fn organization_users(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
) -> Result<ApiResponse<OrganizationUsers>> {
    // RequireOrganization has already rejected tokens without one.
    let organization_id = claims
        .organization_id
        .as_deref()
        .ok_or_else(|| OrgAuthError::forbidden("Organization access required"))?;

    let users: Vec<PublicUser> = state
        .users
        .find_by_organization(organization_id)
        .await?
        .iter()
        .map(PublicUser::from)
        .collect();

    Ok(ApiResponse::success(OrganizationUsers {
        total: users.len(),
        users,
    }))
}
