//! Login, registration and profile.

use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::auth::{AuthClaims, TokenSubject};
use crate::error::{OrgAuthError, Result};
use crate::http::json::present;
use crate::http::{ApiResponse, AuthResponse, JsonBody};
use crate::store::in_memory::DUPLICATE_EMAIL_MESSAGE;
use crate::store::{Organization, PublicUser, Role, UserRecord};

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const INVALID_DOMAIN: &str = "Invalid organization domain";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub organization_domain: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub organization_domain: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfileData {
    pub user: PublicUser,
    pub organization: Option<Organization>,
}

/// `POST /api/auth/login`
///
/// Unknown email and wrong password produce the same status, message and
/// (roughly) the same latency.
pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<AuthResponse> {
    let (Some(email), Some(password)) = (present(&req.email), present(&req.password)) else {
        return Err(OrgAuthError::bad_request("Email and password are required"));
    };
    let domain = present(&req.organization_domain);

    if state.policy.require_organization_domain && domain.is_none() {
        return Err(OrgAuthError::bad_request("Organization domain is required"));
    }

    let Some(user) = state.users.find_by_email(email).await? else {
        state.hasher.equalize_timing().await;
        tracing::info!(reason = "unknown_email", "Login rejected");
        return Err(OrgAuthError::unauthorized(INVALID_CREDENTIALS));
    };

    let valid = state
        .hasher
        .verify_blocking(password.to_string(), user.password_hash.clone())
        .await?;
    if !valid {
        tracing::info!(user_id = %user.id, reason = "bad_password", "Login rejected");
        return Err(OrgAuthError::unauthorized(INVALID_CREDENTIALS));
    }

    if !user.is_active {
        tracing::info!(user_id = %user.id, reason = "inactive", "Login rejected");
        return Err(OrgAuthError::unauthorized("Account is inactive"));
    }

    if let Some(domain) = domain {
        let organization = state.organizations.find_by_id(&user.organization_id).await?;
        if organization.is_none_or(|org| org.domain != domain) {
            tracing::info!(user_id = %user.id, reason = "domain_mismatch", "Login rejected");
            return Err(OrgAuthError::unauthorized(INVALID_DOMAIN));
        }
    }

    let token = state.issuer.issue(TokenSubject::from(&user))?;
    tracing::info!(
        user_id = %user.id,
        organization_id = %user.organization_id,
        "Login succeeded"
    );

    Ok(AuthResponse::ok(token, user.to_public(), "Login successful"))
}

/// `POST /api/auth/register`
///
/// New accounts always get the `user` role.
pub async fn register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<AuthResponse> {
    let (Some(email), Some(password), Some(first_name), Some(last_name), Some(domain)) = (
        present(&req.email),
        present(&req.password),
        present(&req.first_name),
        present(&req.last_name),
        present(&req.organization_domain),
    ) else {
        return Err(OrgAuthError::bad_request("All fields are required"));
    };

    // Checked before the domain so a taken email reports 409 first. The
    // store re-checks atomically on insert.
    if state.users.find_by_email(email).await?.is_some() {
        return Err(OrgAuthError::conflict(DUPLICATE_EMAIL_MESSAGE));
    }

    let organization = state
        .organizations
        .find_by_domain(domain)
        .await?
        .ok_or_else(|| OrgAuthError::bad_request(INVALID_DOMAIN))?;

    let password_hash = state.hasher.hash_blocking(password.to_string()).await?;
    let user = state
        .users
        .insert(UserRecord::new(
            email,
            password_hash,
            first_name,
            last_name,
            organization.id.as_str(),
            Role::User,
        ))
        .await?;

    let token = state.issuer.issue(TokenSubject::from(&user))?;
    tracing::info!(
        user_id = %user.id,
        organization_id = %organization.id,
        "User registered"
    );

    Ok(AuthResponse::created(
        token,
        user.to_public(),
        "Registration successful",
    ))
}

/// `GET /api/auth/profile`
pub async fn profile(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
) -> Result<ApiResponse<ProfileData>> {
    let user = state
        .users
        .find_by_id(&claims.user_id)
        .await?
        .ok_or_else(|| OrgAuthError::not_found("User not found"))?;

    let organization = state.organizations.find_by_id(&user.organization_id).await?;

    Ok(ApiResponse::success(ProfileData {
        user: user.to_public(),
        organization,
    }))
}
