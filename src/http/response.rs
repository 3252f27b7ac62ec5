use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::store::PublicUser;

/// Standard JSON envelope: `{ success, data?, message? }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Envelope returned by login and register.
///
/// Token and user sit at the top level rather than under `data`, which is
/// what existing clients read.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub user: PublicUser,
    pub message: String,
    #[serde(skip)]
    status: StatusCode,
}

impl AuthResponse {
    /// 200 response for a successful login.
    pub fn ok(token: String, user: PublicUser, message: impl Into<String>) -> Self {
        Self {
            success: true,
            token,
            user,
            message: message.into(),
            status: StatusCode::OK,
        }
    }

    /// 201 response for a freshly registered account.
    pub fn created(token: String, user: PublicUser, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CREATED,
            ..Self::ok(token, user, message)
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AuthResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
