use axum::{
    Json,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Error taxonomy for the service.
///
/// Every variant maps to one HTTP status. Client-facing messages are the
/// inner string for 4xx variants; 5xx variants always render a generic
/// message and keep the detail for the server log.
#[derive(Debug, thiserror::Error)]
pub enum OrgAuthError {
    /// Missing or malformed input (400).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Bad credentials or bad token (401).
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed: missing organization or role (403).
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate email on registration (409).
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// Failure envelope, the same shape successful responses use.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    success: bool,
    message: String,
}

impl OrgAuthError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) | Self::Anyhow(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message that is safe to send to the client.
    ///
    /// Server errors never leak their detail (CWE-209).
    pub fn safe_message(&self) -> String {
        match self {
            Self::BadRequest(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::NotFound(msg)
            | Self::Conflict(msg) => msg.clone(),
            Self::Internal(_) | Self::Anyhow(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for OrgAuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_id = uuid::Uuid::new_v4().to_string();

        if status.is_server_error() {
            tracing::error!(
                status = status.as_u16(),
                error_id = %error_id,
                error = %self,
                "Request failed"
            );
        } else {
            tracing::debug!(
                status = status.as_u16(),
                error_id = %error_id,
                error = %self,
                "Request rejected"
            );
        }

        let body = Json(ErrorEnvelope {
            success: false,
            message: self.safe_message(),
        });

        let mut response = (status, body).into_response();
        if let Ok(value) = HeaderValue::from_str(&error_id) {
            response.headers_mut().insert("x-error-id", value);
        }
        response
    }
}

pub type Result<T> = std::result::Result<T, OrgAuthError>;

impl From<serde_json::Error> for OrgAuthError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            OrgAuthError::BadRequest(format!("JSON error: {}", err))
        } else {
            OrgAuthError::Internal(format!("JSON serialization error: {}", err))
        }
    }
}

impl From<tokio::task::JoinError> for OrgAuthError {
    fn from(err: tokio::task::JoinError) -> Self {
        OrgAuthError::Internal(format!("Blocking task failed: {}", err))
    }
}
