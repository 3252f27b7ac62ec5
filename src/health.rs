use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::app::AppState;
use crate::store::UserStore;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub checks: Vec<ComponentHealth>,
}

impl IntoResponse for HealthResponse {
    fn into_response(self) -> Response {
        let status_code = match self.status {
            HealthStatus::Healthy => StatusCode::OK,
            HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        };
        (status_code, Json(self)).into_response()
    }
}

#[async_trait]
pub trait HealthCheck: Send + Sync {
    fn name(&self) -> &str;

    async fn check(&self) -> ComponentHealth;
}

/// Reports the credential store as healthy if it can be read.
pub struct CredentialStoreCheck {
    users: Arc<dyn UserStore>,
}

impl CredentialStoreCheck {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl HealthCheck for CredentialStoreCheck {
    fn name(&self) -> &str {
        "credential_store"
    }

    async fn check(&self) -> ComponentHealth {
        let (status, message) = match self.users.count().await {
            Ok(_) => (HealthStatus::Healthy, None),
            Err(e) => {
                tracing::error!(error = %e, "Credential store health check failed");
                (
                    HealthStatus::Unhealthy,
                    Some("Credential store unavailable".to_string()),
                )
            }
        };
        ComponentHealth {
            name: self.name().to_string(),
            status,
            message,
        }
    }
}

/// Runs every registered check; one unhealthy component fails the whole.
#[derive(Default)]
pub struct HealthChecker {
    checks: Vec<Arc<dyn HealthCheck>>,
}

impl HealthChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_check(mut self, check: Arc<dyn HealthCheck>) -> Self {
        self.checks.push(check);
        self
    }

    pub async fn check_health(&self) -> HealthResponse {
        let mut checks = Vec::with_capacity(self.checks.len());
        for check in &self.checks {
            checks.push(check.check().await);
        }

        let status = if checks.iter().all(|c| c.status == HealthStatus::Healthy) {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        };

        HealthResponse { status, checks }
    }
}

/// `GET /health`
pub async fn health_handler(State(state): State<AppState>) -> HealthResponse {
    HealthChecker::new()
        .with_check(Arc::new(CredentialStoreCheck::new(state.users.clone())))
        .check_health()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(HealthStatus);

    #[async_trait]
    impl HealthCheck for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn check(&self) -> ComponentHealth {
            ComponentHealth {
                name: self.name().to_string(),
                status: self.0,
                message: None,
            }
        }
    }

    #[tokio::test]
    async fn test_all_healthy() {
        let report = HealthChecker::new()
            .with_check(Arc::new(Fixed(HealthStatus::Healthy)))
            .check_health()
            .await;
        assert_eq!(report.status, HealthStatus::Healthy);
        assert_eq!(report.into_response().status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_one_unhealthy_fails() {
        let report = HealthChecker::new()
            .with_check(Arc::new(Fixed(HealthStatus::Healthy)))
            .with_check(Arc::new(Fixed(HealthStatus::Unhealthy)))
            .check_health()
            .await;
        assert_eq!(report.checks.len(), 2);
        assert_eq!(report.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_store_check_does_not_expose_user_count() {
        let store = crate::store::InMemoryCredentialStore::new();
        let hasher = crate::auth::PasswordHasher::new(crate::auth::PasswordConfig::fast());
        crate::store::seed_demo_data(&store, &hasher).await.unwrap();

        let check = CredentialStoreCheck::new(Arc::new(store));
        let result = check.check().await;
        assert_eq!(result.status, HealthStatus::Healthy);
        assert!(result.message.is_none());

        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("users"), "health leaked store contents: {}", json);
    }
}
