use crate::{
    app::AppState,
    auth::guard_middleware,
    config::Config,
    cors::build_cors_layer,
    handlers::{login, organization_users, preflight, profile, register},
    health::health_handler,
    error::OrgAuthError,
    middleware::{MakeRequestUuid, REQUEST_ID_HEADER},
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::any::Any;
use std::time::Duration;
use tokio::signal;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

/// The HTTP service: routes, guards and the middleware stack.
pub struct App {
    config: Config,
    state: AppState,
}

impl App {
    pub fn new(config: Config, state: AppState) -> Self {
        Self { config, state }
    }

    /// Route table.
    ///
    /// Guards are attached with `route_layer` before `.options(..)` is
    /// chained, so `OPTIONS` never requires a token.
    pub fn routes(state: &AppState) -> Router<AppState> {
        let authenticated = from_fn_with_state(state.authenticated_guard(), guard_middleware);
        let organization = from_fn_with_state(state.organization_guard(), guard_middleware);

        Router::new()
            .route("/api/auth/login", post(login).options(preflight))
            .route("/api/auth/register", post(register).options(preflight))
            .route(
                "/api/auth/profile",
                get(profile).route_layer(authenticated).options(preflight),
            )
            .route(
                "/api/organization/users",
                get(organization_users)
                    .route_layer(organization)
                    .options(preflight),
            )
            .route("/health", get(health_handler))
    }

    /// Routes with state applied and the full middleware stack.
    pub fn into_router(self) -> Router {
        let mut router = Self::routes(&self.state)
            .with_state(self.state)
            .layer(DefaultBodyLimit::max(self.config.server.max_body_size))
            .layer(CatchPanicLayer::custom(handle_panic));

        if let Some(cors_layer) = build_cors_layer(&self.config.cors) {
            router = router.layer(cors_layer);
        }

        router
            .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER))
            .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
    }

    /// Same router `serve` uses, for driving with `tower::ServiceExt::oneshot`.
    pub fn into_test_router(self) -> Router {
        self.into_router()
    }

    /// Bind and serve until Ctrl+C / SIGTERM.
    pub async fn serve(self) -> std::io::Result<()> {
        let addr = self
            .config
            .server
            .addr()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server starting on http://{}", addr);
        tracing::info!("Health check available at http://{}/health", addr);

        axum::serve(listener, self.into_router())
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

/// A panicking handler still answers with the 500 envelope.
fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    OrgAuthError::internal(format!("Handler panicked: {}", detail)).into_response()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, starting graceful shutdown");
        },
    }

    // Grace period for in-flight requests
    tokio::time::sleep(Duration::from_secs(1)).await;
    tracing::info!("Shutdown complete");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[tokio::test]
    async fn test_panicking_handler_renders_internal_error() {
        async fn explode() -> &'static str {
            panic!("token lifetime overflow")
        }

        let router = Router::new()
            .route("/boom", get(explode))
            .layer(CatchPanicLayer::custom(handle_panic));

        let body: serde_json::Value = testing::get(router, "/boom")
            .execute()
            .await
            .assert_status(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
            .json()
            .await;

        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Internal server error");
        assert!(!body.to_string().contains("overflow"));
    }
}
