use super::config::CorsConfig;
use axum::http::{HeaderName, HeaderValue, Method};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

/// Turn a [`CorsConfig`] into a tower-http layer, or `None` when disabled.
///
/// Call [`CorsConfig::validate`] first; tower-http panics on
/// credentials combined with wildcards.
pub fn build_cors_layer(config: &CorsConfig) -> Option<CorsLayer> {
    if !config.enabled {
        return None;
    }

    let mut layer = CorsLayer::new().max_age(Duration::from_secs(config.max_age_seconds));

    if config.allows_any_origin() {
        layer = layer.allow_origin(Any);
    } else {
        layer = layer.allow_origin(parse_all::<HeaderValue>(&config.allowed_origins, "origin"));
    }

    let methods = parse_all::<Method>(&config.allowed_methods, "method");
    if !methods.is_empty() {
        layer = layer.allow_methods(methods);
    }

    if config.allows_any_header() {
        layer = layer.allow_headers(Any);
    } else {
        let headers = parse_all::<HeaderName>(&config.allowed_headers, "header");
        if !headers.is_empty() {
            layer = layer.allow_headers(headers);
        }
    }

    let exposed = parse_all::<HeaderName>(&config.exposed_headers, "exposed header");
    if !exposed.is_empty() {
        layer = layer.expose_headers(exposed);
    }

    if config.allow_credentials {
        layer = layer.allow_credentials(true);
    }

    Some(layer)
}

fn parse_all<T: std::str::FromStr>(values: &[String], what: &'static str) -> Vec<T> {
    values
        .iter()
        .filter_map(|raw| match raw.parse() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                tracing::warn!(value = %raw, kind = what, "Ignoring unparseable CORS value");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::Request, http::StatusCode, routing::get};
    use tower::ServiceExt;

    #[test]
    fn test_disabled_cors() {
        let config = CorsConfig::builder().enabled(false).build();
        assert!(build_cors_layer(&config).is_none());
    }

    #[test]
    fn test_invalid_entries_are_skipped() {
        let methods = parse_all::<Method>(&["GET".into(), "not a method".into()], "method");
        assert_eq!(methods, vec![Method::GET]);
    }

    #[tokio::test]
    async fn test_default_layer_answers_preflight() {
        let layer = build_cors_layer(&CorsConfig::default()).unwrap();
        let app = Router::new().route("/x", get(|| async { "ok" })).layer(layer);

        let response = app
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/x")
                    .header("origin", "http://localhost:3000")
                    .header("access-control-request-method", "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        let methods = response.headers()["access-control-allow-methods"]
            .to_str()
            .unwrap()
            .to_string();
        assert!(methods.contains("POST"));
    }

    #[tokio::test]
    async fn test_specific_origin_is_echoed() {
        let config = CorsConfig::builder().allow_origin("https://app.company.com").build();
        let app = Router::new()
            .route("/x", get(|| async { "ok" }))
            .layer(build_cors_layer(&config).unwrap());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/x")
                    .header("origin", "https://app.company.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "https://app.company.com"
        );
    }
}
