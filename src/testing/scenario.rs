//! Fluent request builder for driving a [`Router`] in tests, no socket needed.
//!
//! ```rust,ignore
//! let body: serde_json::Value = testing::post(app.router(), "/api/auth/login")
//!     .json_body(&json!({"email": "admin@company.com", "password": "password"}))
//!     .execute()
//!     .await
//!     .assert_ok()
//!     .json()
//!     .await;
//! ```
//!
//! Helpers here panic on failure; they are meant for `#[test]` code only.

use axum::{
    Router,
    body::Body,
    http::{HeaderName, HeaderValue, Method, Request, StatusCode, header},
    response::Response,
};
use serde::{Serialize, de::DeserializeOwned};
use tower::ServiceExt;

pub struct Scenario {
    app: Router,
    request: Request<Body>,
}

impl Scenario {
    pub fn new(app: Router, method: Method, uri: &str) -> Self {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .expect("valid request line");
        Self { app, request }
    }

    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.request.headers_mut().insert(
            HeaderName::from_bytes(key.as_bytes()).expect("valid header name"),
            HeaderValue::from_str(value).expect("valid header value"),
        );
        self
    }

    /// `Authorization: Bearer <token>`
    pub fn bearer_token(self, token: &str) -> Self {
        self.header("authorization", &format!("Bearer {}", token))
    }

    pub fn json_body<T: Serialize>(mut self, body: &T) -> Self {
        let json = serde_json::to_vec(body).expect("serializable body");
        *self.request.body_mut() = Body::from(json);
        self.request.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        self
    }

    /// Body sent verbatim with a JSON content type, for malformed-input tests.
    pub fn raw_json(mut self, body: &'static str) -> Self {
        *self.request.body_mut() = Body::from(body);
        self.request.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        self
    }

    pub async fn execute(self) -> ScenarioAssert {
        let response = self
            .app
            .oneshot(self.request)
            .await
            .expect("router is infallible");
        ScenarioAssert { response }
    }
}

pub struct ScenarioAssert {
    response: Response,
}

impl ScenarioAssert {
    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    pub fn assert_status(self, expected: StatusCode) -> Self {
        assert_eq!(
            self.response.status(),
            expected,
            "Expected status {}, got {}",
            expected,
            self.response.status()
        );
        self
    }

    pub fn assert_ok(self) -> Self {
        self.assert_status(StatusCode::OK)
    }

    pub fn assert_created(self) -> Self {
        self.assert_status(StatusCode::CREATED)
    }

    pub fn assert_bad_request(self) -> Self {
        self.assert_status(StatusCode::BAD_REQUEST)
    }

    pub fn assert_unauthorized(self) -> Self {
        self.assert_status(StatusCode::UNAUTHORIZED)
    }

    pub fn assert_forbidden(self) -> Self {
        self.assert_status(StatusCode::FORBIDDEN)
    }

    pub fn assert_not_found(self) -> Self {
        self.assert_status(StatusCode::NOT_FOUND)
    }

    pub fn assert_conflict(self) -> Self {
        self.assert_status(StatusCode::CONFLICT)
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.response.headers().get(key).and_then(|v| v.to_str().ok())
    }

    pub fn assert_header(self, key: &str, expected: &str) -> Self {
        let value = self
            .header(key)
            .unwrap_or_else(|| panic!("Header '{}' not found", key));
        assert_eq!(value, expected, "Header '{}' value mismatch", key);
        self
    }

    pub async fn body_string(self) -> String {
        let bytes = axum::body::to_bytes(self.response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        String::from_utf8(bytes.to_vec()).expect("utf-8 body")
    }

    pub async fn json<T: DeserializeOwned>(self) -> T {
        let body = self.body_string().await;
        serde_json::from_str(&body)
            .unwrap_or_else(|e| panic!("Failed to parse JSON response ({}): {}", e, body))
    }

    /// Assert the `{success:false, message}` failure envelope.
    pub async fn assert_message(self, expected: &str) {
        let json: serde_json::Value = self.json().await;
        assert_eq!(json["success"], false, "body: {}", json);
        assert_eq!(json["message"], expected, "body: {}", json);
    }

    pub fn response(self) -> Response {
        self.response
    }
}

pub fn get(app: Router, uri: &str) -> Scenario {
    Scenario::new(app, Method::GET, uri)
}

pub fn post(app: Router, uri: &str) -> Scenario {
    Scenario::new(app, Method::POST, uri)
}

pub fn options(app: Router, uri: &str) -> Scenario {
    Scenario::new(app, Method::OPTIONS, uri)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, routing};
    use serde_json::{Value, json};

    fn echo_app() -> Router {
        Router::new().route(
            "/echo",
            routing::post(|Json(body): Json<Value>| async move { Json(body) }),
        )
    }

    #[tokio::test]
    async fn test_json_round_trip() {
        let body: Value = post(echo_app(), "/echo")
            .json_body(&json!({"hello": "world"}))
            .execute()
            .await
            .assert_ok()
            .json()
            .await;
        assert_eq!(body["hello"], "world");
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        get(echo_app(), "/nope").execute().await.assert_not_found();
    }
}
