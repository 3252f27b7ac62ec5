use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

use crate::error::OrgAuthError;

/// JSON body extractor whose rejection uses the service envelope.
///
/// axum's own `Json` rejection renders plain text; this wraps it so a bad
/// body comes back as `400 {"success":false,"message":"Invalid request body"}`.
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = OrgAuthError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            tracing::debug!(error = %rejection, "Rejected request body");
            OrgAuthError::bad_request("Invalid request body")
        })?;
        Ok(JsonBody(value))
    }
}

/// Treat absent and empty strings the same way.
pub fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{StatusCode, header};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Payload {
        email: Option<String>,
    }

    fn json_request(body: &'static str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_body() {
        let JsonBody(payload) = JsonBody::<Payload>::from_request(json_request(r#"{"email":"a@b.c"}"#), &())
            .await
            .unwrap();
        assert_eq!(payload.email.as_deref(), Some("a@b.c"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let err = JsonBody::<Payload>::from_request(json_request("{not json"), &())
            .await
            .err()
            .unwrap();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.safe_message(), "Invalid request body");
    }

    #[test]
    fn test_present() {
        assert_eq!(present(&Some("x".into())), Some("x"));
        assert_eq!(present(&Some(String::new())), None);
        assert_eq!(present(&None), None);
    }
}
