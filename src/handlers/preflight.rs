use axum::http::StatusCode;

/// Bare `OPTIONS` responder.
///
/// With CORS enabled the CORS layer answers preflights before this runs and
/// adds its headers; this keeps `OPTIONS` at 200 when CORS is turned off.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}
