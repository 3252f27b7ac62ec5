//! Wire envelopes and request extractors shared by the route handlers.

pub mod json;
pub mod response;

pub use json::JsonBody;
pub use response::{ApiResponse, AuthResponse};
