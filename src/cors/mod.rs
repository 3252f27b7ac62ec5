//! Cross-Origin Resource Sharing for the browser login UI.

mod config;
mod layer;

pub use config::{CorsConfig, CorsConfigBuilder};
pub use layer::build_cors_layer;
