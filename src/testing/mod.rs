//! Test support: an in-process request builder and seeded app fixtures.
//!
//! ```rust,ignore
//! use orgauth::testing::{self, TestApp};
//!
//! #[tokio::test]
//! async fn health() {
//!     let app = TestApp::seeded().await;
//!     testing::get(app.router(), "/health").execute().await.assert_ok();
//! }
//! ```

mod fixtures;
mod scenario;

pub use fixtures::{TEST_SECRET, TestApp, fake};
pub use scenario::{Scenario, ScenarioAssert, get, options, post};
