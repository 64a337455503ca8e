//! MapChat HTTP server
//!
//! Thin axum layer over [`mapchat_core::ChatService`]: one chat endpoint, a config endpoint and
//! the bundled example maps.

pub mod error;
pub mod examples;
pub mod routes;

pub use error::ApiError;
pub use routes::{router, AppState};
