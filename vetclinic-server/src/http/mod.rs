//! HTTP server layer
//!
//! Axum server with:
//! - CORS (any origin unless an allow-list is configured)
//! - Request tracing
//! - Graceful shutdown
//! - JSON error responses

pub mod de;
pub mod error;
pub mod extractors;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use server::{build_router, run_server, AppState, ServerConfig, ServerError};
