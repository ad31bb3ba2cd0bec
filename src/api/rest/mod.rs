//! # REST API
//!
//! JSON endpoints for the catalog, quotes, sessions, customers,
//! transactions and the admin console.

pub mod handlers;
pub mod routes;

pub use handlers::{ErrorResponse, HealthResponse};
pub use routes::create_router;
