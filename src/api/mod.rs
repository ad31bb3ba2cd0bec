//! # API Layer
//!
//! HTTP surface of the gateway.
//!
//! ## Protocols
//!
//! - **REST**: Catalog, quotes, sessions, customers, transactions, admin
//! - **WebSocket**: Live quotes with a refresh countdown
//!
//! ## Middleware
//!
//! - Session cookies (JWT)
//! - Request logging with request IDs

pub mod middleware;
pub mod rest;
pub mod state;
pub mod websocket;

pub use rest::create_router;
pub use state::AppState;
