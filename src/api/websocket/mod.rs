//! # WebSocket API
//!
//! Live quote streaming.
//!
//! # Endpoint
//!
//! - `GET /api/quotes/live` - Quote inputs in, quotes and countdown ticks out

pub mod handlers;

pub use handlers::{IncomingMessage, OutgoingMessage, live_quotes};
