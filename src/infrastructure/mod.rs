//! # Infrastructure Layer
//!
//! External adapters and implementations of application ports.
//!
//! ## Exchange
//!
//! Signed HTTP client for the exchange provider's external API.
//!
//! ## Persistence
//!
//! Repository traits and in-memory implementations.
//!
//! ## Notifications
//!
//! Login code delivery.

pub mod exchange;
pub mod notifications;
pub mod persistence;
