//! # Onramp Gateway
//!
//! Backend for a fiat-to-crypto onramp and offramp frontend. Prices quotes
//! against an exchange provider with HMAC-signed requests, streams live
//! quotes with a refresh countdown, signs users in by email code, tracks
//! transactions from provider webhooks and serves an admin console for the
//! asset and payment method catalog.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain`): Quotes, transactions, users, catalog, value objects
//! - **Application Layer** (`application`): Use cases, signer, countdown, catalog cache
//! - **Infrastructure Layer** (`infrastructure`): Exchange client, repositories, code delivery
//! - **API Layer** (`api`): REST and WebSocket interfaces
//!
//! ## Example
//!
//! ```rust,ignore
//! use onramp_gateway::api::{AppState, create_router};
//! use onramp_gateway::config::AppConfig;
//! use std::sync::Arc;
//!
//! let config = AppConfig::load()?;
//! let state = Arc::new(AppState::from_config(&config)?);
//! let router = create_router(state, &config.rest);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod api;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
