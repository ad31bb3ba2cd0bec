//! # Exchange Provider
//!
//! Client for the upstream exchange provider's external API.
//!
//! - [`ExchangeGateway`]: the operations the application uses
//! - [`ExchangeClient`]: signed `reqwest` implementation
//! - [`dto`]: wire formats

pub mod client;
pub mod dto;
#[cfg(test)]
pub(crate) mod mock;
pub mod traits;

pub use client::{ExchangeClient, ExchangeClientConfig};
pub use traits::{ExchangeGateway, UpstreamResult};
