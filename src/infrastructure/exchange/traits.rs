//! # Exchange Gateway Trait
//!
//! The operations the service needs from the exchange provider.

use crate::application::error::UpstreamError;
use crate::domain::entities::{
    Catalog, CustomerProfile, FiatAccount, NewFiatAccount, NormalizedQuoteRequest, Quote,
};
use crate::domain::value_objects::CustomerId;
use async_trait::async_trait;
use std::fmt;

/// Result type for upstream calls.
pub type UpstreamResult<T> = Result<T, UpstreamError>;

/// Access to the exchange provider's external API.
///
/// Implementations perform exactly one upstream request per call; retries
/// are left to the caller.
#[async_trait]
pub trait ExchangeGateway: Send + Sync + fmt::Debug {
    /// Prices a normalized quote request.
    async fn create_quote(&self, request: &NormalizedQuoteRequest) -> UpstreamResult<Quote>;

    /// Creates a customer for an email address.
    async fn create_customer(&self, email: &str) -> UpstreamResult<CustomerProfile>;

    /// Lists a customer's fiat accounts.
    async fn list_fiat_accounts(&self, customer_id: &CustomerId)
    -> UpstreamResult<Vec<FiatAccount>>;

    /// Registers a fiat account for a customer.
    async fn create_fiat_account(
        &self,
        customer_id: &CustomerId,
        account: &NewFiatAccount,
    ) -> UpstreamResult<FiatAccount>;

    /// Fetches country, cryptocurrency and payment-method metadata.
    async fn fetch_catalog(&self) -> UpstreamResult<Catalog>;
}
