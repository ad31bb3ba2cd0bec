//! # Request Quote Use Case
//!
//! Prices a client quote form against the exchange provider.
//!
//! This use case:
//! - Normalizes the form so exactly one amount is sent
//! - Rejects assets and payment methods switched off by an admin
//! - Forwards the request upstream and returns the priced quote

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::services::ConfigCache;
use crate::domain::entities::{AmountPreference, NormalizedQuoteRequest, Quote, QuoteRequest};
use crate::domain::value_objects::TransactionKind;
use crate::infrastructure::exchange::ExchangeGateway;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Use case for requesting a quote.
#[derive(Debug, Clone)]
pub struct RequestQuoteUseCase {
    gateway: Arc<dyn ExchangeGateway>,
    catalog: Option<Arc<ConfigCache>>,
    preference: AmountPreference,
}

impl RequestQuoteUseCase {
    /// Creates the use case with the default amount preference and no
    /// availability checks.
    #[must_use]
    pub fn new(gateway: Arc<dyn ExchangeGateway>) -> Self {
        Self {
            gateway,
            catalog: None,
            preference: AmountPreference::default(),
        }
    }

    /// Checks requests against the catalog before pricing.
    #[must_use]
    pub fn with_catalog(mut self, catalog: Arc<ConfigCache>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Sets which amount wins when both are supplied.
    #[must_use]
    pub fn with_preference(mut self, preference: AmountPreference) -> Self {
        self.preference = preference;
        self
    }

    /// Configured amount preference.
    #[must_use]
    pub fn preference(&self) -> AmountPreference {
        self.preference
    }

    /// Executes the use case.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The form fails normalization (missing amount, bad currency, ...)
    /// - The asset or payment method is disabled
    /// - The provider rejects the request or cannot be reached
    #[instrument(skip(self, request), fields(from = %request.from_currency, to = %request.to_currency))]
    pub async fn execute(&self, request: &QuoteRequest) -> ApplicationResult<Quote> {
        let normalized = request.normalize(self.preference)?;
        self.check_availability(&normalized).await?;

        let quote = self
            .gateway
            .create_quote(&normalized)
            .await
            .inspect_err(|e| warn!(error = %e, "quote request rejected"))?;

        info!(
            quote_id = %quote.id,
            rate = %quote.rate,
            expiration = %quote.expiration,
            "quote received"
        );
        Ok(quote)
    }

    async fn check_availability(&self, request: &NormalizedQuoteRequest) -> ApplicationResult<()> {
        let Some(cache) = &self.catalog else {
            return Ok(());
        };
        let catalog = match cache.catalog().await {
            Ok(catalog) => catalog,
            Err(e) => {
                // Pricing still works without metadata; the provider enforces its own limits.
                warn!(error = %e, "catalog unavailable, skipping availability check");
                return Ok(());
            }
        };

        let asset = catalog
            .cryptocurrency(request.to_currency())
            .map(|c| (c, TransactionKind::Onramp))
            .or_else(|| {
                catalog
                    .cryptocurrency(request.from_currency())
                    .map(|c| (c, TransactionKind::Offramp))
            });
        if let Some((crypto, kind)) = asset
            && !crypto.supports(kind)
        {
            return Err(ApplicationError::validation(format!(
                "{} is not available for {kind}",
                crypto.code
            )));
        }

        if let Some(method_type) = request.payment_method_type()
            && let Some(method) = catalog.payment_method(method_type)
            && !method.enabled
        {
            return Err(ApplicationError::validation(format!(
                "payment method {} is not available",
                method.method_type
            )));
        }
        Ok(())
    }
}
