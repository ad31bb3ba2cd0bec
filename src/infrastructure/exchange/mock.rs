//! Scriptable [`ExchangeGateway`] for unit tests.

#![allow(clippy::unwrap_used)]

use crate::application::error::UpstreamError;
use crate::domain::entities::catalog::tests::sample_catalog;
use crate::domain::entities::{
    Catalog, CustomerProfile, FiatAccount, NewFiatAccount, NormalizedQuoteRequest, Quote,
};
use crate::domain::value_objects::{CustomerId, KycLevel, KycStatus, QuoteId};
use crate::infrastructure::exchange::traits::{ExchangeGateway, UpstreamResult};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug)]
pub(crate) struct MockExchange {
    pub(crate) catalog: Mutex<Catalog>,
    pub(crate) quote_error: Mutex<Option<UpstreamError>>,
    pub(crate) catalog_error: Mutex<Option<UpstreamError>>,
    pub(crate) last_quote: Mutex<Option<NormalizedQuoteRequest>>,
    pub(crate) accounts: Mutex<Vec<FiatAccount>>,
    pub(crate) quote_calls: AtomicUsize,
    pub(crate) catalog_calls: AtomicUsize,
    pub(crate) customer_calls: AtomicUsize,
}

impl Default for MockExchange {
    fn default() -> Self {
        Self {
            catalog: Mutex::new(sample_catalog()),
            quote_error: Mutex::new(None),
            catalog_error: Mutex::new(None),
            last_quote: Mutex::new(None),
            accounts: Mutex::new(Vec::new()),
            quote_calls: AtomicUsize::new(0),
            catalog_calls: AtomicUsize::new(0),
            customer_calls: AtomicUsize::new(0),
        }
    }
}

impl MockExchange {
    pub(crate) fn fail_quotes_with(&self, err: UpstreamError) {
        *self.quote_error.lock().unwrap() = Some(err);
    }

    pub(crate) fn fail_catalog_with(&self, err: Option<UpstreamError>) {
        *self.catalog_error.lock().unwrap() = err;
    }

    pub(crate) fn quote_calls(&self) -> usize {
        self.quote_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn catalog_calls(&self) -> usize {
        self.catalog_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExchangeGateway for MockExchange {
    async fn create_quote(&self, request: &NormalizedQuoteRequest) -> UpstreamResult<Quote> {
        self.quote_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_quote.lock().unwrap() = Some(request.clone());
        if let Some(err) = self.quote_error.lock().unwrap().clone() {
            return Err(err);
        }
        let amount = request.from_amount().or(request.to_amount()).unwrap();
        Ok(Quote {
            id: QuoteId::new(format!("q-{}", self.quote_calls())),
            from_currency: request.from_currency().to_string(),
            to_currency: request.to_currency().to_string(),
            from_amount: amount,
            to_amount: amount,
            payment_method_type: request.payment_method_type().unwrap_or("card").to_string(),
            rate: Decimal::ONE,
            fees: Vec::new(),
            expiration: Utc::now() + Duration::seconds(30),
            chain: request.chain().map(str::to_string),
        })
    }

    async fn create_customer(&self, _email: &str) -> UpstreamResult<CustomerProfile> {
        let n = self.customer_calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(CustomerProfile {
            id: CustomerId::new(format!("cus-{n}")),
            kyc_level: KycLevel::Basic,
            kyc_status: KycStatus::Pending,
        })
    }

    async fn list_fiat_accounts(
        &self,
        _customer_id: &CustomerId,
    ) -> UpstreamResult<Vec<FiatAccount>> {
        Ok(self.accounts.lock().unwrap().clone())
    }

    async fn create_fiat_account(
        &self,
        _customer_id: &CustomerId,
        account: &NewFiatAccount,
    ) -> UpstreamResult<FiatAccount> {
        let mut accounts = self.accounts.lock().unwrap();
        let created = FiatAccount {
            id: format!("fa-{}", accounts.len() + 1),
            account_type: account.account_type.clone(),
            currency: Some(account.currency.clone()),
            details: account.details.clone(),
        };
        accounts.push(created.clone());
        Ok(created)
    }

    async fn fetch_catalog(&self) -> UpstreamResult<Catalog> {
        self.catalog_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.catalog_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(self.catalog.lock().unwrap().clone())
    }
}
