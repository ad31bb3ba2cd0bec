//! # Domain Entities
//!
//! Entities representing core business concepts.
//!
//! ## Entities
//!
//! - [`Quote`]: Priced offer from the exchange provider
//! - [`QuoteRequest`]: Client quote form and its normalized form
//! - [`Transaction`]: Buy or sell tracked through webhook events
//! - [`User`]: End user with role and KYC state
//! - [`CustomerProfile`]: Provider customer linked to a user
//! - [`OneTimeCode`]: Pending email login challenge
//! - [`Catalog`]: Countries, cryptocurrencies and payment methods

pub mod catalog;
pub mod customer;
pub mod otp;
pub mod quote;
pub mod quote_request;
pub mod transaction;
pub mod user;

pub use catalog::{
    Catalog, CatalogOverrides, Country, CryptoToggle, Cryptocurrency, PaymentMethod,
};
pub use customer::{CustomerProfile, FiatAccount, NewFiatAccount};
pub use otp::{OneTimeCode, OtpCheck};
pub use quote::{Fee, Quote};
pub use quote_request::{AmountPreference, NormalizedQuoteRequest, QuoteAmount, QuoteRequest};
pub use transaction::{EventOutcome, Transaction, TransactionEvent};
pub use user::{User, normalize_email};
