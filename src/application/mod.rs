//! # Application Layer
//!
//! Use case orchestration and application services.
//!
//! This layer coordinates domain objects and infrastructure ports to perform
//! business operations.
//!
//! ## Use Cases
//!
//! - [`RequestQuoteUseCase`]: Normalize and price a quote form
//! - [`AuthenticateUseCase`]: Email + login code sign-in
//! - [`ManageCustomerUseCase`]: Provider customer, KYC and fiat accounts
//! - [`TrackTransactionUseCase`]: Webhook-driven transaction status
//!
//! ## Services
//!
//! - [`RequestSigner`]: HMAC request and webhook signatures
//! - [`ConfigCache`]: Catalog metadata with admin overrides
//! - [`spawn_countdown`]: Quote auto-refresh timer
//! - [`OtpService`]: Login code issue and verification

pub mod error;
pub mod services;
pub mod use_cases;

pub use error::{ApplicationError, ApplicationResult, UpstreamError};
pub use services::{
    ConfigCache, Countdown, CountdownCommand, CountdownHandle, OtpService, RequestSigner,
    SignerError, Tick, spawn_countdown,
};
pub use use_cases::{
    AuthenticateUseCase, KycSummary, ManageCustomerUseCase, RequestQuoteUseCase,
    TrackTransactionUseCase, WebhookOutcome,
};
