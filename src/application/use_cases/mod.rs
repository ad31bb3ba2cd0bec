//! # Use Cases
//!
//! Application use cases implementing business workflows.
//!
//! Each use case orchestrates domain objects and ports to perform one
//! business operation, handling validation, persistence and logging.

pub mod authenticate;
pub mod manage_customer;
pub mod request_quote;
pub mod track_transaction;

pub use authenticate::AuthenticateUseCase;
pub use manage_customer::{KycSummary, ManageCustomerUseCase};
pub use request_quote::RequestQuoteUseCase;
pub use track_transaction::{TrackTransactionUseCase, WebhookOutcome};
