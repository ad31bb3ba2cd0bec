//! # Value Objects
//!
//! Immutable types with validation and domain semantics.
//!
//! ## Identity Types
//!
//! - [`UserId`]: UUID-based local identifier
//! - [`QuoteId`], [`ReferenceId`], [`CustomerId`]: upstream-issued identifiers
//!
//! ## Numeric Types
//!
//! - [`Amount`]: Non-negative decimal amount
//!
//! ## Domain Enums
//!
//! - [`Role`], [`KycLevel`], [`KycStatus`], [`TransactionKind`]
//!
//! ## State Types
//!
//! - [`TransactionStatus`]: Transaction lifecycle state machine

pub mod amount;
pub mod enums;
pub mod ids;
pub mod transaction_status;

pub use amount::Amount;
pub use enums::{KycLevel, KycStatus, ParseEnumError, Role, TransactionKind};
pub use ids::{CustomerId, QuoteId, ReferenceId, UserId};
pub use transaction_status::{ParseStatusError, TransactionStatus};
