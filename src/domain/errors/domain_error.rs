//! # Domain Errors
//!
//! Typed domain error definitions.
//!
//! This module provides the [`DomainError`] enum for representing
//! domain-level errors with numeric error codes.
//!
//! # Error Code Ranges
//!
//! - **1000-1999**: Validation errors
//! - **2000-2999**: State errors
//!
//! # Examples
//!
//! ```
//! use onramp_gateway::domain::errors::DomainError;
//!
//! let error = DomainError::InvalidAmount("amount must be positive".to_string());
//! assert_eq!(error.code(), 1001);
//! ```

use crate::domain::value_objects::transaction_status::TransactionStatus;
use thiserror::Error;

/// Domain-level error with numeric error codes.
///
/// | Range | Category |
/// |-------|----------|
/// | 1000-1999 | Validation errors |
/// | 2000-2999 | State errors |
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    // ========================================================================
    // Validation Errors (1000-1999)
    // ========================================================================
    /// Invalid amount value.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Neither a source nor a target amount was supplied.
    #[error("either fromAmount or toAmount is required")]
    MissingAmount,

    /// Invalid or missing currency code.
    #[error("invalid currency: {0}")]
    InvalidCurrency(String),

    /// Malformed email address.
    #[error("invalid email: {0}")]
    InvalidEmail(String),

    /// Invalid identifier.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// Generic validation error.
    #[error("validation error: {0}")]
    ValidationError(String),

    // ========================================================================
    // State Errors (2000-2999)
    // ========================================================================
    /// Invalid status transition attempted.
    #[error("invalid status transition from {from} to {to}")]
    InvalidStatusTransition {
        /// The current status.
        from: TransactionStatus,
        /// The attempted target status.
        to: TransactionStatus,
    },

    /// Event applied to a different transaction.
    #[error("reference mismatch: expected {expected}, got {actual}")]
    ReferenceMismatch {
        /// Reference of the transaction.
        expected: String,
        /// Reference carried by the event.
        actual: String,
    },

    /// Quote has expired.
    #[error("quote expired: {0}")]
    QuoteExpired(String),

    /// Operation not allowed in current state.
    #[error("operation not allowed: {0}")]
    OperationNotAllowed(String),
}

impl DomainError {
    /// Returns the numeric error code.
    ///
    /// ```
    /// use onramp_gateway::domain::errors::DomainError;
    ///
    /// assert_eq!(DomainError::MissingAmount.code(), 1002);
    /// ```
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::InvalidAmount(_) => 1001,
            Self::MissingAmount => 1002,
            Self::InvalidCurrency(_) => 1003,
            Self::InvalidEmail(_) => 1004,
            Self::InvalidId(_) => 1005,
            Self::ValidationError(_) => 1099,

            Self::InvalidStatusTransition { .. } => 2001,
            Self::ReferenceMismatch { .. } => 2002,
            Self::QuoteExpired(_) => 2003,
            Self::OperationNotAllowed(_) => 2099,
        }
    }

    /// Returns true for validation errors (1000-1999).
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        let code = self.code();
        code >= 1000 && code < 2000
    }

    /// Returns true for state errors (2000-2999).
    #[must_use]
    pub const fn is_state(&self) -> bool {
        let code = self.code();
        code >= 2000 && code < 3000
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_codes_in_range() {
        for err in [
            DomainError::InvalidAmount("x".into()),
            DomainError::MissingAmount,
            DomainError::InvalidCurrency("x".into()),
            DomainError::InvalidEmail("x".into()),
            DomainError::InvalidId("x".into()),
            DomainError::validation("x"),
        ] {
            assert!(err.is_validation(), "{err:?}");
            assert!(!err.is_state());
        }
    }

    #[test]
    fn state_codes_in_range() {
        let err = DomainError::InvalidStatusTransition {
            from: TransactionStatus::Pending,
            to: TransactionStatus::Completed,
        };
        assert!(err.is_state());
        assert_eq!(err.code(), 2001);
        assert_eq!(
            err.to_string(),
            "invalid status transition from pending to completed"
        );
    }
}
