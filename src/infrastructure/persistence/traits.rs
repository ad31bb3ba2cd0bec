//! # Repository Traits
//!
//! Storage ports used by the application layer.
//!
//! Only in-memory implementations ship with the service; a database-backed
//! implementation plugs in behind the same traits.

use crate::domain::entities::{CatalogOverrides, CryptoToggle, OneTimeCode, Transaction, User};
use crate::domain::value_objects::{CustomerId, ReferenceId, UserId};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Storage failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// Query or connection failure.
    #[error("query failed: {0}")]
    Query(String),

    /// A uniqueness constraint would be violated.
    #[error("{entity} already exists: {key}")]
    Conflict {
        /// Entity type.
        entity: &'static str,
        /// Conflicting key.
        key: String,
    },

    /// Stored data could not be (de)serialized.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl RepositoryError {
    /// Creates a query error.
    #[must_use]
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query(message.into())
    }

    /// Creates a conflict error.
    #[must_use]
    pub fn conflict(entity: &'static str, key: impl Into<String>) -> Self {
        Self::Conflict {
            entity,
            key: key.into(),
        }
    }

    /// Creates a serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }
}

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// User storage.
#[async_trait]
pub trait UserRepository: Send + Sync + fmt::Debug {
    /// Inserts or replaces a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if another user owns the email.
    async fn save(&self, user: &User) -> RepositoryResult<()>;

    /// Finds a user by ID.
    async fn get(&self, id: &UserId) -> RepositoryResult<Option<User>>;

    /// Finds a user by canonical email.
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;
}

/// Transaction storage.
#[async_trait]
pub trait TransactionRepository: Send + Sync + fmt::Debug {
    /// Inserts or replaces a transaction.
    async fn save(&self, transaction: &Transaction) -> RepositoryResult<()>;

    /// Finds a transaction by reference.
    async fn get(&self, reference_id: &ReferenceId) -> RepositoryResult<Option<Transaction>>;

    /// Lists a customer's transactions, newest first.
    async fn find_by_customer(&self, customer_id: &CustomerId)
    -> RepositoryResult<Vec<Transaction>>;
}

/// Pending login challenges, one per email.
#[async_trait]
pub trait OtpStore: Send + Sync + fmt::Debug {
    /// Stores a challenge, replacing any previous one for the same email.
    async fn put(&self, code: OneTimeCode) -> RepositoryResult<()>;

    /// Finds the challenge for an email.
    async fn get(&self, email: &str) -> RepositoryResult<Option<OneTimeCode>>;

    /// Removes the challenge for an email, returning true if one existed.
    async fn remove(&self, email: &str) -> RepositoryResult<bool>;
}

/// Admin toggles over the provider catalog.
#[async_trait]
pub trait CatalogSettingsRepository: Send + Sync + fmt::Debug {
    /// Loads all toggles.
    async fn load(&self) -> RepositoryResult<CatalogOverrides>;

    /// Merges a toggle into the stored one for a crypto code and returns the result.
    async fn set_cryptocurrency(
        &self,
        code: &str,
        toggle: CryptoToggle,
    ) -> RepositoryResult<CryptoToggle>;

    /// Sets the enable flag of a payment method.
    async fn set_payment_method(&self, method_type: &str, enabled: bool) -> RepositoryResult<()>;
}
