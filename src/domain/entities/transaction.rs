//! # Transaction Entity
//!
//! A buy or sell moving through the provider's pipeline.
//!
//! Transactions are created and advanced only by upstream webhook events
//! ([`TransactionEvent`]); the application never edits them otherwise.

use crate::domain::entities::quote::Fee;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::{
    Amount, CustomerId, ReferenceId, TransactionKind, TransactionStatus,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An upstream status event for one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEvent {
    /// Transaction reference.
    pub reference_id: ReferenceId,
    /// Status reported by the event.
    pub status: TransactionStatus,
    /// Onramp or offramp.
    #[serde(default)]
    pub kind: TransactionKind,
    /// Upstream customer that owns the transaction.
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
    /// Fiat currency.
    #[serde(default)]
    pub fiat_currency: Option<String>,
    /// Fiat amount.
    #[serde(default)]
    pub fiat_amount: Option<Amount>,
    /// Crypto currency.
    #[serde(default)]
    pub crypto_currency: Option<String>,
    /// Crypto amount.
    #[serde(default)]
    pub crypto_amount: Option<Amount>,
    /// Fees charged so far.
    #[serde(default)]
    pub fees: Option<Vec<Fee>>,
    /// On-chain transaction hash, once broadcast.
    #[serde(default)]
    pub tx_hash: Option<String>,
    /// Failure reason for `failed` events.
    #[serde(default)]
    pub failure_reason: Option<String>,
}

impl TransactionEvent {
    /// Creates a bare event with only a reference and status.
    #[must_use]
    pub fn new(reference_id: impl Into<ReferenceId>, status: TransactionStatus) -> Self {
        Self {
            reference_id: reference_id.into(),
            status,
            kind: TransactionKind::default(),
            customer_id: None,
            fiat_currency: None,
            fiat_amount: None,
            crypto_currency: None,
            crypto_amount: None,
            fees: None,
            tx_hash: None,
            failure_reason: None,
        }
    }
}

/// Outcome of applying an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// The status advanced.
    Advanced {
        /// Previous status.
        from: TransactionStatus,
        /// New status.
        to: TransactionStatus,
    },
    /// The event repeated the current status; details may have been refreshed.
    Duplicate,
}

/// A tracked transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    reference_id: ReferenceId,
    kind: TransactionKind,
    status: TransactionStatus,
    customer_id: Option<CustomerId>,
    fiat_currency: Option<String>,
    fiat_amount: Option<Amount>,
    crypto_currency: Option<String>,
    crypto_amount: Option<Amount>,
    fees: Vec<Fee>,
    tx_hash: Option<String>,
    failure_reason: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Creates a transaction from its first event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStatusTransition` if the event is not
    /// `pending`, and `DomainError::InvalidId` if the reference is blank.
    pub fn open(event: TransactionEvent) -> DomainResult<Self> {
        if event.reference_id.is_blank() {
            return Err(DomainError::InvalidId("referenceId is required".to_string()));
        }
        if event.status != TransactionStatus::Pending {
            return Err(DomainError::InvalidStatusTransition {
                from: TransactionStatus::Pending,
                to: event.status,
            });
        }

        let now = Utc::now();
        Ok(Self {
            reference_id: event.reference_id,
            kind: event.kind,
            status: TransactionStatus::Pending,
            customer_id: event.customer_id,
            fiat_currency: event.fiat_currency,
            fiat_amount: event.fiat_amount,
            crypto_currency: event.crypto_currency,
            crypto_amount: event.crypto_amount,
            fees: event.fees.unwrap_or_default(),
            tx_hash: event.tx_hash,
            failure_reason: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Applies a subsequent event.
    ///
    /// A repeat of the current status refreshes details and reports
    /// [`EventOutcome::Duplicate`]. Terminal transactions accept duplicates
    /// only.
    ///
    /// # Errors
    ///
    /// - `DomainError::ReferenceMismatch` if the event targets another transaction
    /// - `DomainError::InvalidStatusTransition` if the state machine forbids the move
    pub fn apply(&mut self, event: TransactionEvent) -> DomainResult<EventOutcome> {
        if event.reference_id != self.reference_id {
            return Err(DomainError::ReferenceMismatch {
                expected: self.reference_id.to_string(),
                actual: event.reference_id.to_string(),
            });
        }

        let from = self.status;
        let outcome = if event.status == from {
            if from.is_terminal() {
                return Ok(EventOutcome::Duplicate);
            }
            EventOutcome::Duplicate
        } else if from.can_transition_to(event.status) {
            self.status = event.status;
            EventOutcome::Advanced {
                from,
                to: event.status,
            }
        } else {
            return Err(DomainError::InvalidStatusTransition {
                from,
                to: event.status,
            });
        };

        self.merge_details(event);
        self.updated_at = Utc::now();
        Ok(outcome)
    }

    fn merge_details(&mut self, event: TransactionEvent) {
        if event.customer_id.is_some() {
            self.customer_id = event.customer_id;
        }
        if event.fiat_currency.is_some() {
            self.fiat_currency = event.fiat_currency;
        }
        if event.fiat_amount.is_some() {
            self.fiat_amount = event.fiat_amount;
        }
        if event.crypto_currency.is_some() {
            self.crypto_currency = event.crypto_currency;
        }
        if event.crypto_amount.is_some() {
            self.crypto_amount = event.crypto_amount;
        }
        if let Some(fees) = event.fees {
            self.fees = fees;
        }
        if event.tx_hash.is_some() {
            self.tx_hash = event.tx_hash;
        }
        if self.status == TransactionStatus::Failed {
            self.failure_reason = event
                .failure_reason
                .or_else(|| self.failure_reason.take())
                .or_else(|| Some("unspecified failure".to_string()));
        }
    }

    /// Transaction reference.
    #[must_use]
    pub fn reference_id(&self) -> &ReferenceId {
        &self.reference_id
    }

    /// Onramp or offramp.
    #[must_use]
    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    /// Owning upstream customer.
    #[must_use]
    pub fn customer_id(&self) -> Option<&CustomerId> {
        self.customer_id.as_ref()
    }

    /// Fiat currency and amount, when known.
    #[must_use]
    pub fn fiat(&self) -> (Option<&str>, Option<Amount>) {
        (self.fiat_currency.as_deref(), self.fiat_amount)
    }

    /// Crypto currency and amount, when known.
    #[must_use]
    pub fn crypto(&self) -> (Option<&str>, Option<Amount>) {
        (self.crypto_currency.as_deref(), self.crypto_amount)
    }

    /// Fees charged.
    #[must_use]
    pub fn fees(&self) -> &[Fee] {
        &self.fees
    }

    /// On-chain transaction hash.
    #[must_use]
    pub fn tx_hash(&self) -> Option<&str> {
        self.tx_hash.as_deref()
    }

    /// Failure reason, set once failed.
    #[must_use]
    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    /// Creation time.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last update time.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
