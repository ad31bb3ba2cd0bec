//! # Track Transaction Use Case
//!
//! Applies provider webhook events to tracked transactions and serves them
//! back to their owners.

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::domain::entities::{EventOutcome, Transaction, TransactionEvent, User};
use crate::domain::value_objects::{ReferenceId, TransactionStatus};
use crate::infrastructure::persistence::TransactionRepository;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Result of handling one webhook event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// First event for the reference; transaction created as `pending`.
    Created,
    /// Status moved forward.
    Advanced {
        /// Previous status.
        from: TransactionStatus,
        /// New status.
        to: TransactionStatus,
    },
    /// Repeat of the current status.
    Duplicate,
}

impl From<EventOutcome> for WebhookOutcome {
    fn from(outcome: EventOutcome) -> Self {
        match outcome {
            EventOutcome::Advanced { from, to } => Self::Advanced { from, to },
            EventOutcome::Duplicate => Self::Duplicate,
        }
    }
}

/// Use case for transaction tracking.
#[derive(Debug, Clone)]
pub struct TrackTransactionUseCase {
    repository: Arc<dyn TransactionRepository>,
    // Serializes read-modify-write of event application.
    write_lock: Arc<Mutex<()>>,
}

impl TrackTransactionUseCase {
    /// Creates the use case.
    #[must_use]
    pub fn new(repository: Arc<dyn TransactionRepository>) -> Self {
        Self {
            repository,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Applies a verified webhook event.
    ///
    /// # Errors
    ///
    /// - `DomainError::InvalidStatusTransition` if an unknown reference does
    ///   not start at `pending`, or the event skips a step
    /// - `DomainError::InvalidId` for a blank reference
    #[instrument(skip(self, event), fields(reference_id = %event.reference_id, status = %event.status))]
    pub async fn handle_event(
        &self,
        event: TransactionEvent,
    ) -> ApplicationResult<(Transaction, WebhookOutcome)> {
        let _guard = self.write_lock.lock().await;

        let (transaction, outcome) = match self.repository.get(&event.reference_id).await? {
            None => (Transaction::open(event)?, WebhookOutcome::Created),
            Some(mut transaction) => {
                let outcome = transaction
                    .apply(event)
                    .inspect_err(|e| warn!(error = %e, "webhook event rejected"))?;
                (transaction, outcome.into())
            }
        };
        self.repository.save(&transaction).await?;

        match outcome {
            WebhookOutcome::Duplicate => debug!("duplicate event"),
            _ => info!(?outcome, "transaction updated"),
        }
        Ok((transaction, outcome))
    }

    /// Returns a transaction if `requester` may see it.
    ///
    /// Admins see every transaction. Other users see only transactions of
    /// their own customer; anything else reads as not found.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::NotFound` if the transaction is missing or
    /// not visible to the requester.
    #[instrument(skip(self, requester), fields(user_id = %requester.id()))]
    pub async fn get_for(
        &self,
        reference_id: &ReferenceId,
        requester: &User,
    ) -> ApplicationResult<Transaction> {
        let not_found = || ApplicationError::not_found("transaction", reference_id.to_string());
        let transaction = self.repository.get(reference_id).await?.ok_or_else(not_found)?;

        let owns = requester.customer_id().is_some()
            && transaction.customer_id() == requester.customer_id();
        if owns || requester.role().is_admin() {
            Ok(transaction)
        } else {
            Err(not_found())
        }
    }

    /// Transactions of the requester's customer, newest first.
    ///
    /// # Errors
    ///
    /// Returns a repository error if the lookup fails.
    pub async fn list_for(&self, requester: &User) -> ApplicationResult<Vec<Transaction>> {
        match requester.customer_id() {
            Some(customer_id) => Ok(self.repository.find_by_customer(customer_id).await?),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::errors::DomainError;
    use crate::domain::value_objects::{CustomerId, KycLevel, KycStatus, Role};
    use crate::infrastructure::persistence::in_memory::InMemoryTransactionRepository;

    fn use_case() -> TrackTransactionUseCase {
        TrackTransactionUseCase::new(Arc::new(InMemoryTransactionRepository::new()))
    }

    fn event(status: TransactionStatus) -> TransactionEvent {
        let mut event = TransactionEvent::new("ref-1", status);
        event.customer_id = Some(CustomerId::new("cus-1"));
        event
    }

    fn user_with_customer(customer: Option<&str>, role: Role) -> User {
        let mut user = User::new("kim@example.com", role).unwrap();
        if let Some(id) = customer {
            user.link_customer(CustomerId::new(id), KycLevel::Basic, KycStatus::Approved)
                .unwrap();
        }
        user
    }

    mod events {
        use super::*;

        #[tokio::test]
        async fn pending_creates_transaction() {
            let use_case = use_case();
            let (tx, outcome) = use_case
                .handle_event(event(TransactionStatus::Pending))
                .await
                .unwrap();
            assert_eq!(outcome, WebhookOutcome::Created);
            assert_eq!(tx.status(), TransactionStatus::Pending);
        }

        #[tokio::test]
        async fn unknown_reference_must_start_pending() {
            let use_case = use_case();
            let err = use_case
                .handle_event(event(TransactionStatus::Completed))
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                ApplicationError::Domain(DomainError::InvalidStatusTransition { .. })
            ));
        }

        #[tokio::test]
        async fn forward_sequence_reaches_completed() {
            let use_case = use_case();
            for status in [
                TransactionStatus::Pending,
                TransactionStatus::PaymentReceived,
                TransactionStatus::TradeCompleted,
                TransactionStatus::WithdrawalInitiated,
                TransactionStatus::Completed,
            ] {
                use_case.handle_event(event(status)).await.unwrap();
            }
            let admin = user_with_customer(None, Role::Admin);
            let tx = use_case
                .get_for(&ReferenceId::new("ref-1"), &admin)
                .await
                .unwrap();
            assert_eq!(tx.status(), TransactionStatus::Completed);
        }

        #[tokio::test]
        async fn skipping_a_step_is_rejected() {
            let use_case = use_case();
            use_case
                .handle_event(event(TransactionStatus::Pending))
                .await
                .unwrap();
            let err = use_case
                .handle_event(event(TransactionStatus::TradeCompleted))
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                ApplicationError::Domain(DomainError::InvalidStatusTransition { .. })
            ));
        }

        #[tokio::test]
        async fn repeated_status_is_duplicate() {
            let use_case = use_case();
            use_case
                .handle_event(event(TransactionStatus::Pending))
                .await
                .unwrap();
            let (_, outcome) = use_case
                .handle_event(event(TransactionStatus::Pending))
                .await
                .unwrap();
            assert_eq!(outcome, WebhookOutcome::Duplicate);
        }

        #[tokio::test]
        async fn failed_records_reason() {
            let use_case = use_case();
            use_case
                .handle_event(event(TransactionStatus::Pending))
                .await
                .unwrap();
            let mut failed = event(TransactionStatus::Failed);
            failed.failure_reason = Some("card declined".into());
            let (tx, outcome) = use_case.handle_event(failed).await.unwrap();

            assert_eq!(
                outcome,
                WebhookOutcome::Advanced {
                    from: TransactionStatus::Pending,
                    to: TransactionStatus::Failed
                }
            );
            assert_eq!(tx.failure_reason(), Some("card declined"));
        }
    }

    mod visibility {
        use super::*;

        async fn seeded() -> TrackTransactionUseCase {
            let use_case = use_case();
            use_case
                .handle_event(event(TransactionStatus::Pending))
                .await
                .unwrap();
            use_case
        }

        #[tokio::test]
        async fn owner_sees_transaction() {
            let use_case = seeded().await;
            let owner = user_with_customer(Some("cus-1"), Role::User);
            assert!(use_case.get_for(&"ref-1".into(), &owner).await.is_ok());
            assert_eq!(use_case.list_for(&owner).await.unwrap().len(), 1);
        }

        #[tokio::test]
        async fn stranger_gets_not_found() {
            let use_case = seeded().await;
            for stranger in [
                user_with_customer(Some("cus-2"), Role::User),
                user_with_customer(None, Role::User),
            ] {
                let err = use_case
                    .get_for(&"ref-1".into(), &stranger)
                    .await
                    .unwrap_err();
                assert!(matches!(err, ApplicationError::NotFound { .. }));
            }
        }

        #[tokio::test]
        async fn missing_reference_not_found() {
            let use_case = seeded().await;
            let admin = user_with_customer(None, Role::Admin);
            assert!(use_case.get_for(&"nope".into(), &admin).await.is_err());
        }
    }
}
