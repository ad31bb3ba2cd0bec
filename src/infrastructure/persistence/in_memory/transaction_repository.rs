//! # In-Memory Transaction Repository
//!
//! In-memory implementation of [`TransactionRepository`].

use crate::domain::entities::Transaction;
use crate::domain::value_objects::{CustomerId, ReferenceId};
use crate::infrastructure::persistence::traits::{RepositoryResult, TransactionRepository};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory implementation of [`TransactionRepository`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryTransactionRepository {
    storage: Arc<RwLock<HashMap<ReferenceId, Transaction>>>,
}

impl InMemoryTransactionRepository {
    /// Creates a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of transactions.
    pub async fn count(&self) -> usize {
        self.storage.read().await.len()
    }
}

#[async_trait]
impl TransactionRepository for InMemoryTransactionRepository {
    async fn save(&self, transaction: &Transaction) -> RepositoryResult<()> {
        let mut storage = self.storage.write().await;
        storage.insert(transaction.reference_id().clone(), transaction.clone());
        Ok(())
    }

    async fn get(&self, reference_id: &ReferenceId) -> RepositoryResult<Option<Transaction>> {
        let storage = self.storage.read().await;
        Ok(storage.get(reference_id).cloned())
    }

    async fn find_by_customer(
        &self,
        customer_id: &CustomerId,
    ) -> RepositoryResult<Vec<Transaction>> {
        let storage = self.storage.read().await;
        let mut transactions: Vec<Transaction> = storage
            .values()
            .filter(|tx| tx.customer_id() == Some(customer_id))
            .cloned()
            .collect();
        transactions.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(transactions)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::entities::TransactionEvent;
    use crate::domain::value_objects::TransactionStatus;

    fn pending(reference: &str, customer: Option<&str>) -> Transaction {
        let mut event = TransactionEvent::new(reference, TransactionStatus::Pending);
        event.customer_id = customer.map(CustomerId::new);
        Transaction::open(event).unwrap()
    }

    #[tokio::test]
    async fn save_and_get() {
        let repo = InMemoryTransactionRepository::new();
        let tx = pending("ref-1", Some("c-1"));
        repo.save(&tx).await.unwrap();

        assert_eq!(repo.count().await, 1);
        assert_eq!(
            repo.get(&ReferenceId::new("ref-1")).await.unwrap().unwrap(),
            tx
        );
        assert!(repo.get(&ReferenceId::new("nope")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn find_by_customer_filters() {
        let repo = InMemoryTransactionRepository::new();
        repo.save(&pending("ref-1", Some("c-1"))).await.unwrap();
        repo.save(&pending("ref-2", Some("c-2"))).await.unwrap();
        repo.save(&pending("ref-3", None)).await.unwrap();

        let found = repo
            .find_by_customer(&CustomerId::new("c-1"))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].reference_id().as_str(), "ref-1");
    }
}
