//! # In-Memory User Repository
//!
//! In-memory implementation of [`UserRepository`].
//!
//! # Examples
//!
//! ```
//! use onramp_gateway::infrastructure::persistence::in_memory::InMemoryUserRepository;
//!
//! let repo = InMemoryUserRepository::new();
//! assert!(repo.is_empty());
//! ```

use crate::domain::entities::User;
use crate::domain::value_objects::UserId;
use crate::infrastructure::persistence::traits::{
    RepositoryError, RepositoryResult, UserRepository,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory implementation of [`UserRepository`].
///
/// Uses `Arc<RwLock<HashMap>>` for thread-safe access.
#[derive(Debug, Clone)]
pub struct InMemoryUserRepository {
    storage: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserRepository {
    /// Creates a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Returns the number of users.
    #[must_use]
    pub fn len(&self) -> usize {
        // try_read keeps this usable from sync contexts
        self.storage
            .try_read()
            .map(|guard| guard.len())
            .unwrap_or(0)
    }

    /// Returns true if no users are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn save(&self, user: &User) -> RepositoryResult<()> {
        let mut storage = self.storage.write().await;

        if storage
            .values()
            .any(|existing| existing.email() == user.email() && existing.id() != user.id())
        {
            return Err(RepositoryError::conflict("user", user.email()));
        }

        storage.insert(user.id(), user.clone());
        Ok(())
    }

    async fn get(&self, id: &UserId) -> RepositoryResult<Option<User>> {
        let storage = self.storage.read().await;
        Ok(storage.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let storage = self.storage.read().await;
        Ok(storage
            .values()
            .find(|user| user.email().eq_ignore_ascii_case(email))
            .cloned())
    }
}
