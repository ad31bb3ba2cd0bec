//! # In-Memory OTP Store
//!
//! Pending login challenges keyed by canonical email.

use crate::domain::entities::OneTimeCode;
use crate::infrastructure::persistence::traits::{OtpStore, RepositoryResult};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory implementation of [`OtpStore`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryOtpStore {
    storage: Arc<RwLock<HashMap<String, OneTimeCode>>>,
}

impl InMemoryOtpStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops expired challenges and returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut storage = self.storage.write().await;
        let before = storage.len();
        storage.retain(|_, code| !code.is_expired_at(now));
        before - storage.len()
    }
}

#[async_trait]
impl OtpStore for InMemoryOtpStore {
    async fn put(&self, code: OneTimeCode) -> RepositoryResult<()> {
        let mut storage = self.storage.write().await;
        storage.insert(code.email().to_string(), code);
        Ok(())
    }

    async fn get(&self, email: &str) -> RepositoryResult<Option<OneTimeCode>> {
        let storage = self.storage.read().await;
        Ok(storage.get(email).cloned())
    }

    async fn remove(&self, email: &str) -> RepositoryResult<bool> {
        let mut storage = self.storage.write().await;
        Ok(storage.remove(email).is_some())
    }
}
