//! # In-Memory Catalog Settings
//!
//! Admin toggles over the provider catalog.

use crate::domain::entities::{CatalogOverrides, CryptoToggle};
use crate::infrastructure::persistence::traits::{CatalogSettingsRepository, RepositoryResult};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory implementation of [`CatalogSettingsRepository`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalogSettings {
    overrides: Arc<RwLock<CatalogOverrides>>,
}

impl InMemoryCatalogSettings {
    /// Creates an empty settings store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogSettingsRepository for InMemoryCatalogSettings {
    async fn load(&self) -> RepositoryResult<CatalogOverrides> {
        Ok(self.overrides.read().await.clone())
    }

    async fn set_cryptocurrency(
        &self,
        code: &str,
        toggle: CryptoToggle,
    ) -> RepositoryResult<CryptoToggle> {
        let mut overrides = self.overrides.write().await;
        let entry = overrides
            .cryptocurrencies
            .entry(CatalogOverrides::crypto_key(code))
            .or_default();
        *entry = entry.merge(toggle);
        Ok(*entry)
    }

    async fn set_payment_method(&self, method_type: &str, enabled: bool) -> RepositoryResult<()> {
        let mut overrides = self.overrides.write().await;
        overrides
            .payment_methods
            .insert(CatalogOverrides::method_key(method_type), enabled);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn toggles_merge_per_code() {
        let settings = InMemoryCatalogSettings::new();
        settings
            .set_cryptocurrency(
                "usdt-bep20",
                CryptoToggle {
                    enabled: Some(false),
                    ..CryptoToggle::default()
                },
            )
            .await
            .unwrap();
        let merged = settings
            .set_cryptocurrency(
                "USDT-BEP20",
                CryptoToggle {
                    onramp_enabled: Some(false),
                    ..CryptoToggle::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(merged.enabled, Some(false));
        assert_eq!(merged.onramp_enabled, Some(false));

        let overrides = settings.load().await.unwrap();
        assert_eq!(overrides.cryptocurrencies.len(), 1);
    }

    #[tokio::test]
    async fn payment_method_flag() {
        let settings = InMemoryCatalogSettings::new();
        settings.set_payment_method("Card", false).await.unwrap();
        let overrides = settings.load().await.unwrap();
        assert_eq!(overrides.payment_methods.get("card"), Some(&false));
    }
}
