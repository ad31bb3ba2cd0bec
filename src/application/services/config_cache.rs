//! # Configuration Cache
//!
//! Holds the provider catalog between fetches and applies admin toggles.
//!
//! The upstream catalog is refetched when older than the TTL or when
//! [`ConfigCache::refresh`] is called. Admin toggles are read from the
//! settings repository on every access, so a toggle is visible immediately.
//! If a TTL refetch fails while an older catalog is held, the older catalog
//! is served and the failure logged. A forced refresh reports the failure.

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::domain::entities::{Catalog, CryptoToggle, Cryptocurrency, PaymentMethod};
use crate::domain::value_objects::TransactionKind;
use crate::infrastructure::exchange::ExchangeGateway;
use crate::infrastructure::persistence::CatalogSettingsRepository;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{info, instrument, warn};

/// Default catalog TTL in seconds.
pub const DEFAULT_CATALOG_TTL_SECS: u64 = 300;

#[derive(Debug, Clone)]
struct Snapshot {
    catalog: Catalog,
    fetched: Instant,
    fetched_at: DateTime<Utc>,
}

/// Cached provider catalog with admin overlay.
pub struct ConfigCache {
    gateway: Arc<dyn ExchangeGateway>,
    settings: Arc<dyn CatalogSettingsRepository>,
    ttl: Duration,
    snapshot: RwLock<Option<Snapshot>>,
    fetch_lock: Mutex<()>,
}

impl fmt::Debug for ConfigCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigCache")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl ConfigCache {
    /// Creates an empty cache with the default TTL.
    #[must_use]
    pub fn new(
        gateway: Arc<dyn ExchangeGateway>,
        settings: Arc<dyn CatalogSettingsRepository>,
    ) -> Self {
        Self {
            gateway,
            settings,
            ttl: Duration::from_secs(DEFAULT_CATALOG_TTL_SECS),
            snapshot: RwLock::new(None),
            fetch_lock: Mutex::new(()),
        }
    }

    /// Sets the TTL.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Settings repository holding the admin toggles.
    #[must_use]
    pub fn settings(&self) -> &Arc<dyn CatalogSettingsRepository> {
        &self.settings
    }

    async fn fresh_snapshot(&self) -> Option<Snapshot> {
        let snapshot = self.snapshot.read().await;
        snapshot
            .as_ref()
            .filter(|s| s.fetched.elapsed() < self.ttl)
            .cloned()
    }

    async fn upstream(&self, force: bool) -> ApplicationResult<Snapshot> {
        if !force && let Some(snapshot) = self.fresh_snapshot().await {
            return Ok(snapshot);
        }

        let _guard = self.fetch_lock.lock().await;
        // Another caller may have fetched while we waited.
        if !force && let Some(snapshot) = self.fresh_snapshot().await {
            return Ok(snapshot);
        }

        match self.gateway.fetch_catalog().await {
            Ok(catalog) => {
                info!(
                    countries = catalog.countries.len(),
                    cryptocurrencies = catalog.cryptocurrencies.len(),
                    payment_methods = catalog.payment_methods.len(),
                    "catalog fetched"
                );
                let snapshot = Snapshot {
                    catalog,
                    fetched: Instant::now(),
                    fetched_at: Utc::now(),
                };
                *self.snapshot.write().await = Some(snapshot.clone());
                Ok(snapshot)
            }
            Err(err) => {
                if !force && let Some(stale) = self.snapshot.read().await.clone() {
                    warn!(
                        error = %err,
                        fetched_at = %stale.fetched_at,
                        "catalog refresh failed, serving stale copy"
                    );
                    return Ok(stale);
                }
                Err(err.into())
            }
        }
    }

    /// Full catalog with admin toggles applied, disabled entries included.
    ///
    /// # Errors
    ///
    /// Returns an upstream error if no catalog is held and the fetch fails,
    /// or a repository error if the toggles cannot be read.
    pub async fn catalog(&self) -> ApplicationResult<Catalog> {
        let snapshot = self.upstream(false).await?;
        let overrides = self.settings.load().await?;
        Ok(snapshot.catalog.with_overrides(&overrides))
    }

    /// Catalog as shown to end users: toggles applied, disabled entries removed.
    ///
    /// # Errors
    ///
    /// See [`ConfigCache::catalog`].
    pub async fn public_catalog(&self) -> ApplicationResult<Catalog> {
        Ok(self.catalog().await?.enabled_only())
    }

    /// Enabled cryptocurrencies tradeable in `kind`, optionally restricted to
    /// a served country.
    ///
    /// # Errors
    ///
    /// See [`ConfigCache::catalog`].
    pub async fn tradeable(
        &self,
        kind: TransactionKind,
        country: Option<&str>,
    ) -> ApplicationResult<Vec<Cryptocurrency>> {
        let catalog = self.public_catalog().await?;
        if let Some(country) = country
            && !catalog.serves_country(country)
        {
            return Ok(Vec::new());
        }
        Ok(catalog.tradeable(kind))
    }

    /// Enabled payment methods for a country and currency.
    ///
    /// # Errors
    ///
    /// See [`ConfigCache::catalog`].
    pub async fn payment_methods(
        &self,
        country: Option<&str>,
        currency: Option<&str>,
    ) -> ApplicationResult<Vec<PaymentMethod>> {
        let catalog = self.public_catalog().await?;
        Ok(catalog.payment_methods_for(country, currency))
    }

    /// Refetches the upstream catalog regardless of age.
    ///
    /// # Errors
    ///
    /// Returns an upstream error if the fetch fails, even when an older
    /// catalog is held, or a repository error if the toggles cannot be read.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> ApplicationResult<Catalog> {
        let snapshot = self.upstream(true).await?;
        let overrides = self.settings.load().await?;
        Ok(snapshot.catalog.with_overrides(&overrides))
    }

    /// Drops the held catalog so the next read refetches.
    pub async fn invalidate(&self) {
        *self.snapshot.write().await = None;
    }

    /// When the held catalog was fetched, if any.
    pub async fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.snapshot.read().await.as_ref().map(|s| s.fetched_at)
    }

    /// Applies an admin toggle to a cryptocurrency and returns the updated entry.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::NotFound` if the code is not in the catalog.
    pub async fn toggle_cryptocurrency(
        &self,
        code: &str,
        toggle: CryptoToggle,
    ) -> ApplicationResult<Cryptocurrency> {
        let snapshot = self.upstream(false).await?;
        if snapshot.catalog.cryptocurrency(code).is_none() {
            return Err(ApplicationError::not_found("cryptocurrency", code));
        }
        self.settings.set_cryptocurrency(code, toggle).await?;
        self.catalog()
            .await?
            .cryptocurrency(code)
            .cloned()
            .ok_or_else(|| ApplicationError::not_found("cryptocurrency", code))
    }

    /// Enables or disables a payment method and returns the updated entry.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::NotFound` if the type is not in the catalog.
    pub async fn toggle_payment_method(
        &self,
        method_type: &str,
        enabled: bool,
    ) -> ApplicationResult<PaymentMethod> {
        let snapshot = self.upstream(false).await?;
        if snapshot.catalog.payment_method(method_type).is_none() {
            return Err(ApplicationError::not_found("payment method", method_type));
        }
        self.settings.set_payment_method(method_type, enabled).await?;
        self.catalog()
            .await?
            .payment_method(method_type)
            .cloned()
            .ok_or_else(|| ApplicationError::not_found("payment method", method_type))
    }
}
