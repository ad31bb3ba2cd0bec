//! # Application State
//!
//! Explicitly constructed services shared by every handler through
//! `State<Arc<AppState>>`.

use crate::api::middleware::auth::{DEFAULT_SESSION_TTL_SECS, SessionConfig};
use crate::application::error::ApplicationResult;
use crate::application::services::{ConfigCache, OtpService, RequestSigner};
use crate::application::use_cases::{
    AuthenticateUseCase, ManageCustomerUseCase, RequestQuoteUseCase, TrackTransactionUseCase,
};
use crate::config::AppConfig;
use crate::infrastructure::exchange::{ExchangeClient, ExchangeClientConfig, ExchangeGateway};
use crate::infrastructure::notifications::{LogOtpSender, OtpSender};
use crate::infrastructure::persistence::in_memory::{
    InMemoryCatalogSettings, InMemoryOtpStore, InMemoryTransactionRepository,
    InMemoryUserRepository,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Shared application state.
#[derive(Debug)]
pub struct AppState {
    /// Quote pricing.
    pub quotes: RequestQuoteUseCase,
    /// Email/OTP sign-in.
    pub auth: AuthenticateUseCase,
    /// Customer, KYC and fiat accounts.
    pub customers: ManageCustomerUseCase,
    /// Webhook-driven transactions.
    pub transactions: TrackTransactionUseCase,
    /// Catalog metadata and admin toggles.
    pub catalog: Arc<ConfigCache>,
    /// Session signing; `None` when no JWT secret is configured.
    pub session: Option<SessionConfig>,
    /// Webhook signature verification; `None` when no API secret is configured.
    pub webhook_verifier: Option<RequestSigner>,
    /// Live quote refresh interval in seconds.
    pub quote_refresh_secs: u32,
    /// Cancelled on shutdown; parent of every live quote countdown.
    pub shutdown: CancellationToken,
    otp_store: Arc<InMemoryOtpStore>,
}

impl AppState {
    /// Wires the state against the real provider client.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the provider base URL is invalid.
    pub fn from_config(config: &AppConfig) -> ApplicationResult<Self> {
        let client = ExchangeClient::new(
            ExchangeClientConfig::new(&config.upstream.base_url)
                .with_api_key(config.upstream.api_key.clone())
                .with_api_secret(config.upstream.api_secret.clone())
                .with_timeout_ms(config.upstream.timeout_ms),
        )?;
        Ok(Self::new(config, Arc::new(client), Arc::new(LogOtpSender)))
    }

    /// Wires the state with in-memory repositories and the given ports.
    #[must_use]
    pub fn new(
        config: &AppConfig,
        gateway: Arc<dyn ExchangeGateway>,
        otp_sender: Arc<dyn OtpSender>,
    ) -> Self {
        let users = Arc::new(InMemoryUserRepository::new());
        let otp_store = Arc::new(InMemoryOtpStore::new());

        let catalog = Arc::new(
            ConfigCache::new(gateway.clone(), Arc::new(InMemoryCatalogSettings::new()))
                .with_ttl(Duration::from_secs(config.quotes.catalog_ttl_secs)),
        );

        let quotes = RequestQuoteUseCase::new(gateway.clone())
            .with_catalog(catalog.clone())
            .with_preference(config.quotes.amount_preference);

        let otp = OtpService::new(otp_store.clone(), otp_sender)
            .with_ttl_secs(config.auth.otp_ttl_secs)
            .with_max_attempts(config.auth.otp_max_attempts);
        let auth = AuthenticateUseCase::new(users.clone(), otp)
            .with_admin_emails(config.auth.admin_emails.iter());

        let session_ttl =
            u64::try_from(config.auth.session_ttl_secs).unwrap_or(DEFAULT_SESSION_TTL_SECS);
        let session = SessionConfig::from_secret(config.auth.jwt_secret.as_deref())
            .ok()
            .map(|s| s.with_ttl_secs(session_ttl).with_secure(config.auth.secure_cookie));

        Self {
            quotes,
            auth,
            customers: ManageCustomerUseCase::new(users, gateway),
            transactions: TrackTransactionUseCase::new(Arc::new(
                InMemoryTransactionRepository::new(),
            )),
            catalog,
            session,
            webhook_verifier: RequestSigner::from_config(config.upstream.api_secret.as_deref())
                .ok(),
            quote_refresh_secs: config.quotes.refresh_secs,
            shutdown: CancellationToken::new(),
            otp_store,
        }
    }

    /// Drops expired login codes. Returns how many were removed.
    pub async fn purge_expired_codes(&self) -> usize {
        self.otp_store.purge_expired().await
    }
}
