//! # Login Code Service
//!
//! Issues and verifies six-digit email login codes.

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::domain::entities::otp::{OTP_DIGITS, is_well_formed};
use crate::domain::entities::{OneTimeCode, OtpCheck};
use crate::infrastructure::notifications::OtpSender;
use crate::infrastructure::persistence::OtpStore;
use chrono::{Duration, Utc};
use rand::Rng;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

/// Default code lifetime in seconds.
pub const DEFAULT_OTP_TTL_SECS: i64 = 300;

/// Default number of guesses per code.
pub const DEFAULT_OTP_MAX_ATTEMPTS: u32 = 5;

const REJECTED: &str = "invalid or expired code";

/// Generates a uniformly random zero-padded code.
#[must_use]
pub fn generate_code() -> String {
    let code: u32 = rand::rng().random_range(0..1_000_000);
    format!("{code:0width$}", width = OTP_DIGITS)
}

/// Issues and verifies login codes.
#[derive(Debug, Clone)]
pub struct OtpService {
    store: Arc<dyn OtpStore>,
    sender: Arc<dyn OtpSender>,
    ttl: Duration,
    max_attempts: u32,
    // Serializes issue and verify so attempt counts are never lost.
    write_lock: Arc<Mutex<()>>,
}

impl OtpService {
    /// Creates a service with the default lifetime and attempt limit.
    #[must_use]
    pub fn new(store: Arc<dyn OtpStore>, sender: Arc<dyn OtpSender>) -> Self {
        Self {
            store,
            sender,
            ttl: Duration::seconds(DEFAULT_OTP_TTL_SECS),
            max_attempts: DEFAULT_OTP_MAX_ATTEMPTS,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Sets the code lifetime.
    #[must_use]
    pub fn with_ttl_secs(mut self, secs: i64) -> Self {
        self.ttl = Duration::seconds(secs.max(1));
        self
    }

    /// Sets the attempt limit.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Creates a code for `email`, replacing any pending one, and sends it.
    ///
    /// `email` must already be canonical.
    ///
    /// # Errors
    ///
    /// Returns a repository error if the code cannot be stored, or
    /// `ApplicationError::Internal` if delivery fails.
    #[instrument(skip(self))]
    pub async fn issue(&self, email: &str) -> ApplicationResult<()> {
        let code = generate_code();
        let _guard = self.write_lock.lock().await;
        self.store
            .put(OneTimeCode::new(email, &code, self.ttl, self.max_attempts))
            .await?;

        if let Err(e) = self.sender.send(email, &code).await {
            warn!(error = %e, "login code delivery failed");
            self.store.remove(email).await?;
            return Err(ApplicationError::internal("could not deliver login code"));
        }
        debug!("login code issued");
        Ok(())
    }

    /// Checks a code for `email`. A correct code is consumed.
    ///
    /// # Errors
    ///
    /// - `ApplicationError::Validation` if the code is not six digits
    /// - `ApplicationError::Unauthorized` if the code is wrong, expired or exhausted
    #[instrument(skip(self, code))]
    pub async fn verify(&self, email: &str, code: &str) -> ApplicationResult<()> {
        let code = code.trim();
        if !is_well_formed(code) {
            return Err(ApplicationError::validation(format!(
                "code must be {OTP_DIGITS} digits"
            )));
        }

        let _guard = self.write_lock.lock().await;
        let Some(mut pending) = self.store.get(email).await? else {
            return Err(ApplicationError::unauthorized(REJECTED));
        };

        match pending.check_at(code, Utc::now()) {
            OtpCheck::Valid => {
                self.store.remove(email).await?;
                Ok(())
            }
            OtpCheck::Invalid { remaining } => {
                self.store.put(pending).await?;
                Err(ApplicationError::unauthorized(format!(
                    "invalid code, {remaining} attempts left"
                )))
            }
            OtpCheck::Exhausted => {
                self.store.remove(email).await?;
                Err(ApplicationError::unauthorized(REJECTED))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use crate::infrastructure::persistence::in_memory::InMemoryOtpStore;
    use async_trait::async_trait;
    use futures::future::join_all;
    use crate::infrastructure::persistence::traits::RepositoryResult;

    /// Captures delivered codes.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingSender {
        pub(crate) sent: Mutex<Vec<(String, String)>>,
    }

    impl RecordingSender {
        pub(crate) async fn last_code(&self) -> Option<String> {
            self.sent.lock().await.last().map(|(_, code)| code.clone())
        }
    }

    #[async_trait]
    impl OtpSender for RecordingSender {
        async fn send(&self, email: &str, code: &str) -> Result<(), String> {
            self.sent
                .lock()
                .await
                .push((email.to_string(), code.to_string()));
            Ok(())
        }
    }

    #[derive(Debug)]
    struct FailingSender;

    #[async_trait]
    impl OtpSender for FailingSender {
        async fn send(&self, _email: &str, _code: &str) -> Result<(), String> {
            Err("smtp down".to_string())
        }
    }

    fn service(max_attempts: u32) -> (OtpService, Arc<RecordingSender>) {
        let sender = Arc::new(RecordingSender::default());
        let service = OtpService::new(Arc::new(InMemoryOtpStore::new()), sender.clone())
            .with_max_attempts(max_attempts);
        (service, sender)
    }

    #[test]
    fn generated_codes_are_six_digits() {
        for _ in 0..100 {
            assert!(is_well_formed(&generate_code()));
        }
    }

    #[tokio::test]
    async fn issued_code_verifies_once() {
        let (service, sender) = service(5);
        service.issue("a@example.com").await.unwrap();
        let code = sender.last_code().await.unwrap();

        service.verify("a@example.com", &code).await.unwrap();
        let err = service.verify("a@example.com", &code).await.unwrap_err();
        assert!(matches!(err, ApplicationError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn attempts_are_limited() {
        let (service, sender) = service(2);
        service.issue("a@example.com").await.unwrap();
        let code = sender.last_code().await.unwrap();
        let wrong = if code == "000000" { "111111" } else { "000000" };

        let err = service.verify("a@example.com", wrong).await.unwrap_err();
        assert!(err.to_string().contains("1 attempts left"));
        assert!(service.verify("a@example.com", wrong).await.is_err());
        assert!(service.verify("a@example.com", &code).await.is_err());
    }

    /// Store that yields on every read, so concurrent verifications interleave.
    #[derive(Debug, Default)]
    struct YieldingStore {
        inner: InMemoryOtpStore,
    }

    #[async_trait]
    impl OtpStore for YieldingStore {
        async fn put(&self, code: OneTimeCode) -> RepositoryResult<()> {
            self.inner.put(code).await
        }

        async fn get(&self, email: &str) -> RepositoryResult<Option<OneTimeCode>> {
            let found = self.inner.get(email).await;
            tokio::task::yield_now().await;
            found
        }

        async fn remove(&self, email: &str) -> RepositoryResult<bool> {
            self.inner.remove(email).await
        }
    }

    #[tokio::test]
    async fn concurrent_guesses_share_the_attempt_limit() {
        let sender = Arc::new(RecordingSender::default());
        let service = OtpService::new(Arc::new(YieldingStore::default()), sender.clone())
            .with_max_attempts(5);
        service.issue("a@example.com").await.unwrap();
        let code = sender.last_code().await.unwrap();
        let wrong = if code == "000000" { "111111" } else { "000000" };

        let results = join_all((0..40).map(|_| service.verify("a@example.com", wrong))).await;
        let counted = results
            .iter()
            .filter(|r| matches!(r, Err(e) if e.to_string().contains("attempts left")))
            .count();
        assert_eq!(counted, 4);
        assert!(results.iter().all(Result::is_err));

        assert!(service.verify("a@example.com", &code).await.is_err());
    }

    #[tokio::test]
    async fn malformed_code_is_validation_error() {
        let (service, _) = service(5);
        let err = service.verify("a@example.com", "12ab").await.unwrap_err();
        assert!(matches!(err, ApplicationError::Validation(_)));
    }

    #[tokio::test]
    async fn reissue_invalidates_previous_code() {
        let (service, sender) = service(5);
        service.issue("a@example.com").await.unwrap();
        let first = sender.last_code().await.unwrap();
        service.issue("a@example.com").await.unwrap();
        let second = sender.last_code().await.unwrap();

        if first != second {
            assert!(service.verify("a@example.com", &first).await.is_err());
        }
        service.verify("a@example.com", &second).await.unwrap();
    }

    #[tokio::test]
    async fn delivery_failure_discards_code() {
        let store = Arc::new(InMemoryOtpStore::new());
        let service = OtpService::new(store.clone(), Arc::new(FailingSender));
        let err = service.issue("a@example.com").await.unwrap_err();
        assert!(matches!(err, ApplicationError::Internal(_)));
        assert!(store.get("a@example.com").await.unwrap().is_none());
    }
}
