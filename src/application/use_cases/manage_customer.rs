//! # Manage Customer Use Case
//!
//! Bridges a local user to the provider-side customer record: creation, KYC
//! view and fiat accounts.

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::domain::entities::{FiatAccount, NewFiatAccount, User};
use crate::domain::value_objects::{CustomerId, KycLevel, KycStatus, UserId};
use crate::infrastructure::exchange::ExchangeGateway;
use crate::infrastructure::persistence::UserRepository;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

/// KYC state of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KycSummary {
    /// Verification level.
    pub kyc_level: KycLevel,
    /// Review status.
    pub kyc_status: KycStatus,
    /// Linked provider customer, if created.
    pub customer_id: Option<CustomerId>,
}

impl From<&User> for KycSummary {
    fn from(user: &User) -> Self {
        Self {
            kyc_level: user.kyc_level(),
            kyc_status: user.kyc_status(),
            customer_id: user.customer_id().cloned(),
        }
    }
}

/// Use case for customer, KYC and fiat account operations.
#[derive(Debug, Clone)]
pub struct ManageCustomerUseCase {
    users: Arc<dyn UserRepository>,
    gateway: Arc<dyn ExchangeGateway>,
}

impl ManageCustomerUseCase {
    /// Creates the use case.
    #[must_use]
    pub fn new(users: Arc<dyn UserRepository>, gateway: Arc<dyn ExchangeGateway>) -> Self {
        Self { users, gateway }
    }

    /// Creates the provider customer for a user if none is linked yet.
    ///
    /// Calling this again after success returns the user unchanged without
    /// contacting the provider.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown users, or the provider error.
    #[instrument(skip(self))]
    pub async fn create_customer(&self, user_id: &UserId) -> ApplicationResult<User> {
        let mut user = self.load(user_id).await?;
        if user.customer_id().is_some() {
            return Ok(user);
        }

        let profile = self.gateway.create_customer(user.email()).await?;
        user.link_customer(profile.id.clone(), profile.kyc_level, profile.kyc_status)?;
        self.users.save(&user).await?;

        info!(customer_id = %profile.id, kyc_level = ?profile.kyc_level, "customer linked");
        Ok(user)
    }

    /// KYC state of a user.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown users.
    pub async fn kyc(&self, user_id: &UserId) -> ApplicationResult<KycSummary> {
        let user = self.load(user_id).await?;
        Ok(KycSummary::from(&user))
    }

    /// Fiat accounts registered for the user's customer.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user has no customer yet, or the provider
    /// error.
    #[instrument(skip(self))]
    pub async fn list_fiat_accounts(
        &self,
        user_id: &UserId,
    ) -> ApplicationResult<Vec<FiatAccount>> {
        let customer_id = self.customer_of(user_id).await?;
        Ok(self.gateway.list_fiat_accounts(&customer_id).await?)
    }

    /// Registers a fiat account for the user's customer.
    ///
    /// # Errors
    ///
    /// Returns a validation error for incomplete payloads, `NotFound` if the
    /// user has no customer yet, or the provider error.
    #[instrument(skip(self, account), fields(account_type = %account.account_type))]
    pub async fn create_fiat_account(
        &self,
        user_id: &UserId,
        account: NewFiatAccount,
    ) -> ApplicationResult<FiatAccount> {
        let account = account.validated()?;
        let customer_id = self.customer_of(user_id).await?;
        let created = self
            .gateway
            .create_fiat_account(&customer_id, &account)
            .await?;
        info!(account_id = %created.id, "fiat account registered");
        Ok(created)
    }

    async fn load(&self, user_id: &UserId) -> ApplicationResult<User> {
        self.users
            .get(user_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("user", user_id.to_string()))
    }

    async fn customer_of(&self, user_id: &UserId) -> ApplicationResult<CustomerId> {
        self.load(user_id)
            .await?
            .customer_id()
            .cloned()
            .ok_or_else(|| ApplicationError::not_found("customer", user_id.to_string()))
    }
}
