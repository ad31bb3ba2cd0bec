//! # User Entity
//!
//! An end user known by email, with role and KYC state.

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::{CustomerId, KycLevel, KycStatus, Role, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Validates and canonicalizes an email address (trimmed, lowercased).
///
/// # Errors
///
/// Returns `DomainError::InvalidEmail` if the address has no single `@`
/// separating a non-empty local part from a dotted domain.
pub fn normalize_email(email: &str) -> DomainResult<String> {
    let email = email.trim().to_ascii_lowercase();
    let invalid = || DomainError::InvalidEmail(email.clone());

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return Err(invalid());
    };
    if host.is_empty() || tld.is_empty() {
        return Err(invalid());
    }
    Ok(email)
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: UserId,
    email: String,
    role: Role,
    kyc_level: KycLevel,
    kyc_status: KycStatus,
    customer_id: Option<CustomerId>,
    created_at: DateTime<Utc>,
}

impl User {
    /// Creates a user with no KYC progress.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidEmail` for a malformed address.
    pub fn new(email: &str, role: Role) -> DomainResult<Self> {
        Ok(Self {
            id: UserId::new_v4(),
            email: normalize_email(email)?,
            role,
            kyc_level: KycLevel::None,
            kyc_status: KycStatus::NotStarted,
            customer_id: None,
            created_at: Utc::now(),
        })
    }

    /// User ID.
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Canonical email.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Access role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// KYC level.
    #[must_use]
    pub fn kyc_level(&self) -> KycLevel {
        self.kyc_level
    }

    /// KYC status.
    #[must_use]
    pub fn kyc_status(&self) -> KycStatus {
        self.kyc_status
    }

    /// Upstream customer, once created.
    #[must_use]
    pub fn customer_id(&self) -> Option<&CustomerId> {
        self.customer_id.as_ref()
    }

    /// Creation time.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Sets the role, e.g. when the admin list changes between logins.
    pub fn set_role(&mut self, role: Role) {
        self.role = role;
    }

    /// Links the upstream customer and records its KYC state.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::OperationNotAllowed` if a different customer is
    /// already linked.
    pub fn link_customer(
        &mut self,
        customer_id: CustomerId,
        kyc_level: KycLevel,
        kyc_status: KycStatus,
    ) -> DomainResult<()> {
        if let Some(existing) = &self.customer_id
            && *existing != customer_id
        {
            return Err(DomainError::OperationNotAllowed(format!(
                "user already linked to customer {existing}"
            )));
        }
        self.customer_id = Some(customer_id);
        self.update_kyc(kyc_level, kyc_status);
        Ok(())
    }

    /// Records new KYC state.
    pub fn update_kyc(&mut self, kyc_level: KycLevel, kyc_status: KycStatus) {
        self.kyc_level = kyc_level;
        self.kyc_status = kyc_status;
    }
}
