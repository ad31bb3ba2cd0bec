//! # Customer
//!
//! The provider-side customer record linked to a user, and the fiat accounts
//! registered against it for payouts.

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::{CustomerId, KycLevel, KycStatus};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Customer as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerProfile {
    /// Provider customer ID.
    pub id: CustomerId,
    /// Current KYC level.
    #[serde(default)]
    pub kyc_level: KycLevel,
    /// Current KYC status.
    #[serde(default)]
    pub kyc_status: KycStatus,
}

/// A registered fiat account (bank account, card payout, ...).
///
/// Only `id`, `type` and `currency` are interpreted; provider-specific fields
/// are carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiatAccount {
    /// Provider account ID.
    pub id: String,
    /// Account type, e.g. `iban` or `ach`.
    #[serde(rename = "type")]
    pub account_type: String,
    /// Fiat currency of the account.
    #[serde(default)]
    pub currency: Option<String>,
    /// Remaining provider fields.
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// Payload for registering a fiat account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFiatAccount {
    /// Account type.
    #[serde(rename = "type")]
    pub account_type: String,
    /// Fiat currency.
    pub currency: String,
    /// Type-specific fields such as `iban` or `accountNumber`.
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl NewFiatAccount {
    /// Checks required fields and uppercases the currency.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `type` or `currency` is blank, or
    /// `DomainError::InvalidCurrency` if the currency is not three letters.
    pub fn validated(mut self) -> DomainResult<Self> {
        self.account_type = self.account_type.trim().to_string();
        if self.account_type.is_empty() {
            return Err(DomainError::validation("fiat account type is required"));
        }
        let currency = self.currency.trim().to_ascii_uppercase();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DomainError::InvalidCurrency(format!(
                "fiat currency must be a 3-letter code, got '{}'",
                self.currency
            )));
        }
        self.currency = currency;
        Ok(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn fiat_account_keeps_extra_fields() {
        let json = r#"{"id":"fa-1","type":"iban","currency":"EUR","iban":"DE89370400440532013000"}"#;
        let account: FiatAccount = serde_json::from_str(json).unwrap();
        assert_eq!(account.account_type, "iban");
        assert_eq!(account.details["iban"], "DE89370400440532013000");

        let back = serde_json::to_value(&account).unwrap();
        assert_eq!(back["iban"], "DE89370400440532013000");
    }

    #[test]
    fn new_account_validation() {
        let account: NewFiatAccount =
            serde_json::from_str(r#"{"type":" ach ","currency":"usd","accountNumber":"123"}"#)
                .unwrap();
        let account = account.validated().unwrap();
        assert_eq!(account.account_type, "ach");
        assert_eq!(account.currency, "USD");

        let bad: NewFiatAccount =
            serde_json::from_str(r#"{"type":"ach","currency":"dollars"}"#).unwrap();
        assert!(matches!(bad.validated(), Err(DomainError::InvalidCurrency(_))));
    }

    #[test]
    fn profile_defaults_kyc() {
        let profile: CustomerProfile = serde_json::from_str(r#"{"id":"c-1"}"#).unwrap();
        assert_eq!(profile.kyc_level, KycLevel::None);
        assert_eq!(profile.kyc_status, KycStatus::NotStarted);
    }
}
