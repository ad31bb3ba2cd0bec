//! # Domain Enums
//!
//! Small closed vocabularies shared across the domain.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when parsing an unknown enum value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseEnumError {
    /// Name of the enum being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

/// Access role carried in the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular end user.
    #[default]
    User,
    /// Operator with access to the admin console.
    Admin,
}

impl Role {
    /// Returns true for the admin role.
    #[inline]
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Admin => f.write_str("admin"),
        }
    }
}

/// Tiered KYC verification level.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum KycLevel {
    /// No verification performed.
    #[default]
    None,
    /// Email and basic identity details.
    Basic,
    /// Government ID verified.
    Intermediate,
    /// Proof of address and enhanced due diligence.
    Advanced,
}

impl FromStr for KycLevel {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Ok(Self::None),
            "basic" | "level_1" | "l1" => Ok(Self::Basic),
            "intermediate" | "level_2" | "l2" => Ok(Self::Intermediate),
            "advanced" | "level_3" | "l3" => Ok(Self::Advanced),
            _ => Err(ParseEnumError {
                kind: "kyc level",
                value: s.to_string(),
            }),
        }
    }
}

/// Progress of the current KYC review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KycStatus {
    /// The user has not submitted anything yet.
    #[default]
    NotStarted,
    /// Submitted and under review.
    Pending,
    /// Review passed.
    Approved,
    /// Review rejected.
    Rejected,
}

impl FromStr for KycStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "not_started" | "" => Ok(Self::NotStarted),
            "pending" | "in_review" | "submitted" => Ok(Self::Pending),
            "approved" | "verified" => Ok(Self::Approved),
            "rejected" | "declined" => Ok(Self::Rejected),
            _ => Err(ParseEnumError {
                kind: "kyc status",
                value: s.to_string(),
            }),
        }
    }
}

/// Direction of a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Fiat to crypto.
    #[default]
    Onramp,
    /// Crypto to fiat.
    Offramp,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Onramp => f.write_str("onramp"),
            Self::Offramp => f.write_str("offramp"),
        }
    }
}
