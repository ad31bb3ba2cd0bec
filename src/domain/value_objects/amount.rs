//! # Amount Value Object
//!
//! Non-negative decimal money amount.
//!
//! Amounts travel as strings on the wire (`"50"`, `"0.0125"`) so no precision
//! is lost between the client, this service and the upstream provider.
//!
//! # Examples
//!
//! ```
//! use onramp_gateway::domain::value_objects::Amount;
//!
//! let amount: Amount = "50".parse().unwrap();
//! assert_eq!(amount.to_string(), "50");
//! assert!("-1".parse::<Amount>().is_err());
//! ```

use crate::domain::errors::DomainError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A validated, non-negative amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// Zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates an amount from a decimal.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidAmount` if the value is negative.
    pub fn from_decimal(value: Decimal) -> Result<Self, DomainError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(DomainError::InvalidAmount(format!(
                "amount cannot be negative: {value}"
            )));
        }
        Ok(Self(value.normalize()))
    }

    /// Parses a strictly positive amount, as required for quote inputs.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidAmount` if the input is not a decimal
    /// or is zero or negative.
    pub fn parse_positive(input: &str) -> Result<Self, DomainError> {
        let amount: Self = input.parse()?;
        if amount.is_zero() {
            return Err(DomainError::InvalidAmount(
                "amount must be greater than zero".to_string(),
            ));
        }
        Ok(amount)
    }

    /// Returns the inner decimal.
    #[inline]
    #[must_use]
    pub const fn get(self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero.
    #[inline]
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// Adds two amounts, returning `None` on overflow.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value = Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map_err(|_| DomainError::InvalidAmount(format!("not a decimal number: {s}")))?;
        Self::from_decimal(value)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = DomainError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::from_decimal(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_and_normalizes() {
        let amount: Amount = " 50.00 ".parse().unwrap();
        assert_eq!(amount.to_string(), "50");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(
            "fifty".parse::<Amount>(),
            Err(DomainError::InvalidAmount(_))
        ));
    }

    #[test]
    fn parse_rejects_negative() {
        assert!("-0.5".parse::<Amount>().is_err());
    }

    #[test]
    fn parse_positive_rejects_zero() {
        assert!(Amount::parse_positive("0").is_err());
        assert!(Amount::parse_positive("0.01").is_ok());
    }

    #[test]
    fn serializes_as_string() {
        let amount: Amount = "12.5".parse().unwrap();
        assert_eq!(serde_json::to_string(&amount).unwrap(), "\"12.5\"");
    }

    #[test]
    fn deserializes_from_string_or_number() {
        let from_str: Amount = serde_json::from_str("\"50\"").unwrap();
        let from_num: Amount = serde_json::from_str("50").unwrap();
        assert_eq!(from_str, from_num);
    }

    #[test]
    fn checked_add_sums() {
        let a: Amount = "1.5".parse().unwrap();
        let b: Amount = "2.25".parse().unwrap();
        assert_eq!(a.checked_add(b).unwrap().to_string(), "3.75");
    }
}
