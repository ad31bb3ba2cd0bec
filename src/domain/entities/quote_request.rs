//! # Quote Request
//!
//! The quote form as submitted by a client, and its normalized form.
//!
//! A client may fill in the amount it pays (`fromAmount`), the amount it wants
//! to receive (`toAmount`), or both. The upstream provider prices from exactly
//! one of them, so [`QuoteRequest::normalize`] reconciles the two into a
//! [`NormalizedQuoteRequest`] whose amount is a single [`QuoteAmount`].
//!
//! # Examples
//!
//! ```
//! use onramp_gateway::domain::entities::quote_request::{
//!     AmountPreference, QuoteAmount, QuoteRequest,
//! };
//!
//! let request = QuoteRequest::new("USD", "USDT-BEP20")
//!     .with_from_amount("50")
//!     .with_to_amount("49");
//!
//! let normalized = request.normalize(AmountPreference::Source).unwrap();
//! assert!(matches!(normalized.amount(), QuoteAmount::From(_)));
//! assert!(normalized.to_amount().is_none());
//! ```

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::Amount;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which amount wins when a request carries both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmountPreference {
    /// Keep `fromAmount`, clear `toAmount`.
    #[default]
    Source,
    /// Keep `toAmount`, clear `fromAmount`.
    Target,
}

impl fmt::Display for AmountPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => f.write_str("source"),
            Self::Target => f.write_str("target"),
        }
    }
}

impl FromStr for AmountPreference {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "source" | "from" => Ok(Self::Source),
            "target" | "to" => Ok(Self::Target),
            other => Err(DomainError::validation(format!(
                "unknown amount preference: {other}"
            ))),
        }
    }
}

/// Quote form as submitted by the client.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    /// Currency the user pays with.
    pub from_currency: String,
    /// Currency the user receives.
    pub to_currency: String,
    /// Amount the user pays, if entered.
    #[serde(default)]
    pub from_amount: Option<String>,
    /// Amount the user receives, if entered.
    #[serde(default)]
    pub to_amount: Option<String>,
    /// Selected payment method.
    #[serde(default)]
    pub payment_method_type: Option<String>,
    /// Target chain for crypto delivery.
    #[serde(default)]
    pub chain: Option<String>,
}

impl QuoteRequest {
    /// Creates a request for a currency pair with no amounts.
    #[must_use]
    pub fn new(from_currency: impl Into<String>, to_currency: impl Into<String>) -> Self {
        Self {
            from_currency: from_currency.into(),
            to_currency: to_currency.into(),
            ..Self::default()
        }
    }

    /// Sets the source amount.
    #[must_use]
    pub fn with_from_amount(mut self, amount: impl Into<String>) -> Self {
        self.from_amount = Some(amount.into());
        self
    }

    /// Sets the target amount.
    #[must_use]
    pub fn with_to_amount(mut self, amount: impl Into<String>) -> Self {
        self.to_amount = Some(amount.into());
        self
    }

    /// Sets the payment method type.
    #[must_use]
    pub fn with_payment_method(mut self, method: impl Into<String>) -> Self {
        self.payment_method_type = Some(method.into());
        self
    }

    /// Sets the target chain.
    #[must_use]
    pub fn with_chain(mut self, chain: impl Into<String>) -> Self {
        self.chain = Some(chain.into());
        self
    }

    /// Reconciles the amounts and validates the request.
    ///
    /// Blank amount strings count as absent. When both amounts are present
    /// the one selected by `preference` is kept; when only one is present it
    /// is used regardless of `preference`.
    ///
    /// # Errors
    ///
    /// - `DomainError::InvalidCurrency` if a currency is blank or both are equal
    /// - `DomainError::MissingAmount` if no amount is present
    /// - `DomainError::InvalidAmount` if the kept amount is not a positive decimal
    pub fn normalize(&self, preference: AmountPreference) -> DomainResult<NormalizedQuoteRequest> {
        let from_currency = normalize_currency(&self.from_currency, "fromCurrency")?;
        let to_currency = normalize_currency(&self.to_currency, "toCurrency")?;
        if from_currency == to_currency {
            return Err(DomainError::InvalidCurrency(format!(
                "fromCurrency and toCurrency must differ (both {from_currency})"
            )));
        }

        let from = non_blank(self.from_amount.as_deref());
        let to = non_blank(self.to_amount.as_deref());

        let amount = match (from, to, preference) {
            (Some(from), Some(_), AmountPreference::Source) | (Some(from), None, _) => {
                QuoteAmount::From(Amount::parse_positive(from)?)
            }
            (Some(_), Some(to), AmountPreference::Target) | (None, Some(to), _) => {
                QuoteAmount::To(Amount::parse_positive(to)?)
            }
            (None, None, _) => return Err(DomainError::MissingAmount),
        };

        Ok(NormalizedQuoteRequest {
            from_currency,
            to_currency,
            amount,
            payment_method_type: non_blank(self.payment_method_type.as_deref())
                .map(str::to_string),
            chain: non_blank(self.chain.as_deref()).map(str::to_string),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn normalize_currency(code: &str, field: &str) -> DomainResult<String> {
    let code = code.trim();
    if code.is_empty() {
        return Err(DomainError::InvalidCurrency(format!("{field} is required")));
    }
    Ok(code.to_ascii_uppercase())
}

/// The single amount that drives pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteAmount {
    /// Price from the amount paid.
    From(Amount),
    /// Price from the amount received.
    To(Amount),
}

/// A validated quote request carrying exactly one amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedQuoteRequest {
    from_currency: String,
    to_currency: String,
    amount: QuoteAmount,
    payment_method_type: Option<String>,
    chain: Option<String>,
}

impl NormalizedQuoteRequest {
    /// Currency paid, uppercased.
    #[must_use]
    pub fn from_currency(&self) -> &str {
        &self.from_currency
    }

    /// Currency received, uppercased.
    #[must_use]
    pub fn to_currency(&self) -> &str {
        &self.to_currency
    }

    /// The driving amount.
    #[must_use]
    pub fn amount(&self) -> QuoteAmount {
        self.amount
    }

    /// Source amount, if it is the driving amount.
    #[must_use]
    pub fn from_amount(&self) -> Option<Amount> {
        match self.amount {
            QuoteAmount::From(amount) => Some(amount),
            QuoteAmount::To(_) => None,
        }
    }

    /// Target amount, if it is the driving amount.
    #[must_use]
    pub fn to_amount(&self) -> Option<Amount> {
        match self.amount {
            QuoteAmount::To(amount) => Some(amount),
            QuoteAmount::From(_) => None,
        }
    }

    /// Payment method type, if selected.
    #[must_use]
    pub fn payment_method_type(&self) -> Option<&str> {
        self.payment_method_type.as_deref()
    }

    /// Target chain, if selected.
    #[must_use]
    pub fn chain(&self) -> Option<&str> {
        self.chain.as_deref()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn usd_to_usdt() -> QuoteRequest {
        QuoteRequest::new("USD", "USDT-BEP20")
    }

    #[test]
    fn source_amount_wins_by_default() {
        let normalized = usd_to_usdt()
            .with_from_amount("50")
            .with_to_amount("49")
            .normalize(AmountPreference::default())
            .unwrap();
        assert_eq!(normalized.from_amount().unwrap().to_string(), "50");
        assert!(normalized.to_amount().is_none());
    }

    #[test]
    fn target_preference_keeps_to_amount() {
        let normalized = usd_to_usdt()
            .with_from_amount("50")
            .with_to_amount("49")
            .normalize(AmountPreference::Target)
            .unwrap();
        assert!(normalized.from_amount().is_none());
        assert_eq!(normalized.to_amount().unwrap().to_string(), "49");
    }

    #[test]
    fn lone_amount_used_regardless_of_preference() {
        let normalized = usd_to_usdt()
            .with_to_amount("10")
            .normalize(AmountPreference::Source)
            .unwrap();
        assert!(matches!(normalized.amount(), QuoteAmount::To(_)));
    }

    #[test]
    fn blank_amount_counts_as_absent() {
        let normalized = usd_to_usdt()
            .with_from_amount("   ")
            .with_to_amount("10")
            .normalize(AmountPreference::Source)
            .unwrap();
        assert_eq!(normalized.to_amount().unwrap().to_string(), "10");
    }

    #[test]
    fn missing_amount_rejected() {
        let err = usd_to_usdt().normalize(AmountPreference::Source).unwrap_err();
        assert_eq!(err, DomainError::MissingAmount);
    }

    #[test]
    fn zero_amount_rejected() {
        let err = usd_to_usdt()
            .with_from_amount("0")
            .normalize(AmountPreference::Source)
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidAmount(_)));
    }

    #[test]
    fn currencies_are_uppercased_and_validated() {
        let normalized = QuoteRequest::new(" usd ", "usdt-bep20")
            .with_from_amount("5")
            .normalize(AmountPreference::Source)
            .unwrap();
        assert_eq!(normalized.from_currency(), "USD");
        assert_eq!(normalized.to_currency(), "USDT-BEP20");

        assert!(QuoteRequest::new("", "USDT")
            .with_from_amount("5")
            .normalize(AmountPreference::Source)
            .is_err());
        assert!(QuoteRequest::new("usd", "USD")
            .with_from_amount("5")
            .normalize(AmountPreference::Source)
            .is_err());
    }

    #[test]
    fn deserializes_client_form() {
        let json = r#"{"fromAmount":"50","fromCurrency":"USD","toCurrency":"USDT-BEP20"}"#;
        let request: QuoteRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.from_amount.as_deref(), Some("50"));
        assert!(request.to_amount.is_none());
        assert!(request.payment_method_type.is_none());
    }

    #[test]
    fn preference_parses() {
        assert_eq!("target".parse::<AmountPreference>().unwrap(), AmountPreference::Target);
        assert_eq!("FROM".parse::<AmountPreference>().unwrap(), AmountPreference::Source);
        assert!("both".parse::<AmountPreference>().is_err());
    }

    proptest! {
        #[test]
        fn both_amounts_leave_exactly_one(from in 1u32..1_000_000, to in 1u32..1_000_000) {
            let normalized = usd_to_usdt()
                .with_from_amount(from.to_string())
                .with_to_amount(to.to_string())
                .normalize(AmountPreference::Source)
                .unwrap();
            prop_assert!(normalized.to_amount().is_none());
            prop_assert_eq!(normalized.from_amount().unwrap().to_string(), from.to_string());
        }
    }
}
