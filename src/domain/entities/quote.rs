//! # Quote Entity
//!
//! A time-limited, priced offer from the exchange provider to convert a fixed
//! pair of currencies and amounts.
//!
//! Quotes are produced upstream and are immutable here: a refresh replaces the
//! quote, it never edits one.

use crate::domain::value_objects::{Amount, QuoteId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single fee line attached to a quote or transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fee {
    /// Fee category, e.g. `processing` or `network`.
    #[serde(rename = "type")]
    pub fee_type: String,
    /// Fee amount.
    pub amount: Amount,
    /// Currency the fee is charged in.
    pub currency: String,
}

impl Fee {
    /// Creates a fee line.
    #[must_use]
    pub fn new(fee_type: impl Into<String>, amount: Amount, currency: impl Into<String>) -> Self {
        Self {
            fee_type: fee_type.into(),
            amount,
            currency: currency.into(),
        }
    }
}

/// A priced quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Upstream quote identifier.
    pub id: QuoteId,
    /// Currency the user pays with.
    pub from_currency: String,
    /// Currency the user receives.
    pub to_currency: String,
    /// Amount paid.
    pub from_amount: Amount,
    /// Amount received.
    pub to_amount: Amount,
    /// Payment method the quote is priced for.
    pub payment_method_type: String,
    /// Exchange rate applied.
    pub rate: Decimal,
    /// Fee breakdown.
    #[serde(default)]
    pub fees: Vec<Fee>,
    /// Instant after which the quote can no longer be accepted.
    pub expiration: DateTime<Utc>,
    /// Target chain for crypto delivery, when relevant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain: Option<String>,
}

impl Quote {
    /// Returns true if the quote has expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expiration
    }

    /// Returns true if the quote has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Whole seconds until expiry at `now`, floored at zero.
    #[must_use]
    pub fn seconds_remaining_at(&self, now: DateTime<Utc>) -> u64 {
        u64::try_from((self.expiration - now).num_seconds()).unwrap_or(0)
    }

    /// Sum of the fees charged in `currency`.
    #[must_use]
    pub fn total_fees_in(&self, currency: &str) -> Amount {
        self.fees
            .iter()
            .filter(|fee| fee.currency.eq_ignore_ascii_case(currency))
            .fold(Amount::ZERO, |acc, fee| {
                acc.checked_add(fee.amount).unwrap_or(acc)
            })
    }
}
