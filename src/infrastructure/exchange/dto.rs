//! # Exchange Wire Types
//!
//! Request and response bodies of the provider's external API, and their
//! conversion to domain types.

use crate::domain::entities::{CustomerProfile, Fee, FiatAccount, NormalizedQuoteRequest, Quote};
use crate::domain::value_objects::{Amount, CustomerId, KycLevel, KycStatus, QuoteId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /v1/external/quotes`.
///
/// Exactly one of the amounts is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequestBody {
    /// Currency paid.
    pub from_currency: String,
    /// Currency received.
    pub to_currency: String,
    /// Amount paid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_amount: Option<String>,
    /// Amount received.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_amount: Option<String>,
    /// Payment method type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method_type: Option<String>,
    /// Target chain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain: Option<String>,
}

impl From<&NormalizedQuoteRequest> for QuoteRequestBody {
    fn from(request: &NormalizedQuoteRequest) -> Self {
        Self {
            from_currency: request.from_currency().to_string(),
            to_currency: request.to_currency().to_string(),
            from_amount: request.from_amount().map(|a| a.to_string()),
            to_amount: request.to_amount().map(|a| a.to_string()),
            payment_method_type: request.payment_method_type().map(str::to_string),
            chain: request.chain().map(str::to_string),
        }
    }
}

/// Quote returned by the provider.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    /// Quote ID.
    #[serde(alias = "quoteId")]
    pub id: String,
    /// Currency paid.
    pub from_currency: String,
    /// Currency received.
    pub to_currency: String,
    /// Amount paid.
    pub from_amount: Amount,
    /// Amount received.
    pub to_amount: Amount,
    /// Payment method type, when echoed back.
    #[serde(default)]
    pub payment_method_type: Option<String>,
    /// Exchange rate.
    pub rate: Decimal,
    /// Fee lines.
    #[serde(default)]
    pub fees: Vec<Fee>,
    /// Expiry instant.
    #[serde(alias = "expiresAt")]
    pub expiration: DateTime<Utc>,
    /// Target chain, when echoed back.
    #[serde(default)]
    pub chain: Option<String>,
}

impl QuoteResponse {
    /// Converts to a domain quote, filling gaps from the request.
    #[must_use]
    pub fn into_quote(self, request: &NormalizedQuoteRequest) -> Quote {
        Quote {
            id: QuoteId::new(self.id),
            from_currency: self.from_currency,
            to_currency: self.to_currency,
            from_amount: self.from_amount,
            to_amount: self.to_amount,
            payment_method_type: self
                .payment_method_type
                .or_else(|| request.payment_method_type().map(str::to_string))
                .unwrap_or_default(),
            rate: self.rate,
            fees: self.fees,
            expiration: self.expiration,
            chain: self.chain.or_else(|| request.chain().map(str::to_string)),
        }
    }
}

/// Body of `POST /v1/external/customers`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateCustomerBody<'a> {
    /// Customer email.
    pub email: &'a str,
}

/// Customer returned by the provider.
///
/// KYC fields arrive in several spellings (`level_1`, `basic`, ...); unknown
/// values fall back to the defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerResponse {
    /// Customer ID.
    #[serde(alias = "customerId")]
    pub id: String,
    /// KYC level as sent.
    #[serde(default)]
    pub kyc_level: Option<String>,
    /// KYC status as sent.
    #[serde(default)]
    pub kyc_status: Option<String>,
}

impl From<CustomerResponse> for CustomerProfile {
    fn from(response: CustomerResponse) -> Self {
        Self {
            id: CustomerId::new(response.id),
            kyc_level: response
                .kyc_level
                .and_then(|level| level.parse::<KycLevel>().ok())
                .unwrap_or_default(),
            kyc_status: response
                .kyc_status
                .and_then(|status| status.parse::<KycStatus>().ok())
                .unwrap_or_default(),
        }
    }
}

/// Fiat account listing, bare or wrapped.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FiatAccountList {
    /// A JSON array.
    Bare(Vec<FiatAccount>),
    /// An object with a `fiatAccounts` (or `data`) array.
    Wrapped {
        /// The accounts.
        #[serde(rename = "fiatAccounts", alias = "data")]
        fiat_accounts: Vec<FiatAccount>,
    },
}

impl From<FiatAccountList> for Vec<FiatAccount> {
    fn from(list: FiatAccountList) -> Self {
        match list {
            FiatAccountList::Bare(accounts)
            | FiatAccountList::Wrapped {
                fiat_accounts: accounts,
            } => {
                accounts
            }
        }
    }
}

/// Error body of a non-success response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// Human-readable message.
    #[serde(default)]
    pub error_message: Option<String>,
    /// Provider error code.
    #[serde(default)]
    pub error_code: Option<Value>,
    /// Extra structured context.
    #[serde(default)]
    pub metadata: Option<Value>,
}

impl ErrorBody {
    /// `errorCode` as a string, whether sent as a string or a number.
    #[must_use]
    pub fn code(&self) -> Option<String> {
        match self.error_code.as_ref()? {
            Value::Null => None,
            Value::String(code) => Some(code.clone()),
            other => Some(other.to_string()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::entities::{AmountPreference, QuoteRequest};

    #[test]
    fn request_body_omits_cleared_amount() {
        let normalized = QuoteRequest::new("USD", "USDT-BEP20")
            .with_from_amount("50")
            .with_to_amount("49")
            .normalize(AmountPreference::Source)
            .unwrap();
        let json = serde_json::to_value(QuoteRequestBody::from(&normalized)).unwrap();
        assert_eq!(json["fromAmount"], "50");
        assert!(json.get("toAmount").is_none());
        assert!(json.get("chain").is_none());
    }

    #[test]
    fn quote_response_accepts_numeric_fields() {
        let json = r#"{
            "quoteId": "q-9",
            "fromCurrency": "USD",
            "toCurrency": "USDT-BEP20",
            "fromAmount": "50",
            "toAmount": 49.25,
            "rate": 0.985,
            "fees": [{"type": "processing", "amount": "0.75", "currency": "USD"}],
            "expiresAt": "2030-01-01T00:00:00Z"
        }"#;
        let response: QuoteResponse = serde_json::from_str(json).unwrap();
        let normalized = QuoteRequest::new("USD", "USDT-BEP20")
            .with_from_amount("50")
            .with_payment_method("card")
            .normalize(AmountPreference::Source)
            .unwrap();
        let quote = response.into_quote(&normalized);
        assert_eq!(quote.id.as_str(), "q-9");
        assert_eq!(quote.to_amount.to_string(), "49.25");
        assert_eq!(quote.payment_method_type, "card");
        assert_eq!(quote.fees.len(), 1);
    }

    #[test]
    fn customer_response_parses_kyc_aliases() {
        let response: CustomerResponse = serde_json::from_str(
            r#"{"id":"c-1","kycLevel":"level_1","kycStatus":"in_review"}"#,
        )
        .unwrap();
        let profile = CustomerProfile::from(response);
        assert_eq!(profile.kyc_level, KycLevel::Basic);
        assert_eq!(profile.kyc_status, KycStatus::Pending);

        let response: CustomerResponse =
            serde_json::from_str(r#"{"id":"c-2","kycLevel":"weird"}"#).unwrap();
        assert_eq!(CustomerProfile::from(response).kyc_level, KycLevel::None);
    }

    #[test]
    fn fiat_account_list_shapes() {
        let bare: FiatAccountList =
            serde_json::from_str(r#"[{"id":"fa-1","type":"iban"}]"#).unwrap();
        assert_eq!(Vec::<FiatAccount>::from(bare).len(), 1);

        let wrapped: FiatAccountList =
            serde_json::from_str(r#"{"fiatAccounts":[{"id":"fa-1","type":"iban"},{"id":"fa-2","type":"ach"}]}"#)
                .unwrap();
        assert_eq!(Vec::<FiatAccount>::from(wrapped).len(), 2);
    }

    #[test]
    fn error_code_string_or_number() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"errorMessage":"limit exceeded","errorCode":4001}"#).unwrap();
        assert_eq!(body.code().as_deref(), Some("4001"));
        let body: ErrorBody = serde_json::from_str(r#"{"errorCode":"LIMIT"}"#).unwrap();
        assert_eq!(body.code().as_deref(), Some("LIMIT"));
        assert!(ErrorBody::default().code().is_none());
    }
}
