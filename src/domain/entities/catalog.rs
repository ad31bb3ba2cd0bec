//! # Catalog
//!
//! Country, cryptocurrency and payment-method metadata published by the
//! exchange provider, plus the admin toggles layered over it.
//!
//! The provider owns the catalog contents; the admin console only switches
//! entries on and off. Toggles are kept separately as [`CatalogOverrides`]
//! and merged with [`Catalog::with_overrides`] at read time, so a fresh
//! upstream fetch never loses them.

use crate::domain::value_objects::{Amount, TransactionKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

fn enabled_by_default() -> bool {
    true
}

/// A supported country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    /// ISO 3166-1 alpha-2 code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Fiat currencies accepted in this country.
    #[serde(default)]
    pub currencies: Vec<String>,
    /// Whether the country is served.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

/// A tradeable cryptocurrency on a specific chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cryptocurrency {
    /// Chain-qualified code, e.g. `USDT-BEP20`.
    pub code: String,
    /// Ticker symbol, e.g. `USDT`.
    pub symbol: String,
    /// Display name.
    pub name: String,
    /// Chain the asset settles on.
    pub chain: String,
    /// Available for buying.
    #[serde(default = "enabled_by_default")]
    pub onramp_enabled: bool,
    /// Available for selling.
    #[serde(default = "enabled_by_default")]
    pub offramp_enabled: bool,
    /// Master switch.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

impl Cryptocurrency {
    /// Returns true if the asset can be traded in the given direction.
    #[must_use]
    pub fn supports(&self, kind: TransactionKind) -> bool {
        self.enabled
            && match kind {
                TransactionKind::Onramp => self.onramp_enabled,
                TransactionKind::Offramp => self.offramp_enabled,
            }
    }
}

/// A fiat payment method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    /// Method type, e.g. `card` or `sepa`.
    #[serde(rename = "type")]
    pub method_type: String,
    /// Display name.
    pub name: String,
    /// Countries where the method is offered; empty means everywhere.
    #[serde(default)]
    pub countries: Vec<String>,
    /// Fiat currencies the method accepts; empty means any.
    #[serde(default)]
    pub currencies: Vec<String>,
    /// Minimum amount per transaction.
    #[serde(default)]
    pub min_amount: Option<Amount>,
    /// Maximum amount per transaction.
    #[serde(default)]
    pub max_amount: Option<Amount>,
    /// Whether the method is offered.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

impl PaymentMethod {
    /// Returns true if the method is offered for the country and currency.
    ///
    /// Matching is case-insensitive; a `None` filter matches anything.
    #[must_use]
    pub fn available_for(&self, country: Option<&str>, currency: Option<&str>) -> bool {
        fn allows(list: &[String], value: Option<&str>) -> bool {
            match value {
                None => true,
                Some(_) if list.is_empty() => true,
                Some(value) => list.iter().any(|item| item.eq_ignore_ascii_case(value)),
            }
        }
        allows(&self.countries, country) && allows(&self.currencies, currency)
    }
}

/// The full provider catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    /// Supported countries.
    #[serde(default)]
    pub countries: Vec<Country>,
    /// Tradeable cryptocurrencies.
    #[serde(default)]
    pub cryptocurrencies: Vec<Cryptocurrency>,
    /// Payment methods.
    #[serde(default)]
    pub payment_methods: Vec<PaymentMethod>,
}

/// Admin toggle for a cryptocurrency. `None` leaves the upstream value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CryptoToggle {
    /// Master switch.
    #[serde(default)]
    pub enabled: Option<bool>,
    /// Buy switch.
    #[serde(default)]
    pub onramp_enabled: Option<bool>,
    /// Sell switch.
    #[serde(default)]
    pub offramp_enabled: Option<bool>,
}

impl CryptoToggle {
    /// Returns true if the toggle changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.enabled.is_none() && self.onramp_enabled.is_none() && self.offramp_enabled.is_none()
    }

    /// Layers `other` over `self`; fields set in `other` win.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            enabled: other.enabled.or(self.enabled),
            onramp_enabled: other.onramp_enabled.or(self.onramp_enabled),
            offramp_enabled: other.offramp_enabled.or(self.offramp_enabled),
        }
    }
}

/// Admin toggles, keyed by uppercased crypto code and lowercased method type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogOverrides {
    /// Cryptocurrency toggles.
    #[serde(default)]
    pub cryptocurrencies: HashMap<String, CryptoToggle>,
    /// Payment method enable flags.
    #[serde(default)]
    pub payment_methods: HashMap<String, bool>,
}

impl CatalogOverrides {
    /// Canonical key for a crypto code.
    #[must_use]
    pub fn crypto_key(code: &str) -> String {
        code.trim().to_ascii_uppercase()
    }

    /// Canonical key for a payment method type.
    #[must_use]
    pub fn method_key(method_type: &str) -> String {
        method_type.trim().to_ascii_lowercase()
    }
}

impl Catalog {
    /// Returns a copy with the admin toggles applied.
    #[must_use]
    pub fn with_overrides(&self, overrides: &CatalogOverrides) -> Self {
        let mut catalog = self.clone();
        for crypto in &mut catalog.cryptocurrencies {
            if let Some(toggle) = overrides
                .cryptocurrencies
                .get(&CatalogOverrides::crypto_key(&crypto.code))
            {
                if let Some(enabled) = toggle.enabled {
                    crypto.enabled = enabled;
                }
                if let Some(enabled) = toggle.onramp_enabled {
                    crypto.onramp_enabled = enabled;
                }
                if let Some(enabled) = toggle.offramp_enabled {
                    crypto.offramp_enabled = enabled;
                }
            }
        }
        for method in &mut catalog.payment_methods {
            if let Some(&enabled) = overrides
                .payment_methods
                .get(&CatalogOverrides::method_key(&method.method_type))
            {
                method.enabled = enabled;
            }
        }
        catalog
    }

    /// Returns a copy with disabled entries removed.
    #[must_use]
    pub fn enabled_only(&self) -> Self {
        Self {
            countries: self.countries.iter().filter(|c| c.enabled).cloned().collect(),
            cryptocurrencies: self
                .cryptocurrencies
                .iter()
                .filter(|c| c.enabled)
                .cloned()
                .collect(),
            payment_methods: self
                .payment_methods
                .iter()
                .filter(|m| m.enabled)
                .cloned()
                .collect(),
        }
    }

    /// Finds a cryptocurrency by code, case-insensitively.
    #[must_use]
    pub fn cryptocurrency(&self, code: &str) -> Option<&Cryptocurrency> {
        self.cryptocurrencies
            .iter()
            .find(|c| c.code.eq_ignore_ascii_case(code.trim()))
    }

    /// Finds a payment method by type, case-insensitively.
    #[must_use]
    pub fn payment_method(&self, method_type: &str) -> Option<&PaymentMethod> {
        self.payment_methods
            .iter()
            .find(|m| m.method_type.eq_ignore_ascii_case(method_type.trim()))
    }

    /// Returns true if the country is listed and enabled.
    ///
    /// An empty country list means no country restriction is published.
    #[must_use]
    pub fn serves_country(&self, code: &str) -> bool {
        self.countries.is_empty()
            || self
                .countries
                .iter()
                .any(|c| c.enabled && c.code.eq_ignore_ascii_case(code.trim()))
    }

    /// Enabled cryptocurrencies tradeable in `kind`.
    #[must_use]
    pub fn tradeable(&self, kind: TransactionKind) -> Vec<Cryptocurrency> {
        self.cryptocurrencies
            .iter()
            .filter(|c| c.supports(kind))
            .cloned()
            .collect()
    }

    /// Enabled payment methods matching the country and currency filters.
    #[must_use]
    pub fn payment_methods_for(
        &self,
        country: Option<&str>,
        currency: Option<&str>,
    ) -> Vec<PaymentMethod> {
        self.payment_methods
            .iter()
            .filter(|m| m.enabled && m.available_for(country, currency))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_catalog() -> Catalog {
        Catalog {
            countries: vec![
                Country {
                    code: "US".to_string(),
                    name: "United States".to_string(),
                    currencies: vec!["USD".to_string()],
                    enabled: true,
                },
                Country {
                    code: "KP".to_string(),
                    name: "North Korea".to_string(),
                    currencies: vec![],
                    enabled: false,
                },
            ],
            cryptocurrencies: vec![
                Cryptocurrency {
                    code: "USDT-BEP20".to_string(),
                    symbol: "USDT".to_string(),
                    name: "Tether".to_string(),
                    chain: "BSC".to_string(),
                    onramp_enabled: true,
                    offramp_enabled: true,
                    enabled: true,
                },
                Cryptocurrency {
                    code: "BTC".to_string(),
                    symbol: "BTC".to_string(),
                    name: "Bitcoin".to_string(),
                    chain: "BITCOIN".to_string(),
                    onramp_enabled: true,
                    offramp_enabled: false,
                    enabled: true,
                },
            ],
            payment_methods: vec![
                PaymentMethod {
                    method_type: "card".to_string(),
                    name: "Card".to_string(),
                    countries: vec![],
                    currencies: vec!["USD".to_string(), "EUR".to_string()],
                    min_amount: Some("10".parse().unwrap()),
                    max_amount: Some("5000".parse().unwrap()),
                    enabled: true,
                },
                PaymentMethod {
                    method_type: "sepa".to_string(),
                    name: "SEPA transfer".to_string(),
                    countries: vec!["DE".to_string(), "FR".to_string()],
                    currencies: vec!["EUR".to_string()],
                    min_amount: None,
                    max_amount: None,
                    enabled: true,
                },
            ],
        }
    }

    #[test]
    fn overrides_apply_by_canonical_key() {
        let mut overrides = CatalogOverrides::default();
        overrides.cryptocurrencies.insert(
            CatalogOverrides::crypto_key("usdt-bep20"),
            CryptoToggle {
                onramp_enabled: Some(false),
                ..CryptoToggle::default()
            },
        );
        overrides
            .payment_methods
            .insert(CatalogOverrides::method_key("SEPA"), false);

        let catalog = sample_catalog().with_overrides(&overrides);
        let usdt = catalog.cryptocurrency("USDT-BEP20").unwrap();
        assert!(!usdt.onramp_enabled);
        assert!(usdt.offramp_enabled);
        assert!(!catalog.payment_method("sepa").unwrap().enabled);
    }

    #[test]
    fn enabled_only_hides_disabled() {
        let catalog = sample_catalog().enabled_only();
        assert_eq!(catalog.countries.len(), 1);
        assert!(catalog.serves_country("us"));
        assert!(!catalog.serves_country("KP"));
    }

    #[test]
    fn tradeable_respects_direction() {
        let catalog = sample_catalog();
        assert_eq!(catalog.tradeable(TransactionKind::Onramp).len(), 2);
        let sell = catalog.tradeable(TransactionKind::Offramp);
        assert_eq!(sell.len(), 1);
        assert_eq!(sell[0].code, "USDT-BEP20");
    }

    #[test]
    fn payment_method_filters() {
        let catalog = sample_catalog();
        assert_eq!(catalog.payment_methods_for(Some("US"), Some("usd")).len(), 1);
        assert_eq!(catalog.payment_methods_for(Some("DE"), Some("EUR")).len(), 2);
        assert_eq!(catalog.payment_methods_for(None, None).len(), 2);
    }

    #[test]
    fn toggle_merge_prefers_newer_fields() {
        let old = CryptoToggle {
            enabled: Some(false),
            onramp_enabled: Some(true),
            offramp_enabled: None,
        };
        let new = CryptoToggle {
            enabled: Some(true),
            ..CryptoToggle::default()
        };
        let merged = old.merge(new);
        assert_eq!(merged.enabled, Some(true));
        assert_eq!(merged.onramp_enabled, Some(true));
        assert!(CryptoToggle::default().is_empty());
    }

    #[test]
    fn deserializes_with_defaults() {
        let json = r#"{"cryptocurrencies":[{"code":"ETH","symbol":"ETH","name":"Ether","chain":"ETHEREUM"}]}"#;
        let catalog: Catalog = serde_json::from_str(json).unwrap();
        assert!(catalog.cryptocurrencies[0].enabled);
        assert!(catalog.countries.is_empty());
    }
}
