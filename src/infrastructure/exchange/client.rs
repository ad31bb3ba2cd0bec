//! # Exchange HTTP Client
//!
//! [`ExchangeGateway`] over the provider's REST API.
//!
//! Every request carries two headers:
//! - `api-key`: the configured API key
//! - `signature`: hex HMAC-SHA256 of the uppercased method and URL path
//!
//! Missing credentials do not prevent construction; they surface as
//! [`UpstreamError::Configuration`] on the first call so the service can
//! start and answer unrelated routes.
//!
//! # Examples
//!
//! ```
//! use onramp_gateway::infrastructure::exchange::{ExchangeClient, ExchangeClientConfig};
//!
//! let config = ExchangeClientConfig::new("https://api.exchange.example")
//!     .with_credentials("key", "secret")
//!     .with_timeout_ms(5_000);
//! let client = ExchangeClient::new(config).unwrap();
//! ```

use crate::application::error::UpstreamError;
use crate::application::services::signer::RequestSigner;
use crate::domain::entities::{
    Catalog, CustomerProfile, FiatAccount, NewFiatAccount, NormalizedQuoteRequest, Quote,
};
use crate::domain::value_objects::CustomerId;
use crate::infrastructure::exchange::dto::{
    CreateCustomerBody, CustomerResponse, ErrorBody, FiatAccountList, QuoteRequestBody,
    QuoteResponse,
};
use crate::infrastructure::exchange::traits::{ExchangeGateway, UpstreamResult};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Method, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

const QUOTES_PATH: &str = "/v1/external/quotes";
const CUSTOMERS_PATH: &str = "/v1/external/customers";
const CONFIG_PATH: &str = "/v1/external/config";

/// Configuration for [`ExchangeClient`].
#[derive(Clone)]
pub struct ExchangeClientConfig {
    base_url: String,
    api_key: Option<String>,
    api_secret: Option<String>,
    timeout_ms: u64,
}

impl fmt::Debug for ExchangeClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExchangeClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_secret", &self.api_secret.as_ref().map(|_| "<redacted>"))
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl ExchangeClientConfig {
    /// Creates a configuration without credentials.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            api_secret: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    /// Sets the API key and secret.
    #[must_use]
    pub fn with_credentials(
        mut self,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        self.api_key = Some(api_key.into());
        self.api_secret = Some(api_secret.into());
        self
    }

    /// Sets the API key, if any.
    #[must_use]
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    /// Sets the API secret, if any.
    #[must_use]
    pub fn with_api_secret(mut self, api_secret: Option<String>) -> Self {
        self.api_secret = api_secret;
        self
    }

    /// Sets the timeout in milliseconds.
    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Base URL of the provider API.
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Timeout in milliseconds.
    #[inline]
    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }
}

/// HTTP client for the exchange provider.
pub struct ExchangeClient {
    base_url: Url,
    api_key: Option<HeaderValue>,
    signer: Option<RequestSigner>,
    http: reqwest::Client,
}

impl fmt::Debug for ExchangeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExchangeClient")
            .field("base_url", &self.base_url.as_str())
            .field("configured", &self.is_configured())
            .finish()
    }
}

impl ExchangeClient {
    /// Creates a client.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamError::Configuration` if the base URL is invalid or
    /// the HTTP client cannot be built.
    pub fn new(config: ExchangeClientConfig) -> UpstreamResult<Self> {
        let base_url = Url::parse(config.base_url.trim_end_matches('/')).map_err(|e| {
            UpstreamError::Configuration(format!("invalid base URL '{}': {e}", config.base_url))
        })?;

        let api_key = match config.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => {
                let mut value = HeaderValue::from_str(key)
                    .map_err(|_| UpstreamError::Configuration("invalid API key format".into()))?;
                value.set_sensitive(true);
                Some(value)
            }
            _ => None,
        };
        let signer = RequestSigner::from_config(config.api_secret.as_deref()).ok();

        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| UpstreamError::Configuration(format!("HTTP client: {e}")))?;

        Ok(Self {
            base_url,
            api_key,
            signer,
            http,
        })
    }

    /// Returns true if both the API key and secret are present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some() && self.signer.is_some()
    }

    fn url(&self, path: &str) -> UpstreamResult<Url> {
        let joined = format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path);
        Url::parse(&joined).map_err(|e| UpstreamError::Configuration(format!("invalid URL: {e}")))
    }

    fn auth_headers(&self, method: &Method, url: &Url) -> UpstreamResult<HeaderMap> {
        let api_key = self
            .api_key
            .clone()
            .ok_or_else(|| UpstreamError::Configuration("API key is not configured".into()))?;
        let signer = self
            .signer
            .as_ref()
            .ok_or_else(|| UpstreamError::Configuration("API secret is not configured".into()))?;

        let signature = HeaderValue::from_str(&signer.sign(method.as_str(), url.path()))
            .map_err(|_| UpstreamError::Configuration("invalid signature header".into()))?;

        let mut headers = HeaderMap::new();
        headers.insert("api-key", api_key);
        headers.insert("signature", signature);
        Ok(headers)
    }

    async fn send<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> UpstreamResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.url(path)?;
        let headers = self.auth_headers(&method, &url)?;

        let mut request = self.http.request(method.clone(), url).headers(headers);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            warn!(%method, path, error = %e, "upstream request failed");
            UpstreamError::Network(e.to_string())
        })?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::Network(e.to_string()))?;

        if !status.is_success() {
            let error_body: ErrorBody = serde_json::from_slice(&bytes).unwrap_or_default();
            let status_text = status.canonical_reason().unwrap_or("Unknown").to_string();
            let code = error_body.code();
            let message = error_body
                .error_message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| status_text.clone());
            warn!(%method, path, status = status.as_u16(), %message, "upstream returned error");
            return Err(UpstreamError::Api {
                status: status.as_u16(),
                status_text,
                message,
                code,
                metadata: error_body.metadata,
            });
        }

        debug!(%method, path, status = status.as_u16(), "upstream request succeeded");
        serde_json::from_slice(&bytes).map_err(|e| UpstreamError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ExchangeGateway for ExchangeClient {
    #[instrument(skip(self, request), fields(from = request.from_currency(), to = request.to_currency()))]
    async fn create_quote(&self, request: &NormalizedQuoteRequest) -> UpstreamResult<Quote> {
        let body = QuoteRequestBody::from(request);
        let response: QuoteResponse = self.send(Method::POST, QUOTES_PATH, Some(&body)).await?;
        Ok(response.into_quote(request))
    }

    #[instrument(skip(self, email))]
    async fn create_customer(&self, email: &str) -> UpstreamResult<CustomerProfile> {
        let body = CreateCustomerBody { email };
        let response: CustomerResponse =
            self.send(Method::POST, CUSTOMERS_PATH, Some(&body)).await?;
        Ok(response.into())
    }

    #[instrument(skip(self))]
    async fn list_fiat_accounts(
        &self,
        customer_id: &CustomerId,
    ) -> UpstreamResult<Vec<FiatAccount>> {
        let path = format!("{CUSTOMERS_PATH}/{customer_id}/fiatAccounts");
        let list: FiatAccountList = self.send::<(), _>(Method::GET, &path, None).await?;
        Ok(list.into())
    }

    #[instrument(skip(self, account))]
    async fn create_fiat_account(
        &self,
        customer_id: &CustomerId,
        account: &NewFiatAccount,
    ) -> UpstreamResult<FiatAccount> {
        let path = format!("{CUSTOMERS_PATH}/{customer_id}/fiatAccounts");
        self.send(Method::POST, &path, Some(account)).await
    }

    #[instrument(skip(self))]
    async fn fetch_catalog(&self) -> UpstreamResult<Catalog> {
        self.send::<(), _>(Method::GET, CONFIG_PATH, None).await
    }
}
