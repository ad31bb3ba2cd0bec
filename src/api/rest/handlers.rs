//! # REST Handlers
//!
//! Request handlers for REST endpoints.
//!
//! # Endpoints
//!
//! ## Catalog
//! - `GET /api/config` - Public catalog
//! - `GET /api/config/countries` - Served countries
//! - `GET /api/config/cryptocurrencies` - Enabled cryptocurrencies
//! - `GET /api/crypto/onramp` / `GET /api/crypto/offramp` - Tradeable assets
//! - `GET /api/crypto/payment-methods` - Payment methods for a country/currency
//!
//! ## Quotes
//! - `POST /api/quotes` - Price a quote form
//!
//! ## Auth
//! - `POST /api/auth/login`, `POST /api/auth/verify`, `POST /api/auth/logout`
//! - `GET /api/auth/session`
//!
//! ## Customers
//! - `POST /api/customers`, `GET /api/kyc`
//! - `GET|POST /api/customers/fiat-accounts`
//!
//! ## Transactions
//! - `POST /api/webhooks/exchange` - Signed provider events
//! - `GET /api/transactions`, `GET /api/transactions/{referenceId}`
//!
//! ## Admin
//! - `GET /api/admin/cryptocurrencies`, `PATCH /api/admin/cryptocurrencies/{code}`
//! - `GET /api/admin/payment-methods`, `PATCH /api/admin/payment-methods/{type}`
//! - `POST /api/admin/config/refresh`

use crate::api::middleware::auth::{
    AdminUser, AuthError, AuthenticatedUser, Claims, OptionalUser,
};
use crate::api::state::AppState;
use crate::application::error::{ApplicationError, UpstreamError};
use crate::application::use_cases::{KycSummary, WebhookOutcome};
use crate::domain::entities::{
    Catalog, Country, CryptoToggle, Cryptocurrency, FiatAccount, NewFiatAccount, PaymentMethod,
    Quote, QuoteRequest, Transaction, TransactionEvent, User,
};
use crate::domain::value_objects::{ReferenceId, TransactionKind, TransactionStatus};
use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header::SET_COOKIE},
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Header carrying the provider's webhook signature.
pub const SIGNATURE_HEADER: &str = "signature";

// ============================================================================
// Error Response
// ============================================================================

/// Standard error response format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional error details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Creates a new error response.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Attaches details.
    #[must_use]
    pub fn with_details(mut self, details: Option<serde_json::Value>) -> Self {
        self.details = details;
        self
    }
}

/// Error half of every handler result.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Handler result.
pub type ApiResult<T> = Result<T, ApiError>;

impl From<ApplicationError> for (StatusCode, Json<ErrorResponse>) {
    fn from(err: ApplicationError) -> Self {
        let (status, response) = match &err {
            ApplicationError::Validation(_) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("VALIDATION_ERROR", err.to_string()),
            ),
            ApplicationError::Domain(domain) if domain.is_validation() => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("VALIDATION_ERROR", err.to_string()),
            ),
            ApplicationError::Domain(_) | ApplicationError::Conflict(_) => (
                StatusCode::CONFLICT,
                ErrorResponse::new("CONFLICT", err.to_string()),
            ),
            ApplicationError::NotFound { .. } => (
                StatusCode::NOT_FOUND,
                ErrorResponse::new("NOT_FOUND", err.to_string()),
            ),
            ApplicationError::Unauthorized(_) => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse::new("UNAUTHORIZED", err.to_string()),
            ),
            ApplicationError::Forbidden(_) => (
                StatusCode::FORBIDDEN,
                ErrorResponse::new("FORBIDDEN", err.to_string()),
            ),
            ApplicationError::Configuration(_)
            | ApplicationError::Upstream(UpstreamError::Configuration(_)) => {
                error!(error = %err, "service misconfigured");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("CONFIGURATION_ERROR", "service is not configured"),
                )
            }
            ApplicationError::Upstream(upstream) => upstream_error(upstream),
            ApplicationError::Repository(_) | ApplicationError::Internal(_) => {
                error!(error = %err, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("INTERNAL_ERROR", "internal error"),
                )
            }
        };

        (status, Json(response))
    }
}

fn upstream_error(err: &UpstreamError) -> (StatusCode, ErrorResponse) {
    match err {
        UpstreamError::Api {
            status,
            code,
            metadata,
            ..
        } => {
            let passthrough = StatusCode::from_u16(*status)
                .ok()
                .filter(StatusCode::is_client_error);
            let code = code.clone().unwrap_or_else(|| "UPSTREAM_ERROR".to_string());
            let response = ErrorResponse::new(code, err.to_string()).with_details(metadata.clone());
            match passthrough {
                Some(status) => (status, response),
                None => {
                    warn!(error = %err, "upstream server error");
                    (StatusCode::BAD_GATEWAY, response)
                }
            }
        }
        _ => {
            warn!(error = %err, "upstream unavailable");
            (
                StatusCode::BAD_GATEWAY,
                ErrorResponse::new("UPSTREAM_UNAVAILABLE", "exchange provider unavailable"),
            )
        }
    }
}

impl From<AuthError> for (StatusCode, Json<ErrorResponse>) {
    fn from(err: AuthError) -> Self {
        (err.status(), Json(ErrorResponse::new(err.code(), err.to_string())))
    }
}

fn validation_error(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new("VALIDATION_ERROR", message)),
    )
}

// ============================================================================
// Request / Response DTOs
// ============================================================================

/// Country filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CountryQuery {
    /// ISO country code.
    pub country: Option<String>,
}

/// Payment method filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentMethodQuery {
    /// ISO country code.
    pub country: Option<String>,
    /// Fiat currency.
    pub currency: Option<String>,
}

/// Login request.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// Email to send the code to.
    pub email: String,
}

/// Login response.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    /// Canonical email the code was sent to.
    pub email: String,
    /// Status message.
    pub message: String,
}

/// Code verification request.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyRequest {
    /// Email the code was sent to.
    pub email: String,
    /// Six-digit code.
    pub code: String,
}

/// Signed-in user and session expiry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    /// The user.
    pub user: User,
    /// Session expiration (Unix seconds).
    pub expires_at: u64,
}

/// Webhook acknowledgment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    /// Transaction reference.
    pub reference_id: ReferenceId,
    /// Status after the event.
    pub status: TransactionStatus,
    /// `created`, `advanced` or `duplicate`.
    pub outcome: &'static str,
}

/// Payment method toggle.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentMethodToggle {
    /// New enabled flag.
    pub enabled: bool,
}

/// Result of a forced catalog refresh.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    /// When the catalog was fetched.
    pub fetched_at: Option<DateTime<Utc>>,
    /// The refreshed catalog, admin view.
    pub catalog: Catalog,
}

// ============================================================================
// Catalog Handlers
// ============================================================================

/// Public catalog.
///
/// # Errors
///
/// Returns `502` if the catalog cannot be fetched.
#[instrument(skip(state))]
pub async fn get_config(State(state): State<Arc<AppState>>) -> ApiResult<Json<Catalog>> {
    Ok(Json(state.catalog.public_catalog().await?))
}

/// Served countries.
///
/// # Errors
///
/// Returns `502` if the catalog cannot be fetched.
#[instrument(skip(state))]
pub async fn list_countries(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Country>>> {
    Ok(Json(state.catalog.public_catalog().await?.countries))
}

/// Enabled cryptocurrencies.
///
/// # Errors
///
/// Returns `502` if the catalog cannot be fetched.
#[instrument(skip(state))]
pub async fn list_cryptocurrencies(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Cryptocurrency>>> {
    Ok(Json(state.catalog.public_catalog().await?.cryptocurrencies))
}

/// Assets available for buying.
///
/// # Errors
///
/// Returns `502` if the catalog cannot be fetched.
#[instrument(skip(state))]
pub async fn list_onramp_cryptocurrencies(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CountryQuery>,
) -> ApiResult<Json<Vec<Cryptocurrency>>> {
    let assets = state
        .catalog
        .tradeable(TransactionKind::Onramp, query.country.as_deref())
        .await?;
    Ok(Json(assets))
}

/// Assets available for selling.
///
/// # Errors
///
/// Returns `502` if the catalog cannot be fetched.
#[instrument(skip(state))]
pub async fn list_offramp_cryptocurrencies(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CountryQuery>,
) -> ApiResult<Json<Vec<Cryptocurrency>>> {
    let assets = state
        .catalog
        .tradeable(TransactionKind::Offramp, query.country.as_deref())
        .await?;
    Ok(Json(assets))
}

/// Payment methods for a country and currency.
///
/// # Errors
///
/// Returns `502` if the catalog cannot be fetched.
#[instrument(skip(state))]
pub async fn list_payment_methods(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PaymentMethodQuery>,
) -> ApiResult<Json<Vec<PaymentMethod>>> {
    let methods = state
        .catalog
        .payment_methods(query.country.as_deref(), query.currency.as_deref())
        .await?;
    Ok(Json(methods))
}

// ============================================================================
// Quote Handlers
// ============================================================================

/// Prices a quote form.
///
/// # Errors
///
/// Returns `400` for invalid forms and the provider's status for rejected
/// requests.
#[instrument(skip(state, request))]
pub async fn create_quote(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QuoteRequest>,
) -> ApiResult<Json<Quote>> {
    Ok(Json(state.quotes.execute(&request).await?))
}

// ============================================================================
// Auth Handlers
// ============================================================================

/// Sends a login code.
///
/// # Errors
///
/// Returns `400` for malformed emails.
#[instrument(skip(state, request))]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let email = state.auth.login(&request.email).await?;
    Ok(Json(LoginResponse {
        email,
        message: "login code sent".to_string(),
    }))
}

/// Verifies a login code and starts a session.
///
/// # Errors
///
/// Returns `401` for rejected codes and `500` if session signing is not
/// configured.
#[instrument(skip(state, request))]
pub async fn verify(
    State(state): State<Arc<AppState>>,
    Json(request): Json<VerifyRequest>,
) -> ApiResult<impl IntoResponse> {
    let session = state.session.as_ref().ok_or(AuthError::NotConfigured)?;
    let user = state.auth.verify(&request.email, &request.code).await?;
    let (token, claims) = session.issue(&user)?;

    info!(user_id = %user.id(), role = %user.role(), "session started");
    Ok((
        [(SET_COOKIE, session.cookie(&token))],
        Json(SessionResponse {
            user,
            expires_at: claims.exp,
        }),
    ))
}

/// Ends the session. Succeeds without one.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    OptionalUser(claims): OptionalUser,
) -> impl IntoResponse {
    if let Some(claims) = claims {
        info!(user_id = %claims.sub, "session ended");
    }
    let mut headers = HeaderMap::new();
    if let Some(session) = &state.session
        && let Ok(value) = HeaderValue::from_str(&session.clear_cookie())
    {
        headers.insert(SET_COOKIE, value);
    }
    (StatusCode::NO_CONTENT, headers)
}

/// Current session claims.
pub async fn get_session(AuthenticatedUser(claims): AuthenticatedUser) -> Json<Claims> {
    Json(claims)
}

// ============================================================================
// Customer Handlers
// ============================================================================

async fn session_user(state: &AppState, claims: &Claims) -> ApiResult<User> {
    let user_id = claims.user_id()?;
    Ok(state.auth.current_user(&user_id).await?)
}

/// Creates the provider customer for the session user.
///
/// # Errors
///
/// Returns `401` without a session and the provider's error otherwise.
#[instrument(skip(state, claims), fields(user_id = %claims.sub))]
pub async fn create_customer(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> ApiResult<Json<KycSummary>> {
    let user = session_user(&state, &claims).await?;
    let user = state.customers.create_customer(&user.id()).await?;
    Ok(Json(KycSummary::from(&user)))
}

/// KYC state of the session user.
///
/// # Errors
///
/// Returns `401` without a session.
#[instrument(skip(state, claims), fields(user_id = %claims.sub))]
pub async fn get_kyc(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> ApiResult<Json<KycSummary>> {
    let user = session_user(&state, &claims).await?;
    Ok(Json(state.customers.kyc(&user.id()).await?))
}

/// Fiat accounts of the session user's customer.
///
/// # Errors
///
/// Returns `404` if no customer exists yet.
#[instrument(skip(state, claims), fields(user_id = %claims.sub))]
pub async fn list_fiat_accounts(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> ApiResult<Json<Vec<FiatAccount>>> {
    let user = session_user(&state, &claims).await?;
    Ok(Json(state.customers.list_fiat_accounts(&user.id()).await?))
}

/// Registers a fiat account.
///
/// # Errors
///
/// Returns `400` for incomplete payloads and `404` if no customer exists yet.
#[instrument(skip(state, claims, account), fields(user_id = %claims.sub))]
pub async fn create_fiat_account(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(account): Json<NewFiatAccount>,
) -> ApiResult<(StatusCode, Json<FiatAccount>)> {
    let user = session_user(&state, &claims).await?;
    let created = state
        .customers
        .create_fiat_account(&user.id(), account)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

// ============================================================================
// Transaction Handlers
// ============================================================================

/// Applies a signed provider event.
///
/// # Errors
///
/// - `401` if the signature is missing or wrong
/// - `400` if the body is not a valid event
/// - `409` if the event breaks the status sequence
#[instrument(skip(state, headers, body))]
pub async fn exchange_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<WebhookResponse>> {
    let verifier = state
        .webhook_verifier
        .as_ref()
        .ok_or_else(|| ApplicationError::configuration("webhook secret is not configured"))?;

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !verifier.verify_payload(&body, signature) {
        warn!("webhook signature rejected");
        return Err(ApplicationError::unauthorized("invalid webhook signature").into());
    }

    let event: TransactionEvent = serde_json::from_slice(&body)
        .map_err(|e| validation_error(format!("invalid webhook payload: {e}")))?;
    let (transaction, outcome) = state.transactions.handle_event(event).await?;

    Ok(Json(WebhookResponse {
        reference_id: transaction.reference_id().clone(),
        status: transaction.status(),
        outcome: match outcome {
            WebhookOutcome::Created => "created",
            WebhookOutcome::Advanced { .. } => "advanced",
            WebhookOutcome::Duplicate => "duplicate",
        },
    }))
}

/// Transactions of the session user.
///
/// # Errors
///
/// Returns `401` without a session.
#[instrument(skip(state, claims), fields(user_id = %claims.sub))]
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> ApiResult<Json<Vec<Transaction>>> {
    let user = session_user(&state, &claims).await?;
    Ok(Json(state.transactions.list_for(&user).await?))
}

/// One transaction, visible to its owner and admins.
///
/// # Errors
///
/// Returns `404` if missing or owned by someone else.
#[instrument(skip(state, claims), fields(user_id = %claims.sub))]
pub async fn get_transaction(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(reference_id): Path<String>,
) -> ApiResult<Json<Transaction>> {
    let user = session_user(&state, &claims).await?;
    let transaction = state
        .transactions
        .get_for(&ReferenceId::new(reference_id), &user)
        .await?;
    Ok(Json(transaction))
}

// ============================================================================
// Admin Handlers
// ============================================================================

/// Every cryptocurrency, disabled ones included.
///
/// # Errors
///
/// Returns `403` for non-admins.
#[instrument(skip(state, _admin))]
pub async fn admin_list_cryptocurrencies(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> ApiResult<Json<Vec<Cryptocurrency>>> {
    Ok(Json(state.catalog.catalog().await?.cryptocurrencies))
}

/// Toggles a cryptocurrency.
///
/// # Errors
///
/// Returns `400` for an empty toggle, `404` for unknown codes.
#[instrument(skip(state, admin), fields(admin = %admin.0.email))]
pub async fn admin_update_cryptocurrency(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(code): Path<String>,
    Json(toggle): Json<CryptoToggle>,
) -> ApiResult<Json<Cryptocurrency>> {
    if toggle.is_empty() {
        return Err(validation_error(
            "at least one of enabled, onrampEnabled, offrampEnabled is required",
        ));
    }
    let updated = state.catalog.toggle_cryptocurrency(&code, toggle).await?;
    info!(code = %updated.code, ?toggle, "cryptocurrency toggled");
    Ok(Json(updated))
}

/// Every payment method, disabled ones included.
///
/// # Errors
///
/// Returns `403` for non-admins.
#[instrument(skip(state, _admin))]
pub async fn admin_list_payment_methods(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> ApiResult<Json<Vec<PaymentMethod>>> {
    Ok(Json(state.catalog.catalog().await?.payment_methods))
}

/// Enables or disables a payment method.
///
/// # Errors
///
/// Returns `404` for unknown types.
#[instrument(skip(state, admin), fields(admin = %admin.0.email))]
pub async fn admin_update_payment_method(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(method_type): Path<String>,
    Json(toggle): Json<PaymentMethodToggle>,
) -> ApiResult<Json<PaymentMethod>> {
    let updated = state
        .catalog
        .toggle_payment_method(&method_type, toggle.enabled)
        .await?;
    info!(method = %updated.method_type, enabled = updated.enabled, "payment method toggled");
    Ok(Json(updated))
}

/// Forces a catalog refetch.
///
/// # Errors
///
/// Returns `502` if the provider is unreachable and nothing is cached.
#[instrument(skip(state, admin), fields(admin = %admin.0.email))]
pub async fn admin_refresh_config(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
) -> ApiResult<Json<RefreshResponse>> {
    let catalog = state.catalog.refresh().await?;
    Ok(Json(RefreshResponse {
        fetched_at: state.catalog.fetched_at().await,
        catalog,
    }))
}

// ============================================================================
// Health Check
// ============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// Health check endpoint.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::errors::DomainError;

    fn status_of(err: ApplicationError) -> (StatusCode, ErrorResponse) {
        let (status, Json(body)) = err.into();
        (status, body)
    }

    #[test]
    fn validation_maps_to_400() {
        let (status, body) = status_of(ApplicationError::validation("bad"));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, "VALIDATION_ERROR");

        let (status, _) = status_of(DomainError::MissingAmount.into());
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn invalid_transition_maps_to_409() {
        let (status, body) = status_of(
            DomainError::InvalidStatusTransition {
                from: TransactionStatus::Pending,
                to: TransactionStatus::Completed,
            }
            .into(),
        );
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.code, "CONFLICT");
    }

    #[test]
    fn upstream_client_error_passes_through() {
        let err = UpstreamError::Api {
            status: 400,
            status_text: "Bad Request".into(),
            message: "limit exceeded".into(),
            code: Some("LIMIT".into()),
            metadata: Some(serde_json::json!({"max": "1000"})),
        };
        let (status, body) = status_of(err.into());
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, "LIMIT");
        assert!(body.message.contains("limit exceeded"));
        assert_eq!(body.details.unwrap()["max"], "1000");
    }

    #[test]
    fn upstream_server_and_network_errors_are_bad_gateway() {
        let (status, _) = status_of(UpstreamError::api(503, "Service Unavailable", "down").into());
        assert_eq!(status, StatusCode::BAD_GATEWAY);

        let (status, body) = status_of(UpstreamError::Network("refused".into()).into());
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(!body.message.contains("refused"));
    }

    #[test]
    fn missing_credentials_are_500_without_detail() {
        let (status, body) =
            status_of(UpstreamError::Configuration("API secret is not configured".into()).into());
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.code, "CONFIGURATION_ERROR");
        assert!(!body.message.contains("secret"));
    }

    #[test]
    fn internal_details_are_hidden() {
        let (status, body) = status_of(ApplicationError::repository("lock poisoned"));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.message, "internal error");
    }

    #[tokio::test]
    async fn health_check_returns_healthy() {
        let response = health_check().await;
        assert_eq!(response.status, "healthy");
    }
}
