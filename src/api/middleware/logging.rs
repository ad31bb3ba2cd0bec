//! # Logging Middleware
//!
//! Request/response logging with structured fields.
//!
//! Every request gets an `X-Request-ID` (propagated from the caller or
//! generated), echoed on the response and recorded on the span. Completion
//! is logged at a level chosen by status class. Credential headers are
//! redacted whenever headers are logged.
//!
//! # Usage
//!
//! ```ignore
//! use axum::middleware::from_fn_with_state;
//!
//! let config = Arc::new(LoggingConfig::default());
//! let app = Router::new()
//!     .route("/api", get(handler))
//!     .layer(from_fn_with_state(config, logging_middleware));
//! ```

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{Span, debug, error, info, instrument, warn};
use uuid::Uuid;

/// Header carrying the request ID.
pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

// ============================================================================
// Configuration
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Whether to log request headers at debug level.
    pub log_headers: bool,
    /// Headers to redact from logs (lowercase).
    pub redacted_headers: Vec<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_headers: false,
            redacted_headers: ["authorization", "cookie", "set-cookie", "api-key", "signature"]
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}

impl LoggingConfig {
    /// Enables header logging.
    #[must_use]
    pub fn with_headers(mut self) -> Self {
        self.log_headers = true;
        self
    }
}

// ============================================================================
// Request ID
// ============================================================================

/// A unique request identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(pub String);

impl RequestId {
    /// Generates a new random request ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the request ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reuses the caller's ID when present and sane, otherwise generates one.
    fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(&REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty() && id.len() <= 128)
            .map(|id| Self(id.to_string()))
            .unwrap_or_default()
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Sensitive Data Redaction
// ============================================================================

/// Redacts sensitive values from headers.
#[must_use]
pub fn redact_headers(headers: &HeaderMap, redacted_names: &[String]) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let value_str = if redacted_names
                .iter()
                .any(|r| r.eq_ignore_ascii_case(name.as_str()))
            {
                "[REDACTED]".to_string()
            } else {
                value.to_str().unwrap_or("[invalid utf8]").to_string()
            };
            (name.as_str().to_string(), value_str)
        })
        .collect()
}

// ============================================================================
// Middleware
// ============================================================================

/// Logging middleware function.
///
/// Logs request and response information with structured fields.
#[instrument(skip_all, fields(request_id))]
pub async fn logging_middleware(
    State(config): State<Arc<LoggingConfig>>,
    mut request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();

    let request_id = RequestId::from_headers(request.headers());
    Span::current().record("request_id", request_id.as_str());
    request.extensions_mut().insert(request_id.clone());

    let method = request.method().clone();
    let path = request.uri().path().to_string();

    if config.log_headers {
        let headers = redact_headers(request.headers(), &config.redacted_headers);
        debug!(%method, %path, ?headers, "request headers");
    }

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    let status = response.status().as_u16();
    let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    if response.status().is_server_error() {
        error!(%method, %path, status, duration_ms, "server error");
    } else if response.status().is_client_error() {
        warn!(%method, %path, status, duration_ms, "client error");
    } else {
        info!(%method, %path, status, duration_ms, "request completed");
    }

    response
}
