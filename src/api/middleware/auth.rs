//! # Session Authentication
//!
//! JWT session cookies for API endpoints.
//!
//! A verified login is turned into an HS256 token carried in an HTTP-only
//! cookie. [`session_middleware`] decodes the cookie (or an
//! `Authorization: Bearer` header) on every request and stores the
//! [`Claims`] in the request extensions; the [`AuthenticatedUser`] and
//! [`AdminUser`] extractors enforce access.
//!
//! # Token Structure
//!
//! - `sub` - Local user ID
//! - `email` - Canonical email
//! - `verified` - Email ownership proven by a login code
//! - `role` - `user` or `admin`
//! - `iat` / `exp` - Issued at / expiration (Unix seconds)

use crate::api::state::AppState;
use crate::domain::entities::User;
use crate::domain::value_objects::{Role, UserId};
use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION, header::COOKIE, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    get_current_timestamp,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "onramp_session";

/// Default session lifetime (one day).
pub const DEFAULT_SESSION_TTL_SECS: u64 = 86_400;

// ============================================================================
// Configuration
// ============================================================================

/// Session signing configuration.
#[derive(Clone)]
pub struct SessionConfig {
    secret: String,
    ttl_secs: u64,
    secure: bool,
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("ttl_secs", &self.ttl_secs)
            .field("secure", &self.secure)
            .finish_non_exhaustive()
    }
}

impl SessionConfig {
    /// Creates a configuration with the default one-day lifetime.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ttl_secs: DEFAULT_SESSION_TTL_SECS,
            secure: false,
        }
    }

    /// Builds a configuration from an optional secret.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotConfigured` if the secret is absent or blank.
    pub fn from_secret(secret: Option<&str>) -> Result<Self, AuthError> {
        match secret.map(str::trim) {
            Some(s) if !s.is_empty() => Ok(Self::new(s)),
            _ => Err(AuthError::NotConfigured),
        }
    }

    /// Sets the session lifetime.
    #[must_use]
    pub fn with_ttl_secs(mut self, ttl_secs: u64) -> Self {
        self.ttl_secs = ttl_secs.max(1);
        self
    }

    /// Marks the cookie `Secure`.
    #[must_use]
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Session lifetime in seconds.
    #[must_use]
    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Signs claims for `user`, valid from now for the session lifetime.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Encoding` if signing fails.
    pub fn issue(&self, user: &User) -> Result<(String, Claims), AuthError> {
        let claims = Claims::for_user(user, get_current_timestamp(), self.ttl_secs);
        let token = create_jwt(&claims, &self.secret)?;
        Ok((token, claims))
    }

    /// Validates a token and returns its claims.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenExpired` or `AuthError::InvalidToken`.
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        validate_jwt(token, &self.secret)
    }

    /// `Set-Cookie` value carrying `token`.
    #[must_use]
    pub fn cookie(&self, token: &str) -> String {
        self.cookie_with(token, self.ttl_secs)
    }

    /// `Set-Cookie` value that removes the session.
    #[must_use]
    pub fn clear_cookie(&self) -> String {
        self.cookie_with("", 0)
    }

    fn cookie_with(&self, value: &str, max_age: u64) -> String {
        let mut cookie =
            format!("{SESSION_COOKIE}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}");
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

// ============================================================================
// JWT Claims
// ============================================================================

/// Session token claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: String,
    /// Canonical email.
    pub email: String,
    /// Email ownership proven.
    pub verified: bool,
    /// Access role.
    pub role: Role,
    /// Issued at time (Unix timestamp).
    pub iat: u64,
    /// Expiration time (Unix timestamp).
    pub exp: u64,
}

impl Claims {
    /// Claims for a user signed in via login code.
    #[must_use]
    pub fn for_user(user: &User, now: u64, ttl_secs: u64) -> Self {
        Self {
            sub: user.id().to_string(),
            email: user.email().to_string(),
            verified: true,
            role: user.role(),
            iat: now,
            exp: now.saturating_add(ttl_secs),
        }
    }

    /// Parses the subject as a user ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if `sub` is not a UUID.
    pub fn user_id(&self) -> Result<UserId, AuthError> {
        uuid::Uuid::parse_str(&self.sub)
            .map(UserId::from)
            .map_err(|_| AuthError::InvalidToken("subject is not a user id".into()))
    }

    /// Checks if the session has the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

// ============================================================================
// Authentication Error
// ============================================================================

/// Authentication error types.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No session cookie or bearer token.
    #[error("missing authentication credentials")]
    MissingCredentials,

    /// Token failed signature or format checks.
    #[error("invalid session: {0}")]
    InvalidToken(String),

    /// Token expired.
    #[error("session expired")]
    TokenExpired,

    /// Token could not be signed.
    #[error("could not create session: {0}")]
    Encoding(String),

    /// Session signing secret is not configured.
    #[error("session signing is not configured")]
    NotConfigured,

    /// Insufficient permissions.
    #[error("insufficient permissions")]
    InsufficientPermissions,
}

impl AuthError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingCredentials | Self::InvalidToken(_) | Self::TokenExpired => {
                StatusCode::UNAUTHORIZED
            }
            Self::InsufficientPermissions => StatusCode::FORBIDDEN,
            Self::Encoding(_) | Self::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingCredentials => "MISSING_CREDENTIALS",
            Self::InvalidToken(_) => "INVALID_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::Encoding(_) => "INTERNAL_ERROR",
            Self::NotConfigured => "CONFIGURATION_ERROR",
            Self::InsufficientPermissions => "FORBIDDEN",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "code": self.code(),
            "message": self.to_string(),
        });

        (self.status(), Json(body)).into_response()
    }
}

// ============================================================================
// Token Extraction
// ============================================================================

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .or_else(|| auth_header.strip_prefix("bearer "))
}

/// Finds a cookie value across all `Cookie` headers.
#[must_use]
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

/// Session token from the cookie, falling back to a bearer header.
fn session_token(headers: &HeaderMap) -> Option<&str> {
    cookie_value(headers, SESSION_COOKIE).or_else(|| {
        headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(extract_bearer_token)
    })
}

// ============================================================================
// JWT Utilities
// ============================================================================

/// Validates a JWT token and returns the claims.
///
/// # Errors
///
/// Returns an error if the token is invalid or validation fails.
pub fn validate_jwt(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    let key = DecodingKey::from_secret(secret.as_bytes());

    decode::<Claims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken(e.to_string()),
        })
}

/// Creates a JWT token from claims.
///
/// # Errors
///
/// Returns an error if token encoding fails.
pub fn create_jwt(claims: &Claims, secret: &str) -> Result<String, AuthError> {
    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::new(Algorithm::HS256), claims, &key)
        .map_err(|e| AuthError::Encoding(e.to_string()))
}

// ============================================================================
// Middleware
// ============================================================================

/// Decodes the session, if any, into request extensions.
///
/// Requests without a valid session pass through anonymously; access is
/// enforced by the extractors.
pub async fn session_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(session) = &state.session
        && let Some(token) = session_token(request.headers())
    {
        match session.validate(token) {
            Ok(claims) => {
                request.extensions_mut().insert(claims);
            }
            Err(e) => debug!(error = %e, "ignoring invalid session"),
        }
    }
    next.run(request).await
}

// ============================================================================
// Request Extension Extractors
// ============================================================================

/// Extractor for a signed-in session.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Claims);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or(AuthError::MissingCredentials)
    }
}

/// Extractor for an admin session. Non-admins get 403.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Claims);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(claims) = AuthenticatedUser::from_request_parts(parts, state).await?;
        if claims.is_admin() {
            Ok(AdminUser(claims))
        } else {
            Err(AuthError::InsufficientPermissions)
        }
    }
}

/// Extractor for an optional session.
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<Claims>);

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalUser(parts.extensions.get::<Claims>().cloned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn config() -> SessionConfig {
        SessionConfig::new("test-secret-key-for-jwt-validation")
    }

    fn user(role: Role) -> User {
        User::new("kim@example.com", role).unwrap()
    }

    #[test]
    fn from_secret_requires_value() {
        assert!(SessionConfig::from_secret(Some("s")).is_ok());
        assert!(matches!(
            SessionConfig::from_secret(Some("  ")),
            Err(AuthError::NotConfigured)
        ));
        assert!(SessionConfig::from_secret(None).is_err());
    }

    #[test]
    fn issue_and_validate_round_trip() {
        let config = config();
        let user = user(Role::Admin);
        let (token, issued) = config.issue(&user).unwrap();

        let claims = config.validate(&token).unwrap();
        assert_eq!(claims, issued);
        assert_eq!(claims.user_id().unwrap(), user.id());
        assert!(claims.verified);
        assert!(claims.is_admin());
        assert_eq!(claims.exp - claims.iat, DEFAULT_SESSION_TTL_SECS);
    }

    #[test]
    fn wrong_secret_rejected() {
        let (token, _) = config().issue(&user(Role::User)).unwrap();
        let result = SessionConfig::new("wrong-secret").validate(&token);
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn expired_token_rejected() {
        let now = get_current_timestamp();
        let mut claims = Claims::for_user(&user(Role::User), now - 7200, 3600);
        claims.exp = now - 10;
        let token = create_jwt(&claims, "test-secret-key-for-jwt-validation").unwrap();

        let result = config().validate(&token);
        assert!(matches!(result, Err(AuthError::TokenExpired)));
    }

    #[test]
    fn cookie_attributes() {
        let cookie = config().cookie("abc");
        assert!(cookie.starts_with("onramp_session=abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Max-Age=86400"));
        assert!(!cookie.contains("Secure"));

        let cleared = config().with_secure(true).clear_cookie();
        assert!(cleared.contains("Max-Age=0"));
        assert!(cleared.ends_with("; Secure"));
    }

    #[test]
    fn cookie_value_parses_multiple_pairs() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(
            COOKIE,
            HeaderValue::from_static("lang=en; onramp_session=tok.en.x; other=1"),
        );
        assert_eq!(cookie_value(&headers, SESSION_COOKIE), Some("tok.en.x"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn session_token_falls_back_to_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(session_token(&headers), Some("abc123"));

        headers.insert(COOKIE, HeaderValue::from_static("onramp_session=fromcookie"));
        assert_eq!(session_token(&headers), Some("fromcookie"));
    }

    #[test]
    fn extract_bearer_token_invalid() {
        assert_eq!(extract_bearer_token("Basic abc123"), None);
        assert_eq!(extract_bearer_token("abc123"), None);
    }

    #[test]
    fn auth_error_statuses() {
        assert_eq!(AuthError::MissingCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::InsufficientPermissions.status(), StatusCode::FORBIDDEN);
        assert_eq!(AuthError::NotConfigured.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn claims_serialization() {
        let claims = Claims::for_user(&user(Role::Admin), 1000, 10);
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["role"], "admin");
        assert_eq!(json["verified"], true);
        assert_eq!(json["exp"], 1010);
    }
}
