//! # Application Errors
//!
//! Error types for the application layer.
//!
//! These errors represent failures that can occur during use case execution,
//! including validation failures, authorization failures, and errors raised by
//! the upstream exchange provider.

use crate::domain::errors::DomainError;
use crate::infrastructure::persistence::RepositoryError;
use thiserror::Error;

/// Failure talking to the upstream exchange provider.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UpstreamError {
    /// Credentials or base URL missing.
    #[error("upstream not configured: {0}")]
    Configuration(String),

    /// The provider answered with a non-success status.
    #[error("upstream error {status} {status_text}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase for the status.
        status_text: String,
        /// `errorMessage` from the body, or the reason phrase.
        message: String,
        /// `errorCode` from the body.
        code: Option<String>,
        /// `metadata` from the body.
        metadata: Option<serde_json::Value>,
    },

    /// The request never produced a response.
    #[error("upstream request failed: {0}")]
    Network(String),

    /// The response body could not be decoded.
    #[error("invalid upstream response: {0}")]
    Decode(String),
}

impl UpstreamError {
    /// Creates an API error with only a status.
    #[must_use]
    pub fn api(status: u16, status_text: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            status_text: status_text.into(),
            message: message.into(),
            code: None,
            metadata: None,
        }
    }

    /// Upstream HTTP status, if the provider answered.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Application layer error.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Request validation failed.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{resource} not found: {id}")]
    NotFound {
        /// Kind of resource.
        resource: &'static str,
        /// Identifier looked up.
        id: String,
    },

    /// Missing or invalid credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not permitted.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Request conflicts with current state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Server-side configuration missing.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Upstream provider error.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// Domain error.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Repository error.
    #[error("repository error: {0}")]
    Repository(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    /// Creates an unauthorized error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    /// Creates a forbidden error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// Creates a conflict error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Creates a repository error.
    #[must_use]
    pub fn repository(message: impl Into<String>) -> Self {
        Self::Repository(message.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict { .. } => Self::Conflict(err.to_string()),
            other => Self::Repository(other.to_string()),
        }
    }
}

/// Result type for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_message_surfaces_in_display() {
        let err: ApplicationError =
            UpstreamError::api(400, "Bad Request", "limit exceeded").into();
        assert!(err.to_string().contains("limit exceeded"));
        assert!(err.to_string().contains("400"));
    }

    #[test]
    fn upstream_status_only_for_api_errors() {
        assert_eq!(UpstreamError::api(404, "Not Found", "x").status(), Some(404));
        assert_eq!(UpstreamError::Network("reset".into()).status(), None);
    }

    #[test]
    fn not_found_names_resource() {
        let err = ApplicationError::not_found("transaction", "ref-1");
        assert_eq!(err.to_string(), "transaction not found: ref-1");
    }

    #[test]
    fn repository_conflict_maps_to_conflict() {
        let err: ApplicationError = RepositoryError::conflict("user", "a@example.com").into();
        assert!(matches!(err, ApplicationError::Conflict(_)));
        let err: ApplicationError = RepositoryError::query("timeout").into();
        assert!(matches!(err, ApplicationError::Repository(_)));
    }

    #[test]
    fn from_domain_error_is_transparent() {
        let err: ApplicationError = DomainError::MissingAmount.into();
        assert_eq!(err.to_string(), DomainError::MissingAmount.to_string());
    }
}
