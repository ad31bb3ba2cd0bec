//! # Configuration
//!
//! Application configuration loading and management.
//!
//! This module provides configuration structures and loading mechanisms
//! for the onramp gateway, supporting both environment variables and
//! configuration files.
//!
//! # Configuration Sources
//!
//! Configuration is loaded in the following order (later sources override earlier):
//! 1. Default values
//! 2. Configuration file (if exists)
//! 3. Environment variables (prefixed with `ONRAMP_`)
//!
//! # Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `ONRAMP_CONFIG_FILE` | TOML config path | `config.toml` |
//! | `ONRAMP_REST_HOST` | REST server host | `0.0.0.0` |
//! | `ONRAMP_REST_PORT` | REST server port | `8080` |
//! | `ONRAMP_LOG_LEVEL` | Log level | `info` |
//! | `ONRAMP_LOG_FORMAT` | Log format (json/pretty) | `json` |
//! | `ONRAMP_UPSTREAM_BASE_URL` | Exchange provider base URL | `https://api.sandbox.example.com` |
//! | `ONRAMP_UPSTREAM_API_KEY` | Provider API key | none |
//! | `ONRAMP_UPSTREAM_API_SECRET` | Provider HMAC secret | none |
//! | `ONRAMP_JWT_SECRET` | Session signing secret | none |
//! | `ONRAMP_ADMIN_EMAILS` | Comma-separated admin emails | empty |
//! | `ONRAMP_QUOTE_REFRESH_SECS` | Live quote refresh interval | `15` |
//! | `ONRAMP_AMOUNT_PREFERENCE` | `source` or `target` | `source` |
//! | `ONRAMP_SERVICE_NAME` | Service name | `onramp-gateway` |
//! | `ONRAMP_ENVIRONMENT` | Deployment environment | `development` |
//!
//! # Examples
//!
//! ```no_run
//! use onramp_gateway::config::AppConfig;
//!
//! let config = AppConfig::load()?;
//! println!("REST server: {}:{}", config.rest.host, config.rest.port);
//! # Ok::<(), onramp_gateway::config::ConfigError>(())
//! ```

use crate::domain::entities::AmountPreference;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "ONRAMP_";

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse configuration.
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// Invalid configuration value.
    #[error("invalid config value for {field}: {message}")]
    InvalidValue {
        /// Field name.
        field: String,
        /// Error message.
        message: String,
    },

    /// A required secret is absent or empty.
    #[error("missing required secret: {0}")]
    MissingSecret(&'static str),
}

impl ConfigError {
    fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

// ============================================================================
// Server Configuration
// ============================================================================

/// REST/HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestConfig {
    /// Server host address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port.
    #[serde(default = "default_rest_port")]
    pub port: u16,

    /// Enable CORS.
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Allowed CORS origins (empty = allow all).
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_rest_port(),
            enable_cors: true,
            cors_origins: Vec::new(),
        }
    }
}

impl RestConfig {
    /// Returns the socket address for the REST server.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be parsed.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::invalid("rest.host:port", format!("{e}")))
    }
}

// ============================================================================
// Logging Configuration
// ============================================================================

/// Log format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON format (structured logging).
    #[default]
    Json,
    /// Pretty format (human-readable).
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include target (module path) in logs.
    #[serde(default = "default_true")]
    pub include_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Json,
            include_target: true,
        }
    }
}

// ============================================================================
// Upstream Configuration
// ============================================================================

/// Exchange provider connection settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the provider API.
    #[serde(default = "default_upstream_url")]
    pub base_url: String,

    /// API key sent in the `api-key` header.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Shared secret for request and webhook signatures.
    #[serde(default)]
    pub api_secret: Option<String>,

    /// Request timeout in milliseconds.
    #[serde(default = "default_upstream_timeout")]
    pub timeout_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_upstream_url(),
            api_key: None,
            api_secret: None,
            timeout_ms: default_upstream_timeout(),
        }
    }
}

impl fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &redacted(self.api_key.as_deref()))
            .field("api_secret", &redacted(self.api_secret.as_deref()))
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

// ============================================================================
// Auth Configuration
// ============================================================================

/// Session and login code settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 secret for session tokens.
    #[serde(default)]
    pub jwt_secret: Option<String>,

    /// Session lifetime in seconds.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: i64,

    /// Login code lifetime in seconds.
    #[serde(default = "default_otp_ttl")]
    pub otp_ttl_secs: i64,

    /// Guesses allowed per login code.
    #[serde(default = "default_otp_attempts")]
    pub otp_max_attempts: u32,

    /// Emails granted the admin role.
    #[serde(default)]
    pub admin_emails: Vec<String>,

    /// Adds `Secure` to the session cookie.
    #[serde(default)]
    pub secure_cookie: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            session_ttl_secs: default_session_ttl(),
            otp_ttl_secs: default_otp_ttl(),
            otp_max_attempts: default_otp_attempts(),
            admin_emails: Vec::new(),
            secure_cookie: false,
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &redacted(self.jwt_secret.as_deref()))
            .field("session_ttl_secs", &self.session_ttl_secs)
            .field("otp_ttl_secs", &self.otp_ttl_secs)
            .field("otp_max_attempts", &self.otp_max_attempts)
            .field("admin_emails", &self.admin_emails)
            .field("secure_cookie", &self.secure_cookie)
            .finish()
    }
}

// ============================================================================
// Quote Configuration
// ============================================================================

/// Quote and catalog behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteConfig {
    /// Live quote refresh interval in seconds.
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u32,

    /// Which amount wins when a form carries both.
    #[serde(default)]
    pub amount_preference: AmountPreference,

    /// Catalog cache TTL in seconds.
    #[serde(default = "default_catalog_ttl")]
    pub catalog_ttl_secs: u64,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            refresh_secs: default_refresh_secs(),
            amount_preference: AmountPreference::default(),
            catalog_ttl_secs: default_catalog_ttl(),
        }
    }
}

// ============================================================================
// Application Configuration
// ============================================================================

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// REST server configuration.
    #[serde(default)]
    pub rest: RestConfig,

    /// Logging configuration.
    #[serde(default)]
    pub log: LogConfig,

    /// Exchange provider configuration.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Session configuration.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Quote configuration.
    #[serde(default)]
    pub quotes: QuoteConfig,

    /// Service name for tracing.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Environment (development, staging, production).
    #[serde(default = "default_environment")]
    pub environment: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rest: RestConfig::default(),
            log: LogConfig::default(),
            upstream: UpstreamConfig::default(),
            auth: AuthConfig::default(),
            quotes: QuoteConfig::default(),
            service_name: default_service_name(),
            environment: default_environment(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment variables and optional config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// if an environment override is malformed.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let config_path = std::env::var(format!("{ENV_PREFIX}CONFIG_FILE"))
            .unwrap_or_else(|_| "config.toml".to_string());

        if Path::new(&config_path).exists() {
            config = Self::from_file(&config_path)?;
        }

        config.apply_overrides(|key| std::env::var(format!("{ENV_PREFIX}{key}")).ok())?;

        Ok(config)
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid configuration.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Applies overrides. `lookup` receives the variable name without the
    /// `ONRAMP_` prefix.
    ///
    /// # Errors
    ///
    /// Returns an error for unparsable numeric or enum values.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // REST configuration
        if let Some(host) = lookup("REST_HOST") {
            self.rest.host = host;
        }
        if let Some(port) = lookup("REST_PORT") {
            self.rest.port = parse_env("REST_PORT", &port)?;
        }

        // Logging configuration
        if let Some(level) = lookup("LOG_LEVEL") {
            self.log.level = level;
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            self.log.format = match format.to_lowercase().as_str() {
                "pretty" => LogFormat::Pretty,
                _ => LogFormat::Json,
            };
        }

        // Upstream configuration
        if let Some(url) = lookup("UPSTREAM_BASE_URL") {
            self.upstream.base_url = url;
        }
        if let Some(key) = lookup("UPSTREAM_API_KEY") {
            self.upstream.api_key = Some(key);
        }
        if let Some(secret) = lookup("UPSTREAM_API_SECRET") {
            self.upstream.api_secret = Some(secret);
        }

        // Auth configuration
        if let Some(secret) = lookup("JWT_SECRET") {
            self.auth.jwt_secret = Some(secret);
        }
        if let Some(emails) = lookup("ADMIN_EMAILS") {
            self.auth.admin_emails = emails
                .split(',')
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(str::to_string)
                .collect();
        }

        // Quote configuration
        if let Some(secs) = lookup("QUOTE_REFRESH_SECS") {
            self.quotes.refresh_secs = parse_env("QUOTE_REFRESH_SECS", &secs)?;
        }
        if let Some(preference) = lookup("AMOUNT_PREFERENCE") {
            self.quotes.amount_preference = preference
                .parse()
                .map_err(|e| ConfigError::invalid("AMOUNT_PREFERENCE", format!("{e}")))?;
        }

        // Service configuration
        if let Some(name) = lookup("SERVICE_NAME") {
            self.service_name = name;
        }
        if let Some(env) = lookup("ENVIRONMENT") {
            self.environment = env;
        }
        Ok(())
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rest.socket_addr()?;

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log.level.to_lowercase().as_str()) {
            return Err(ConfigError::invalid(
                "log.level",
                format!(
                    "invalid log level '{}', must be one of: {:?}",
                    self.log.level, valid_levels
                ),
            ));
        }

        if self.quotes.refresh_secs == 0 || self.quotes.refresh_secs > 300 {
            return Err(ConfigError::invalid(
                "quotes.refresh_secs",
                "must be between 1 and 300",
            ));
        }

        if !self.upstream.base_url.starts_with("http://")
            && !self.upstream.base_url.starts_with("https://")
        {
            return Err(ConfigError::invalid(
                "upstream.base_url",
                "must be an http(s) URL",
            ));
        }

        if self.auth.session_ttl_secs <= 0 || self.auth.otp_ttl_secs <= 0 {
            return Err(ConfigError::invalid("auth", "lifetimes must be positive"));
        }

        Ok(())
    }

    /// Checks that every secret the service needs is present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingSecret` naming the first missing secret.
    pub fn require_secrets(&self) -> Result<(), ConfigError> {
        let present =
            |value: &Option<String>| value.as_deref().is_some_and(|s| !s.trim().is_empty());

        if !present(&self.upstream.api_key) {
            return Err(ConfigError::MissingSecret("upstream.api_key"));
        }
        if !present(&self.upstream.api_secret) {
            return Err(ConfigError::MissingSecret("upstream.api_secret"));
        }
        if !present(&self.auth.jwt_secret) {
            return Err(ConfigError::MissingSecret("auth.jwt_secret"));
        }
        Ok(())
    }
}

fn parse_env<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| ConfigError::invalid(key, format!("{e}")))
}

fn redacted(value: Option<&str>) -> &'static str {
    match value {
        Some(_) => "[REDACTED]",
        None => "<unset>",
    }
}

// ============================================================================
// Default Value Functions
// ============================================================================

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_rest_port() -> u16 {
    8080
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_upstream_url() -> String {
    "https://api.sandbox.example.com".to_string()
}

fn default_upstream_timeout() -> u64 {
    10_000
}

fn default_session_ttl() -> i64 {
    86_400
}

fn default_otp_ttl() -> i64 {
    300
}

fn default_otp_attempts() -> u32 {
    5
}

fn default_refresh_secs() -> u32 {
    15
}

fn default_catalog_ttl() -> u64 {
    300
}

fn default_service_name() -> String {
    "onramp-gateway".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn with_secrets() -> AppConfig {
        let mut config = AppConfig::default();
        config.upstream.api_key = Some("key".into());
        config.upstream.api_secret = Some("secret".into());
        config.auth.jwt_secret = Some("jwt".into());
        config
    }

    #[test]
    fn app_config_default() {
        let config = AppConfig::default();
        assert_eq!(config.rest.port, 8080);
        assert_eq!(config.log.level, "info");
        assert_eq!(config.quotes.refresh_secs, 15);
        assert_eq!(config.auth.session_ttl_secs, 86_400);
        assert_eq!(config.quotes.amount_preference, AmountPreference::Source);
    }

    #[test]
    fn rest_config_socket_addr() {
        let addr = RestConfig::default().socket_addr().unwrap();
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn app_config_validate_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn app_config_validate_invalid_log_level() {
        let mut config = AppConfig::default();
        config.log.level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn app_config_validate_refresh_interval() {
        let mut config = AppConfig::default();
        config.quotes.refresh_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rest_config_invalid_address() {
        let config = RestConfig {
            host: "invalid host with spaces".to_string(),
            ..Default::default()
        };
        assert!(config.socket_addr().is_err());
    }

    #[test]
    fn toml_sections_parse() {
        let config = AppConfig::from_toml(
            r#"
            service_name = "gw"

            [upstream]
            base_url = "https://provider.test"
            api_key = "k"

            [quotes]
            refresh_secs = 20
            amount_preference = "target"

            [auth]
            admin_emails = ["ops@example.com"]
            "#,
        )
        .unwrap();

        assert_eq!(config.service_name, "gw");
        assert_eq!(config.upstream.api_key.as_deref(), Some("k"));
        assert_eq!(config.quotes.refresh_secs, 20);
        assert_eq!(config.quotes.amount_preference, AmountPreference::Target);
        assert_eq!(config.auth.admin_emails, vec!["ops@example.com"]);
        assert_eq!(config.rest.port, 8080);
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = AppConfig::default();
        config
            .apply_overrides(lookup(&[
                ("REST_PORT", "9090"),
                ("LOG_FORMAT", "pretty"),
                ("UPSTREAM_API_SECRET", "s3cret"),
                ("ADMIN_EMAILS", "a@x.io, b@x.io,,"),
                ("AMOUNT_PREFERENCE", "to"),
                ("QUOTE_REFRESH_SECS", "10"),
            ]))
            .unwrap();

        assert_eq!(config.rest.port, 9090);
        assert_eq!(config.log.format, LogFormat::Pretty);
        assert_eq!(config.upstream.api_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.auth.admin_emails, vec!["a@x.io", "b@x.io"]);
        assert_eq!(config.quotes.amount_preference, AmountPreference::Target);
        assert_eq!(config.quotes.refresh_secs, 10);
    }

    #[test]
    fn malformed_env_override_is_error() {
        let mut config = AppConfig::default();
        let err = config
            .apply_overrides(lookup(&[("REST_PORT", "eighty")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn require_secrets_names_missing_one() {
        assert!(with_secrets().require_secrets().is_ok());

        let mut config = with_secrets();
        config.auth.jwt_secret = Some("  ".into());
        let err = config.require_secrets().unwrap_err();
        assert!(matches!(err, ConfigError::MissingSecret("auth.jwt_secret")));

        let err = AppConfig::default().require_secrets().unwrap_err();
        assert!(matches!(err, ConfigError::MissingSecret("upstream.api_key")));
    }

    #[test]
    fn debug_redacts_secrets() {
        let rendered = format!("{:?}", with_secrets());
        assert!(!rendered.contains("secret\""));
        assert!(rendered.contains("[REDACTED]"));
    }
}
