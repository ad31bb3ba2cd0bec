//! # Login Code Delivery
//!
//! [`OtpSender`] implementations.

use async_trait::async_trait;
use std::fmt;
use tracing::info;

/// Delivers login codes to users.
#[async_trait]
pub trait OtpSender: Send + Sync + fmt::Debug {
    /// Sends `code` to `email`.
    ///
    /// # Errors
    ///
    /// Returns a description of the delivery failure.
    async fn send(&self, email: &str, code: &str) -> Result<(), String>;
}

/// Writes login codes to the log instead of sending email.
///
/// Intended for development and tests; the code is logged at `info` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogOtpSender;

#[async_trait]
impl OtpSender for LogOtpSender {
    async fn send(&self, email: &str, code: &str) -> Result<(), String> {
        info!(email, code, "login code issued");
        Ok(())
    }
}
