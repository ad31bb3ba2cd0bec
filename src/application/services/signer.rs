//! # Request Signer
//!
//! HMAC-SHA256 signatures for the exchange provider.
//!
//! Outbound requests carry a `signature` header equal to the lowercase hex
//! HMAC of the uppercased HTTP method followed by the URL path. Inbound
//! webhooks are signed the same way over the raw body.
//!
//! # Examples
//!
//! ```
//! use onramp_gateway::application::services::signer::RequestSigner;
//!
//! let signer = RequestSigner::new("secret").unwrap();
//! let signature = signer.sign("post", "/v1/external/quotes");
//! assert_eq!(signature, signer.sign("POST", "/v1/external/quotes"));
//! assert_eq!(signature.len(), 64);
//! ```

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Signer construction error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignerError {
    /// The shared secret is absent or empty.
    #[error("API secret is not configured")]
    MissingSecret,
}

/// Signs requests with the shared upstream secret.
#[derive(Clone)]
pub struct RequestSigner {
    mac: HmacSha256,
}

impl fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSigner")
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl RequestSigner {
    /// Creates a signer.
    ///
    /// # Errors
    ///
    /// Returns `SignerError::MissingSecret` if the secret is empty.
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, SignerError> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(SignerError::MissingSecret);
        }
        let mac = HmacSha256::new_from_slice(secret).map_err(|_| SignerError::MissingSecret)?;
        Ok(Self { mac })
    }

    /// Creates a signer from an optional secret, as read from configuration.
    ///
    /// # Errors
    ///
    /// Returns `SignerError::MissingSecret` if the secret is `None` or blank.
    pub fn from_config(secret: Option<&str>) -> Result<Self, SignerError> {
        match secret {
            Some(secret) if !secret.trim().is_empty() => Self::new(secret),
            _ => Err(SignerError::MissingSecret),
        }
    }

    fn mac(&self) -> HmacSha256 {
        self.mac.clone()
    }

    /// Signs an outbound request.
    #[must_use]
    pub fn sign(&self, method: &str, path: &str) -> String {
        let mut mac = self.mac();
        mac.update(method.to_ascii_uppercase().as_bytes());
        mac.update(path.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Signs a raw payload.
    #[must_use]
    pub fn sign_payload(&self, payload: &[u8]) -> String {
        let mut mac = self.mac();
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    /// Verifies a hex signature over a raw payload in constant time.
    ///
    /// Malformed hex is treated as a mismatch.
    #[must_use]
    pub fn verify_payload(&self, payload: &[u8], signature: &str) -> bool {
        let Ok(expected) = hex::decode(signature.trim()) else {
            return false;
        };
        let mut mac = self.mac();
        mac.update(payload);
        mac.verify_slice(&expected).is_ok()
    }
}
