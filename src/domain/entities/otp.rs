//! # One-Time Code
//!
//! A pending email login challenge.
//!
//! Only the SHA-256 digest of the code is kept. A challenge dies when it
//! expires, when it is used, or after too many wrong guesses.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Number of digits in a login code.
pub const OTP_DIGITS: usize = 6;

fn digest(code: &str) -> String {
    hex::encode(Sha256::digest(code.as_bytes()))
}

/// Returns true if `code` has the shape of a login code.
#[must_use]
pub fn is_well_formed(code: &str) -> bool {
    code.len() == OTP_DIGITS && code.bytes().all(|b| b.is_ascii_digit())
}

/// Outcome of checking a guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpCheck {
    /// Correct code.
    Valid,
    /// Wrong code; the challenge stays alive with `remaining` guesses.
    Invalid {
        /// Guesses left.
        remaining: u32,
    },
    /// Wrong code and no guesses left, or the challenge expired.
    Exhausted,
}

/// A stored login challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OneTimeCode {
    email: String,
    code_digest: String,
    expires_at: DateTime<Utc>,
    attempts: u32,
    max_attempts: u32,
}

impl OneTimeCode {
    /// Creates a challenge for `email` valid for `ttl`.
    #[must_use]
    pub fn new(email: impl Into<String>, code: &str, ttl: Duration, max_attempts: u32) -> Self {
        Self {
            email: email.into(),
            code_digest: digest(code),
            expires_at: Utc::now() + ttl,
            attempts: 0,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Email the challenge was sent to.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Expiry instant.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Wrong guesses so far.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Returns true if expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Checks a guess at `now`, counting wrong ones.
    pub fn check_at(&mut self, guess: &str, now: DateTime<Utc>) -> OtpCheck {
        if self.is_expired_at(now) || self.attempts >= self.max_attempts {
            return OtpCheck::Exhausted;
        }
        if digest(guess.trim()) == self.code_digest {
            return OtpCheck::Valid;
        }
        self.attempts += 1;
        match self.max_attempts - self.attempts {
            0 => OtpCheck::Exhausted,
            remaining => OtpCheck::Invalid { remaining },
        }
    }
}
