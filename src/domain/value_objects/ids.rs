//! # Identity Value Objects
//!
//! Type-safe identity wrappers for domain identifiers.
//!
//! ## UUID-based Identifiers
//!
//! - [`UserId`] - Local user identifier
//!
//! ## String-based Identifiers
//!
//! Issued by the upstream exchange provider and treated as opaque:
//!
//! - [`QuoteId`] - Quote identifier
//! - [`ReferenceId`] - Transaction reference, shared across webhook events
//! - [`CustomerId`] - Upstream customer identifier

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Local user identifier.
///
/// # Examples
///
/// ```
/// use onramp_gateway::domain::value_objects::ids::UserId;
///
/// let id = UserId::new_v4();
/// assert_eq!(id.to_string().len(), 36);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a user ID from an existing UUID.
    #[inline]
    #[must_use]
    pub const fn new(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generates a new random user ID.
    #[must_use]
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner UUID value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> Uuid {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl From<Uuid> for UserId {
    #[inline]
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates the identifier from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[inline]
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns true if the identifier is empty or whitespace.
            #[must_use]
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(
    /// Upstream quote identifier.
    QuoteId
);

string_id!(
    /// Transaction reference identifier.
    ///
    /// Correlates a transaction across upstream webhook events and
    /// client-facing queries.
    ReferenceId
);

string_id!(
    /// Upstream customer identifier.
    CustomerId
);
