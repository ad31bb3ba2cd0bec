//! # Domain Layer
//!
//! Core business logic following Domain-Driven Design principles.
//!
//! This layer contains:
//! - **Entities**: Quotes, quote requests, transactions, users and the catalog
//! - **Value Objects**: Amounts, identifiers, statuses and small enums
//! - **Errors**: Domain-specific error types
//!
//! Nothing here performs I/O.

pub mod entities;
pub mod errors;
pub mod value_objects;
