//! # Persistence Layer
//!
//! Repository traits and their in-memory implementations.

pub mod in_memory;
pub mod traits;

pub use traits::{
    CatalogSettingsRepository, OtpStore, RepositoryError, RepositoryResult,
    TransactionRepository, UserRepository,
};
