//! # In-Memory Repositories
//!
//! Thread-safe `HashMap`-backed implementations of the repository traits.
//! The service runs on these; nothing is persisted across restarts.

pub mod catalog_settings;
pub mod otp_store;
pub mod transaction_repository;
pub mod user_repository;

pub use catalog_settings::InMemoryCatalogSettings;
pub use otp_store::InMemoryOtpStore;
pub use transaction_repository::InMemoryTransactionRepository;
pub use user_repository::InMemoryUserRepository;
