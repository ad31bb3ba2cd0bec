//! # Application Services
//!
//! Services that orchestrate domain logic and infrastructure.
//!
//! - [`RequestSigner`]: HMAC request and webhook signatures
//! - [`countdown`]: Quote refresh countdown and its Tokio driver
//! - [`OtpService`]: Email login codes
//! - [`ConfigCache`]: Provider catalog cache with admin overlay

pub mod config_cache;
pub mod countdown;
pub mod otp;
pub mod signer;

pub use config_cache::{ConfigCache, DEFAULT_CATALOG_TTL_SECS};
pub use countdown::{
    Countdown, CountdownCommand, CountdownHandle, DEFAULT_REFRESH_SECS, Tick, spawn_countdown,
};
pub use otp::OtpService;
pub use signer::{RequestSigner, SignerError};
