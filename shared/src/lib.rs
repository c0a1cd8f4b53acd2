//! Shared utilities and common types for the credkeep workspace
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types
//! - Error response structures and error codes
//! - Duration string parsing for operator-facing configuration

pub mod config;
pub mod errors;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppSettings, AuthConfig, CacheConfig, Environment, LoggingConfig, ServerConfig,
    TokenLifetimes,
};
pub use errors::{error_codes, ErrorResponse};
pub use utils::duration::parse_duration;
