//! # Infrastructure Layer
//!
//! Concrete implementations of the credkeep core's external collaborators:
//!
//! - **Cache**: Redis client with connection retry and command retry
//! - **Revocation**: Redis-backed [`RevocationBackend`](ck_core::RevocationBackend)
//!   and the configuration-driven selection of the revocation store backend

pub mod cache;
pub mod revocation;

pub use cache::RedisClient;
pub use revocation::{build_revocation_store, RedisRevocationBackend};

use ck_core::errors::DomainError;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Operation did not complete in time
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Stored data could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        DomainError::Internal {
            message: err.to_string(),
        }
    }
}
