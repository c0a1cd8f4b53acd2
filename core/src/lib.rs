//! # Credkeep Core
//!
//! Credential lifecycle domain for the credkeep service: signing key
//! management and rotation, token issuance and verification, the revocation
//! store and the orchestration service that composes them.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
