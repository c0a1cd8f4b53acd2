//! Token service module for signed bearer tokens
//!
//! This module handles all token-related operations including:
//! - Signing key generation, rotation and persistence
//! - Access and refresh token issuance
//! - Multi-key signature verification
//! - Background cleanup of retired keys

mod cleanup;
mod config;
mod issuer;
mod key_store;
mod verifier;

#[cfg(test)]
mod tests;

pub use cleanup::{CleanupResult, KeyCleanupConfig, KeyCleanupService};
pub use config::{KeyStoreConfig, TokenServiceConfig};
pub use issuer::TokenIssuer;
pub use key_store::{KeySet, KeyStore, KeyStoreStatus};
pub use verifier::{TokenVerifier, VerifyOutcome};
