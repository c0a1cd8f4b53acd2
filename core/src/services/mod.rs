//! Credential lifecycle services.

pub mod credential;
pub mod revocation;
pub mod token;

// Re-export commonly used types
pub use credential::{CredentialService, PairRevocation};
pub use revocation::{
    BatchRevocationReport, InMemoryRevocationBackend, RevocationBackend, RevocationOutcome,
    RevocationSettings, RevocationStats, RevocationStore,
};
pub use token::{
    CleanupResult, KeyCleanupConfig, KeyCleanupService, KeySet, KeyStore, KeyStoreConfig,
    KeyStoreStatus, TokenIssuer, TokenServiceConfig, TokenVerifier, VerifyOutcome,
};
