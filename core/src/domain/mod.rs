//! Domain layer containing the credential lifecycle entities.

pub mod entities;

// Re-export commonly used domain types
pub use entities::{
    ClaimSet, Identity, KeySource, KeySummary, RevocationReason, RevocationRecord, SigningKey,
    TokenClaims, TokenPair, TokenType,
};
