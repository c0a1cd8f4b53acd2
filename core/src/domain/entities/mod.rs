//! Domain entities for signing keys, tokens and revocation records.

pub mod identity;
pub mod revocation;
pub mod signing_key;
pub mod token;

// Re-export commonly used types
pub use identity::Identity;
pub use revocation::{RevocationReason, RevocationRecord};
pub use signing_key::{KeySource, KeySummary, SigningKey, SECRET_LENGTH};
pub use token::{ClaimSet, TokenClaims, TokenPair, TokenType};
