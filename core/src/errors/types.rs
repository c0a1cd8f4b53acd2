//! Credential failure taxonomy
//!
//! Every way a presented token can be rejected maps onto exactly one variant.
//! The presentation layer turns these into HTTP statuses and client-facing
//! categories; the variants themselves carry no secret material.

use thiserror::Error;

use crate::domain::entities::TokenType;

/// Token-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Malformed token")]
    Malformed,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Token expired")]
    Expired,

    #[error("Token not yet valid")]
    NotYetValid,

    #[error("Wrong token type: expected {expected}, got {actual}")]
    WrongType { expected: TokenType, actual: TokenType },

    #[error("Token revoked")]
    Revoked,

    #[error("No active signing key")]
    NoActiveKey,
}

impl TokenError {
    /// Client-facing category for this failure
    pub fn category(&self) -> &'static str {
        match self {
            TokenError::MissingToken => "unauthenticated",
            TokenError::Malformed
            | TokenError::InvalidSignature
            | TokenError::NotYetValid
            | TokenError::WrongType { .. } => "invalid_token",
            TokenError::Expired => "token_expired",
            TokenError::Revoked => "token_revoked",
            TokenError::NoActiveKey => "server_error",
        }
    }

    /// Whether the client can recover without logging in again
    pub fn is_retryable(&self) -> bool {
        matches!(self, TokenError::Expired)
    }
}
