//! Token signature and structure verification
//!
//! Pure cryptographic checks against the key store's verification set.
//! Revocation is composed one layer up.

use std::sync::Arc;

use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use tracing::debug;

use crate::domain::entities::{SigningKey, TokenClaims, TokenType};
use crate::errors::{DomainResult, TokenError};

use super::config::TokenServiceConfig;
use super::key_store::KeyStore;

/// Result of checking a token against a single key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    Valid(TokenClaims),
    Invalid(TokenError),
}

/// Validates tokens against every verifiable key, current key first
pub struct TokenVerifier {
    keys: Arc<KeyStore>,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(keys: Arc<KeyStore>, config: &TokenServiceConfig) -> Self {
        let mut validation = Validation::new(config.algorithm);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "nbf", "iss", "aud", "sub"]);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = 0;

        Self { keys, validation }
    }

    /// Verifies signature and claims, trying each verification key in order
    ///
    /// A signature mismatch moves on to the next key; any other failure is
    /// final since no other key would change it.
    pub fn verify(&self, token: &str) -> DomainResult<TokenClaims> {
        let keys = self.keys.verification_keys();

        for key in &keys {
            match self.verify_with_key(token, key) {
                VerifyOutcome::Valid(claims) => return Ok(claims),
                VerifyOutcome::Invalid(TokenError::InvalidSignature) => continue,
                VerifyOutcome::Invalid(reason) => {
                    debug!(key_id = %key.id, reason = %reason, "Token rejected");
                    return Err(reason.into());
                }
            }
        }

        debug!(tried = keys.len(), "No verification key matched token signature");
        Err(TokenError::InvalidSignature.into())
    }

    /// Verifies the token and requires it to be of `expected` type
    pub fn verify_typed(&self, token: &str, expected: TokenType) -> DomainResult<TokenClaims> {
        let claims = self.verify(token)?;
        if claims.token_type != expected {
            return Err(TokenError::WrongType {
                expected,
                actual: claims.token_type,
            }
            .into());
        }
        Ok(claims)
    }

    /// Single-key attempt
    pub fn verify_with_key(&self, token: &str, key: &SigningKey) -> VerifyOutcome {
        match decode::<TokenClaims>(token, &DecodingKey::from_secret(&key.secret), &self.validation) {
            Ok(data) => VerifyOutcome::Valid(data.claims),
            Err(e) => VerifyOutcome::Invalid(map_error_kind(e.kind())),
        }
    }

    /// Decodes the payload without checking signature or expiry
    ///
    /// Only for extracting identifiers (token id, type, expiry) from tokens
    /// that are being revoked; never use the result for authorization.
    pub fn peek_claims(token: &str) -> DomainResult<TokenClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
            .map(|data| data.claims)
            .map_err(|_| TokenError::Malformed.into())
    }
}

fn map_error_kind(kind: &ErrorKind) -> TokenError {
    match kind {
        ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::ImmatureSignature => TokenError::NotYetValid,
        // Algorithm mismatch, bad encoding, wrong issuer or audience
        _ => TokenError::Malformed,
    }
}
