//! Token issuance

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use tracing::debug;
use uuid::Uuid;

use crate::domain::entities::{ClaimSet, TokenClaims, TokenPair, TokenType};
use crate::errors::{DomainError, DomainResult};

use super::config::{to_chrono, TokenServiceConfig};
use super::key_store::KeyStore;

/// Mints signed access and refresh tokens with the key store's current key
pub struct TokenIssuer {
    keys: Arc<KeyStore>,
    config: TokenServiceConfig,
}

impl TokenIssuer {
    pub fn new(keys: Arc<KeyStore>, config: TokenServiceConfig) -> Self {
        Self { keys, config }
    }

    pub fn config(&self) -> &TokenServiceConfig {
        &self.config
    }

    pub fn key_store(&self) -> &Arc<KeyStore> {
        &self.keys
    }

    /// Issues a short-lived access token
    ///
    /// # Errors
    ///
    /// * `TokenError::NoActiveKey` - no primary secret is configured
    pub fn issue_access_token(&self, subject_id: &str, claims: &ClaimSet) -> DomainResult<String> {
        self.issue(subject_id, claims, TokenType::Access, None)
    }

    /// Issues a long-lived refresh token linked to `pair_id`
    pub fn issue_refresh_token(
        &self,
        subject_id: &str,
        claims: &ClaimSet,
        pair_id: &str,
    ) -> DomainResult<String> {
        self.issue(subject_id, claims, TokenType::Refresh, Some(pair_id))
    }

    /// Issues an access/refresh pair sharing one pair id
    pub fn issue_pair(&self, subject_id: &str, claims: &ClaimSet) -> DomainResult<TokenPair> {
        let pair_id = Uuid::new_v4().to_string();

        let access_token = self.issue(subject_id, claims, TokenType::Access, Some(&pair_id))?;
        let refresh_token = self.issue_refresh_token(subject_id, claims, &pair_id)?;

        debug!(subject_id, pair_id = %pair_id, "Issued token pair");

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_expires_in: self.config.access_ttl_seconds(),
            refresh_expires_in: self.config.refresh_ttl_seconds(),
            pair_id,
        })
    }

    fn issue(
        &self,
        subject_id: &str,
        claims: &ClaimSet,
        token_type: TokenType,
        pair_id: Option<&str>,
    ) -> DomainResult<String> {
        if subject_id.is_empty() {
            return Err(DomainError::Validation {
                message: "Token subject must not be empty".to_string(),
            });
        }

        let ttl = match token_type {
            TokenType::Access => self.config.access_ttl,
            TokenType::Refresh => self.config.refresh_ttl,
        };
        let now = Utc::now();

        let claims = TokenClaims {
            sub: subject_id.to_string(),
            token_type,
            jti: Uuid::new_v4().to_string(),
            kid: String::new(),
            role: claims.role.clone(),
            permissions: claims.permissions.clone(),
            pair_id: pair_id.map(str::to_string),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + to_chrono(ttl)).timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        self.sign(claims)
    }

    /// Signs arbitrary claims with the current key, stamping its id
    pub fn sign(&self, mut claims: TokenClaims) -> DomainResult<String> {
        let key = self.keys.current_key()?;
        claims.kid = key.id.clone();

        let mut header = Header::new(self.config.algorithm);
        header.kid = Some(key.id.clone());

        encode(&header, &claims, &EncodingKey::from_secret(&key.secret)).map_err(|e| {
            DomainError::Internal {
                message: format!("Failed to sign token: {}", e),
            }
        })
    }
}
