//! Configuration for the token services

use std::time::Duration;

use jsonwebtoken::Algorithm;

use ck_shared::config::{AuthConfig, TokenLifetimes};

use crate::errors::{DomainError, DomainResult};

/// Upper bound used when a configured duration does not fit a timestamp offset
const MAX_OFFSET_DAYS: i64 = 36_500;

/// Converts a configured duration into a timestamp offset
pub(crate) fn to_chrono(duration: Duration) -> chrono::Duration {
    chrono::Duration::from_std(duration)
        .ok()
        .filter(|d| *d < chrono::Duration::days(MAX_OFFSET_DAYS))
        .unwrap_or_else(|| chrono::Duration::days(MAX_OFFSET_DAYS))
}

/// Key rotation parameters for the [`KeyStore`](super::KeyStore)
#[derive(Debug, Clone, Copy)]
pub struct KeyStoreConfig {
    /// Issuance window of a generated key
    pub rotation_interval: chrono::Duration,
    /// How long a retired key keeps verifying after its issuance window closed
    pub grace_period: chrono::Duration,
}

impl KeyStoreConfig {
    pub fn new(rotation_interval: Duration, grace_period: Duration) -> Self {
        Self {
            rotation_interval: to_chrono(rotation_interval),
            grace_period: to_chrono(grace_period),
        }
    }
}

impl From<&TokenLifetimes> for KeyStoreConfig {
    fn from(lifetimes: &TokenLifetimes) -> Self {
        Self::new(lifetimes.rotation_interval, lifetimes.key_grace_period)
    }
}

impl Default for KeyStoreConfig {
    fn default() -> Self {
        Self {
            rotation_interval: chrono::Duration::days(30),
            grace_period: chrono::Duration::days(7),
        }
    }
}

/// Configuration for token issuance and verification
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// Pinned signing algorithm
    pub algorithm: Algorithm,
    /// Issuer claim
    pub issuer: String,
    /// Audience claim
    pub audience: String,
    /// Access token lifetime
    pub access_ttl: Duration,
    /// Refresh token lifetime
    pub refresh_ttl: Duration,
}

impl TokenServiceConfig {
    /// Build from the shared auth configuration, rejecting non-HMAC algorithms
    pub fn from_auth_config(config: &AuthConfig) -> DomainResult<Self> {
        let lifetimes = config.lifetimes();
        Ok(Self {
            algorithm: parse_algorithm(&config.algorithm)?,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            access_ttl: lifetimes.access,
            refresh_ttl: lifetimes.refresh,
        })
    }

    pub fn access_ttl_seconds(&self) -> u64 {
        self.access_ttl.as_secs()
    }

    pub fn refresh_ttl_seconds(&self) -> u64 {
        self.refresh_ttl.as_secs()
    }
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::HS256,
            issuer: "credkeep".to_string(),
            audience: "credkeep-api".to_string(),
            access_ttl: Duration::from_secs(60 * 60),
            refresh_ttl: Duration::from_secs(7 * 24 * 60 * 60),
        }
    }
}

/// Only symmetric HMAC algorithms are supported
pub fn parse_algorithm(name: &str) -> DomainResult<Algorithm> {
    match name.trim().to_ascii_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        other => Err(DomainError::Config {
            message: format!("Unsupported signing algorithm: {}", other),
        }),
    }
}
