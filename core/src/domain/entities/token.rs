//! Token entities for signed bearer credentials.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Kind of bearer token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authorization hints carried by a token
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSet {
    /// Role of the subject, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Fine-grained permissions
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl ClaimSet {
    pub fn new(role: Option<String>, permissions: Vec<String>) -> Self {
        Self { role, permissions }
    }

    pub fn with_role(role: impl Into<String>) -> Self {
        Self {
            role: Some(role.into()),
            permissions: Vec::new(),
        }
    }
}

/// Claims structure for the token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user identity)
    pub sub: String,

    /// Token kind
    #[serde(rename = "type")]
    pub token_type: TokenType,

    /// Unique token identifier, used as the revocation key
    pub jti: String,

    /// Identifier of the signing key
    pub kid: String,

    /// Role hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Permission hints
    #[serde(default)]
    pub permissions: Vec<String>,

    /// Correlates an access token with its sibling refresh token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pair_id: Option<String>,

    /// Issued at timestamp
    pub iat: i64,

    /// Not before timestamp
    pub nbf: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,
}

impl TokenClaims {
    /// Authorization hints carried by these claims
    pub fn claim_set(&self) -> ClaimSet {
        ClaimSet {
            role: self.role.clone(),
            permissions: self.permissions.clone(),
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.iat, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }

    /// Seconds until expiry, zero once expired
    pub fn remaining_seconds(&self) -> u64 {
        let remaining = self.exp - Utc::now().timestamp();
        if remaining > 0 {
            remaining as u64
        } else {
            0
        }
    }

    pub fn is_expired(&self) -> bool {
        self.exp <= Utc::now().timestamp()
    }
}

/// Freshly issued access/refresh pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived token for API requests
    pub access_token: String,

    /// Long-lived token for obtaining a new pair
    pub refresh_token: String,

    /// Access token lifetime in seconds
    pub access_expires_in: u64,

    /// Refresh token lifetime in seconds
    pub refresh_expires_in: u64,

    /// Identifier shared by both tokens
    pub pair_id: String,
}
