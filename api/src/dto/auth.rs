//! Request and response bodies of the credential routes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ck_core::{Identity, KeyStoreStatus, RevocationStats, TokenPair};

/// Request body for POST /api/v1/auth/refresh
///
/// Claims always carry over from the presented token; unknown fields such as
/// `role` are ignored.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Token pair returned after a refresh
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub access_expires_in: u64,
    pub refresh_expires_in: u64,
}

impl From<TokenPair> for TokenResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: "Bearer".to_string(),
            access_expires_in: pair.access_expires_in,
            refresh_expires_in: pair.refresh_expires_in,
        }
    }
}

/// Optional body for POST /api/v1/auth/logout
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LogoutRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogoutResponse {
    pub access_revoked: bool,
    pub refresh_revoked: bool,
}

/// Identity of the caller, GET /api/v1/auth/me
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IdentityResponse {
    pub subject_id: String,
    pub role: Option<String>,
    pub permissions: Vec<String>,
    pub expires_at: DateTime<Utc>,
}

impl From<&Identity> for IdentityResponse {
    fn from(identity: &Identity) -> Self {
        Self {
            subject_id: identity.subject_id.clone(),
            role: identity.role.clone(),
            permissions: identity.permissions.clone(),
            expires_at: identity.expires_at,
        }
    }
}

/// Diagnostics, GET /api/v1/auth/status
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub keys: KeyStoreStatus,
    pub revocation: RevocationStats,
}
