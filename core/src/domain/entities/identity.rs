//! Authenticated identity resolved from an access token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::token::TokenClaims;

/// Identity attached to a request once its token has been authenticated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub subject_id: String,
    pub role: Option<String>,
    pub permissions: Vec<String>,
    pub token_id: String,
    pub pair_id: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl Identity {
    pub fn has_role(&self, role: &str) -> bool {
        self.role.as_deref() == Some(role)
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }
}

impl From<&TokenClaims> for Identity {
    fn from(claims: &TokenClaims) -> Self {
        Self {
            subject_id: claims.sub.clone(),
            role: claims.role.clone(),
            permissions: claims.permissions.clone(),
            token_id: claims.jti.clone(),
            pair_id: claims.pair_id.clone(),
            expires_at: claims.expires_at(),
        }
    }
}
