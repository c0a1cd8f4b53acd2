//! Revocation records for explicitly invalidated tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::token::TokenType;

/// Why a token was revoked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevocationReason {
    ManualRevoke,
    TokenRotated,
    Logout,
    BulkRevoke,
}

impl RevocationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RevocationReason::ManualRevoke => "manual_revoke",
            RevocationReason::TokenRotated => "token_rotated",
            RevocationReason::Logout => "logout",
            RevocationReason::BulkRevoke => "bulk_revoke",
        }
    }

    /// Only rotation revocations tolerate near-simultaneous reuse
    pub fn has_grace_window(&self) -> bool {
        matches!(self, RevocationReason::TokenRotated)
    }
}

impl std::fmt::Display for RevocationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored marker that a token must be treated as invalid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationRecord {
    pub token_id: String,
    pub revoked_at: DateTime<Utc>,
    pub reason: RevocationReason,
    pub token_type: TokenType,
}

impl RevocationRecord {
    pub fn new(token_id: impl Into<String>, reason: RevocationReason, token_type: TokenType) -> Self {
        Self {
            token_id: token_id.into(),
            revoked_at: Utc::now(),
            reason,
            token_type,
        }
    }

    /// Whether the record still falls inside the rotation grace window at `now`
    pub fn within_grace_at(&self, now: DateTime<Utc>, grace: chrono::Duration) -> bool {
        self.reason.has_grace_window() && now - self.revoked_at < grace
    }
}
