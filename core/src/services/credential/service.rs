//! Credential service composing issuance, verification and revocation

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::entities::{ClaimSet, Identity, RevocationReason, TokenPair, TokenType};
use crate::errors::{DomainResult, TokenError};
use crate::services::revocation::{BatchRevocationReport, RevocationStats, RevocationStore};
use crate::services::token::{KeyStore, KeyStoreStatus, TokenIssuer, TokenServiceConfig, TokenVerifier};

/// Outcome of revoking an access/refresh pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PairRevocation {
    pub access_revoked: bool,
    pub refresh_revoked: bool,
}

/// Entry point for everything that touches a credential
pub struct CredentialService {
    issuer: TokenIssuer,
    verifier: TokenVerifier,
    revocations: Arc<RevocationStore>,
}

impl CredentialService {
    pub fn new(issuer: TokenIssuer, verifier: TokenVerifier, revocations: Arc<RevocationStore>) -> Self {
        Self {
            issuer,
            verifier,
            revocations,
        }
    }

    /// Wires issuer and verifier onto one key store
    pub fn from_parts(
        keys: Arc<KeyStore>,
        config: TokenServiceConfig,
        revocations: Arc<RevocationStore>,
    ) -> Self {
        let verifier = TokenVerifier::new(keys.clone(), &config);
        let issuer = TokenIssuer::new(keys, config);
        Self::new(issuer, verifier, revocations)
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }

    pub fn revocations(&self) -> &Arc<RevocationStore> {
        &self.revocations
    }

    /// Issues a new pair after a successful login
    pub fn issue_pair(&self, subject_id: &str, claims: &ClaimSet) -> DomainResult<TokenPair> {
        let pair = self.issuer.issue_pair(subject_id, claims)?;
        info!(subject_id, pair_id = %pair.pair_id, "Issued credentials");
        Ok(pair)
    }

    /// Resolves the identity behind an access token
    ///
    /// Signature and structure are checked first, then revocation.
    pub async fn authenticate(&self, token: &str) -> DomainResult<Identity> {
        let claims = self.verifier.verify_typed(token, TokenType::Access)?;

        if self.revocations.is_claims_revoked(&claims, false).await? {
            debug!(token_id = %claims.jti, "Rejected revoked access token");
            return Err(TokenError::Revoked.into());
        }

        Ok(Identity::from(&claims))
    }

    /// Exchanges a refresh token for a new pair
    ///
    /// The presented token is revoked as `token_rotated` for its remaining
    /// lifetime. Role and permissions carry over unless `overrides` sets them.
    pub async fn refresh(
        &self,
        refresh_token: &str,
        overrides: Option<ClaimSet>,
    ) -> DomainResult<TokenPair> {
        let claims = self.verifier.verify_typed(refresh_token, TokenType::Refresh)?;

        if self.revocations.is_claims_revoked(&claims, false).await? {
            warn!(
                subject_id = %claims.sub,
                token_id = %claims.jti,
                "Revoked refresh token presented"
            );
            return Err(TokenError::Revoked.into());
        }

        let remaining = Duration::from_secs(claims.remaining_seconds());
        self.revocations
            .revoke_claims(&claims, RevocationReason::TokenRotated, Some(remaining))
            .await?;

        let carried = merge_claims(claims.claim_set(), overrides);
        let pair = self.issuer.issue_pair(&claims.sub, &carried)?;

        info!(
            subject_id = %claims.sub,
            previous_pair_id = claims.pair_id.as_deref().unwrap_or("none"),
            pair_id = %pair.pair_id,
            "Refresh token rotated"
        );
        Ok(pair)
    }

    /// Revokes either side of a pair independently
    pub async fn revoke_pair(
        &self,
        access_token: Option<&str>,
        refresh_token: Option<&str>,
        reason: RevocationReason,
    ) -> PairRevocation {
        PairRevocation {
            access_revoked: self.revoke_one(access_token, reason, "access").await,
            refresh_revoked: self.revoke_one(refresh_token, reason, "refresh").await,
        }
    }

    async fn revoke_one(&self, token: Option<&str>, reason: RevocationReason, side: &str) -> bool {
        let Some(token) = token else {
            return false;
        };

        match self.revocations.revoke(token, reason, None).await {
            Ok(revoked) => revoked,
            Err(e) => {
                warn!(side, error = %e, "Failed to revoke token");
                false
            }
        }
    }

    /// Best-effort revocation of many tokens
    pub async fn revoke_tokens(&self, tokens: &[String], reason: RevocationReason) -> BatchRevocationReport {
        self.revocations.revoke_many(tokens, reason).await
    }

    pub fn key_status(&self) -> KeyStoreStatus {
        self.issuer.key_store().status()
    }

    pub async fn revocation_stats(&self) -> RevocationStats {
        self.revocations.stats().await
    }
}

/// Overrides replace the carried role when set and the carried permissions
/// when non-empty
fn merge_claims(carried: ClaimSet, overrides: Option<ClaimSet>) -> ClaimSet {
    let Some(overrides) = overrides else {
        return carried;
    };

    ClaimSet {
        role: overrides.role.or(carried.role),
        permissions: if overrides.permissions.is_empty() {
            carried.permissions
        } else {
            overrides.permissions
        },
    }
}
