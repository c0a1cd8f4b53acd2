//! Revocation store
//!
//! Records and answers "has this token been revoked" independently of
//! signature validity. An optional shared backend makes revocations visible
//! across instances; the local backend is always written as well and takes
//! over whenever the shared one is unreachable.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use ck_shared::config::{AuthConfig, CacheConfig};

use crate::domain::entities::{RevocationReason, RevocationRecord, TokenClaims, TokenType};
use crate::errors::{DomainError, DomainResult};
use crate::services::token::TokenVerifier;

use super::backend::RevocationBackend;
use super::memory::InMemoryRevocationBackend;

/// Behavior switches and timings for the revocation store
#[derive(Debug, Clone)]
pub struct RevocationSettings {
    /// Whether `revoke` records anything
    pub enabled: bool,
    /// Whether `is_revoked` consults the backends
    pub check_enabled: bool,
    /// Window during which a rotated token is still tolerated
    pub rotation_grace: Duration,
    /// Default record TTL for access tokens
    pub access_ttl: Duration,
    /// Default record TTL for refresh tokens
    pub refresh_ttl: Duration,
    /// Upper bound on a single shared-backend call
    pub external_timeout: Duration,
    /// How long to skip the shared backend after a failure
    pub retry_after: Duration,
}

impl Default for RevocationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            check_enabled: true,
            rotation_grace: Duration::from_secs(10),
            access_ttl: Duration::from_secs(60 * 60),
            refresh_ttl: Duration::from_secs(7 * 24 * 60 * 60),
            external_timeout: Duration::from_millis(250),
            retry_after: Duration::from_secs(30),
        }
    }
}

impl RevocationSettings {
    pub fn from_config(auth: &AuthConfig, cache: &CacheConfig) -> Self {
        let lifetimes = auth.lifetimes();
        Self {
            enabled: auth.revocation_enabled,
            check_enabled: auth.revocation_check_enabled,
            rotation_grace: lifetimes.rotation_grace,
            access_ttl: lifetimes.access,
            refresh_ttl: lifetimes.refresh,
            external_timeout: Duration::from_millis(cache.response_timeout_ms),
            ..Self::default()
        }
    }

    fn default_ttl(&self, token_type: TokenType) -> Duration {
        match token_type {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
        }
    }
}

/// Diagnostic snapshot of the revocation store
#[derive(Debug, Clone, Serialize)]
pub struct RevocationStats {
    pub revoked_count: usize,
    pub backend: String,
    pub degraded: bool,
}

/// Per-token result of a batch revocation
#[derive(Debug, Clone, Serialize)]
pub struct RevocationOutcome {
    /// Position of the token in the request
    pub index: usize,
    /// Token id, when the token could be decoded
    pub token_id: Option<String>,
    pub revoked: bool,
    pub error: Option<String>,
}

/// Best-effort batch revocation report
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchRevocationReport {
    pub outcomes: Vec<RevocationOutcome>,
}

impl BatchRevocationReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.revoked).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

/// Token revocation with a local backend and an optional shared one
pub struct RevocationStore {
    external: Option<Arc<dyn RevocationBackend>>,
    local: Arc<InMemoryRevocationBackend>,
    settings: RevocationSettings,
    degraded: AtomicBool,
    last_failure: Mutex<Option<Instant>>,
}

impl RevocationStore {
    /// Store backed by process memory only
    pub fn new(settings: RevocationSettings) -> Self {
        Self {
            external: None,
            local: Arc::new(InMemoryRevocationBackend::new()),
            settings,
            degraded: AtomicBool::new(false),
            last_failure: Mutex::new(None),
        }
    }

    /// Store backed by a shared backend, with local fallback
    pub fn with_backend(settings: RevocationSettings, backend: Arc<dyn RevocationBackend>) -> Self {
        Self {
            external: Some(backend),
            ..Self::new(settings)
        }
    }

    /// Local-only store for a shared backend that was unreachable at startup
    pub fn degraded(settings: RevocationSettings, reason: &str) -> Self {
        let store = Self::new(settings);
        store.mark_degraded(reason);
        store
    }

    pub fn settings(&self) -> &RevocationSettings {
        &self.settings
    }

    /// Revokes a raw token
    ///
    /// Without `ttl`, the record lives as long as the token's remaining
    /// lifetime, capped by the per-type default. Returns `false` when
    /// revocation is disabled.
    pub async fn revoke(
        &self,
        token: &str,
        reason: RevocationReason,
        ttl: Option<Duration>,
    ) -> DomainResult<bool> {
        if !self.settings.enabled {
            debug!("Revocation disabled, ignoring revoke request");
            return Ok(false);
        }

        let claims = TokenVerifier::peek_claims(token)?;
        self.revoke_claims(&claims, reason, ttl).await
    }

    /// Revokes a token whose claims are already decoded
    pub async fn revoke_claims(
        &self,
        claims: &TokenClaims,
        reason: RevocationReason,
        ttl: Option<Duration>,
    ) -> DomainResult<bool> {
        if !self.settings.enabled {
            return Ok(false);
        }

        let remaining = Duration::from_secs(claims.remaining_seconds());
        if remaining.is_zero() {
            debug!(token_id = %claims.jti, "Token already expired, nothing to record");
            return Ok(true);
        }

        // A repeated rotation keeps the first record so the grace window stays
        // anchored at the first use.
        if reason.has_grace_window() {
            if let Some(existing) = self.lookup(&claims.jti).await? {
                if existing.reason == reason {
                    debug!(token_id = %claims.jti, "Token already rotated, keeping original record");
                    return Ok(true);
                }
            }
        }

        let ttl = ttl
            .unwrap_or_else(|| self.settings.default_ttl(claims.token_type).min(remaining))
            .max(Duration::from_secs(1));
        let record = RevocationRecord::new(claims.jti.clone(), reason, claims.token_type);

        self.local.put(&record, ttl).await?;

        if let Some(external) = self.available_external() {
            match self.guarded(external.put(&record, ttl)).await {
                Ok(()) => self.mark_recovered(),
                Err(e) => self.mark_degraded(&e.to_string()),
            }
        }

        debug!(
            token_id = %record.token_id,
            reason = %reason,
            ttl_secs = ttl.as_secs(),
            "Token revoked"
        );
        Ok(true)
    }

    /// Whether the token must be treated as revoked
    ///
    /// A `token_rotated` record inside the rotation grace window is ignored
    /// unless `ignore_grace_period` is set; every other record is authoritative.
    pub async fn is_revoked(&self, token: &str, ignore_grace_period: bool) -> DomainResult<bool> {
        if !self.settings.check_enabled {
            return Ok(false);
        }

        let claims = TokenVerifier::peek_claims(token)?;
        self.is_claims_revoked(&claims, ignore_grace_period).await
    }

    pub async fn is_claims_revoked(
        &self,
        claims: &TokenClaims,
        ignore_grace_period: bool,
    ) -> DomainResult<bool> {
        if !self.settings.check_enabled {
            return Ok(false);
        }

        let Some(record) = self.lookup(&claims.jti).await? else {
            return Ok(false);
        };

        if !ignore_grace_period && record.within_grace_at(Utc::now(), self.grace()) {
            debug!(token_id = %record.token_id, "Rotated token inside grace window");
            return Ok(false);
        }

        Ok(true)
    }

    /// Revokes each token independently; one failure never aborts the rest
    pub async fn revoke_many(&self, tokens: &[String], reason: RevocationReason) -> BatchRevocationReport {
        let mut report = BatchRevocationReport::default();

        for (index, token) in tokens.iter().enumerate() {
            let token_id = TokenVerifier::peek_claims(token).ok().map(|c| c.jti);
            let outcome = match self.revoke(token, reason, None).await {
                Ok(revoked) => RevocationOutcome {
                    index,
                    token_id,
                    revoked,
                    error: None,
                },
                Err(e) => RevocationOutcome {
                    index,
                    token_id,
                    revoked: false,
                    error: Some(e.to_string()),
                },
            };
            report.outcomes.push(outcome);
        }

        info!(
            reason = %reason,
            succeeded = report.succeeded(),
            failed = report.failed(),
            "Batch revocation completed"
        );
        report
    }

    /// Diagnostic counts from the backend currently answering reads
    pub async fn stats(&self) -> RevocationStats {
        let degraded = self.is_degraded();

        if let Some(external) = self.external.as_ref().filter(|_| !degraded) {
            if let Ok(count) = self.guarded(external.count()).await {
                return RevocationStats {
                    revoked_count: count,
                    backend: external.name().to_string(),
                    degraded: false,
                };
            }
        }

        RevocationStats {
            revoked_count: self.local.count().await.unwrap_or(0),
            backend: self.local.name().to_string(),
            degraded,
        }
    }

    /// Drops expired records from the local backend
    pub async fn sweep_local(&self) -> DomainResult<usize> {
        self.local.purge_expired().await
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::SeqCst)
    }

    async fn lookup(&self, token_id: &str) -> DomainResult<Option<RevocationRecord>> {
        if let Some(external) = self.available_external() {
            match self.guarded(external.get(token_id)).await {
                Ok(Some(record)) => {
                    self.mark_recovered();
                    return Ok(Some(record));
                }
                Ok(None) => self.mark_recovered(),
                Err(e) => self.mark_degraded(&e.to_string()),
            }
        }

        self.local.get(token_id).await
    }

    /// The shared backend, unless it failed within the back-off window
    fn available_external(&self) -> Option<&Arc<dyn RevocationBackend>> {
        let external = self.external.as_ref()?;
        if !self.is_degraded() {
            return Some(external);
        }

        let last_failure = self.last_failure.lock().ok().and_then(|guard| *guard);
        match last_failure {
            Some(at) if at.elapsed() < self.settings.retry_after => None,
            _ => Some(external),
        }
    }

    async fn guarded<T>(&self, call: impl Future<Output = DomainResult<T>>) -> DomainResult<T> {
        match tokio::time::timeout(self.settings.external_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(DomainError::Internal {
                message: format!(
                    "revocation backend timed out after {}ms",
                    self.settings.external_timeout.as_millis()
                ),
            }),
        }
    }

    fn mark_degraded(&self, reason: &str) {
        if let Ok(mut guard) = self.last_failure.lock() {
            *guard = Some(Instant::now());
        }
        if !self.degraded.swap(true, Ordering::SeqCst) {
            warn!(
                error = reason,
                "Shared revocation backend unavailable, using local fallback"
            );
        }
    }

    fn mark_recovered(&self) {
        if self.degraded.swap(false, Ordering::SeqCst) {
            info!("Shared revocation backend recovered");
        }
    }

    fn grace(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.settings.rotation_grace).unwrap_or_else(|_| chrono::Duration::zero())
    }
}
