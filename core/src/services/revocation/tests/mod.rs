mod backend_tests;
mod store_tests;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::entities::{ClaimSet, RevocationRecord};
use crate::errors::{DomainError, DomainResult};
use crate::services::token::{KeyStore, KeyStoreConfig, TokenIssuer, TokenServiceConfig};

use super::{InMemoryRevocationBackend, RevocationBackend};

pub(super) fn issuer() -> TokenIssuer {
    let keys = Arc::new(KeyStore::in_memory(KeyStoreConfig::default(), "revocation-test-secret"));
    TokenIssuer::new(keys, TokenServiceConfig::default())
}

pub(super) fn access_token(issuer: &TokenIssuer) -> String {
    issuer
        .issue_access_token("u1", &ClaimSet::default())
        .unwrap()
}

pub(super) fn refresh_token(issuer: &TokenIssuer) -> String {
    issuer
        .issue_refresh_token("u1", &ClaimSet::default(), "pair-1")
        .unwrap()
}

/// Shared backend double that can be switched into failure or stall mode
#[derive(Default)]
pub(super) struct FlakyBackend {
    inner: InMemoryRevocationBackend,
    failing: AtomicBool,
    stalled: AtomicBool,
    calls: AtomicUsize,
}

impl FlakyBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_stalled(&self, stalled: bool) {
        self.stalled.store(stalled, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn enter(&self) -> DomainResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.stalled.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::Internal {
                message: "connection refused".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RevocationBackend for FlakyBackend {
    fn name(&self) -> &'static str {
        "flaky"
    }

    async fn put(&self, record: &RevocationRecord, ttl: Duration) -> DomainResult<()> {
        self.enter().await?;
        self.inner.put(record, ttl).await
    }

    async fn get(&self, token_id: &str) -> DomainResult<Option<RevocationRecord>> {
        self.enter().await?;
        self.inner.get(token_id).await
    }

    async fn count(&self) -> DomainResult<usize> {
        self.enter().await?;
        self.inner.count().await
    }
}
