//! Process-local revocation backend

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::domain::entities::RevocationRecord;
use crate::errors::DomainResult;

use super::backend::RevocationBackend;

#[derive(Debug, Clone)]
struct Entry {
    record: RevocationRecord,
    expires_at: Instant,
}

/// Map-with-TTL backend for single-instance deployments
///
/// Expired entries are invisible to reads immediately and physically removed
/// by [`purge_expired`](RevocationBackend::purge_expired).
#[derive(Debug, Default)]
pub struct InMemoryRevocationBackend {
    entries: RwLock<HashMap<String, Entry>>,
}

impl InMemoryRevocationBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries held, including expired ones not yet purged
    pub async fn stored_len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl RevocationBackend for InMemoryRevocationBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn put(&self, record: &RevocationRecord, ttl: Duration) -> DomainResult<()> {
        let entry = Entry {
            record: record.clone(),
            expires_at: Instant::now() + ttl,
        };
        self.entries
            .write()
            .await
            .insert(record.token_id.clone(), entry);
        Ok(())
    }

    async fn get(&self, token_id: &str) -> DomainResult<Option<RevocationRecord>> {
        let entries = self.entries.read().await;
        let now = Instant::now();
        Ok(entries
            .get(token_id)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.record.clone()))
    }

    async fn count(&self) -> DomainResult<usize> {
        let entries = self.entries.read().await;
        let now = Instant::now();
        Ok(entries.values().filter(|entry| entry.expires_at > now).count())
    }

    async fn purge_expired(&self) -> DomainResult<usize> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        let now = Instant::now();
        entries.retain(|_, entry| entry.expires_at > now);
        Ok(before - entries.len())
    }
}
