//! Revocation backend trait

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::entities::RevocationRecord;
use crate::errors::DomainResult;

/// TTL-capable storage for revocation records
///
/// Implementations must forget a record once its TTL elapses. Two backends
/// ship: a process-local map and a shared network cache.
#[async_trait]
pub trait RevocationBackend: Send + Sync {
    /// Short backend name for diagnostics
    fn name(&self) -> &'static str;

    /// Store a record that expires after `ttl`
    async fn put(&self, record: &RevocationRecord, ttl: Duration) -> DomainResult<()>;

    /// Fetch the live record for `token_id`
    async fn get(&self, token_id: &str) -> DomainResult<Option<RevocationRecord>>;

    /// Number of live records
    async fn count(&self) -> DomainResult<usize>;

    /// Physically drop expired records, for backends that do not expire on their own
    async fn purge_expired(&self) -> DomainResult<usize> {
        Ok(0)
    }
}
