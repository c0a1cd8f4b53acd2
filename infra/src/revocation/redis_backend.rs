//! Redis-based revocation backend
//!
//! Each record is a JSON string under `revoked:{token_id}` with a Redis TTL,
//! so expiry is handled by the server. A sorted set scored by expiry
//! timestamp keeps `count` cheap without a key scan.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use ck_core::{DomainResult, RevocationBackend, RevocationRecord};

use crate::cache::redis_client::RedisClient;
use crate::InfrastructureError;

const RECORD_KEY: &str = "revoked";
const INDEX_KEY: &str = "revoked:index";

/// Revocation records shared by every instance pointed at the same Redis
pub struct RedisRevocationBackend {
    redis_client: Arc<RedisClient>,
}

impl RedisRevocationBackend {
    pub fn new(redis_client: Arc<RedisClient>) -> Self {
        Self { redis_client }
    }

    fn record_key(&self, token_id: &str) -> String {
        self.redis_client
            .make_key(&format!("{}:{}", RECORD_KEY, token_id))
    }

    fn index_key(&self) -> String {
        self.redis_client.make_key(INDEX_KEY)
    }
}

#[async_trait]
impl RevocationBackend for RedisRevocationBackend {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn put(&self, record: &RevocationRecord, ttl: Duration) -> DomainResult<()> {
        let ttl_seconds = ttl.as_secs().max(1);
        let payload = serde_json::to_string(record).map_err(InfrastructureError::from)?;
        let now = Utc::now().timestamp();

        self.redis_client
            .set_indexed(
                &self.record_key(&record.token_id),
                &payload,
                ttl_seconds,
                &self.index_key(),
                &record.token_id,
                now + ttl_seconds as i64,
                now,
            )
            .await?;

        debug!(
            token_id = %record.token_id,
            reason = %record.reason,
            ttl_seconds,
            "Stored revocation record in Redis"
        );
        Ok(())
    }

    async fn get(&self, token_id: &str) -> DomainResult<Option<RevocationRecord>> {
        let Some(raw) = self.redis_client.get(&self.record_key(token_id)).await? else {
            return Ok(None);
        };

        let record = serde_json::from_str(&raw).map_err(InfrastructureError::from)?;
        Ok(Some(record))
    }

    async fn count(&self) -> DomainResult<usize> {
        let count = self
            .redis_client
            .count_indexed(&self.index_key(), Utc::now().timestamp())
            .await?;
        Ok(count)
    }
}
