//! Redis cache client implementation
//!
//! Async Redis client with connection retry, per-command retry and the
//! commands the revocation backend relies on: set with expiry, get, and a
//! score-indexed sorted set for counting live entries.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use redis::{aio::MultiplexedConnection, AsyncCommands, Client, RedisError, RedisResult};
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use crate::cache::CacheConfig;
use crate::InfrastructureError;

type RedisFuture<T> = Pin<Box<dyn Future<Output = RedisResult<T>> + Send>>;

/// Cap on the exponential back-off between attempts
const MAX_RETRY_DELAY_MS: u64 = 5000;

/// Redis cache client with connection retry logic
///
/// Cloning is cheap: clones share the multiplexed connection.
#[derive(Clone)]
pub struct RedisClient {
    /// Redis multiplexed connection for async operations
    connection: MultiplexedConnection,
    /// Configuration used to create this client
    config: CacheConfig,
}

impl RedisClient {
    /// Connect using the retry parameters in `config`
    ///
    /// # Returns
    /// * `Ok(RedisClient)` - Connected client
    /// * `Err(InfrastructureError::Config)` - The URL could not be parsed
    /// * `Err(InfrastructureError::Cache)` / `Timeout` - Every attempt failed
    pub async fn new(config: CacheConfig) -> Result<Self, InfrastructureError> {
        info!(url = %mask_url(&config.url), "Creating Redis client");

        let client = Client::open(config.url.as_str()).map_err(|e| {
            error!(error = %e, "Failed to parse Redis URL");
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;

        let connection = Self::create_connection_with_retry(&client, &config).await?;

        info!("Redis client created successfully");
        Ok(Self { connection, config })
    }

    async fn create_connection_with_retry(
        client: &Client,
        config: &CacheConfig,
    ) -> Result<MultiplexedConnection, InfrastructureError> {
        let max_attempts = config.max_retries.max(1);
        let connect_timeout = Duration::from_secs(config.connection_timeout.max(1));
        let mut attempts = 0;
        let mut delay = config.retry_delay_ms;

        loop {
            attempts += 1;
            debug!(attempt = attempts, "Attempting to connect to Redis");

            let outcome = match timeout(connect_timeout, client.get_multiplexed_async_connection()).await {
                Ok(Ok(connection)) => return Ok(connection),
                Ok(Err(e)) => InfrastructureError::Cache(e),
                Err(_) => InfrastructureError::Timeout(format!(
                    "Redis connection not established within {}s",
                    connect_timeout.as_secs()
                )),
            };

            if attempts >= max_attempts {
                error!(attempts, error = %outcome, "Failed to connect to Redis");
                return Err(outcome);
            }

            warn!(
                attempt = attempts,
                max_attempts,
                retry_in_ms = delay,
                error = %outcome,
                "Failed to connect to Redis, retrying"
            );
            sleep(Duration::from_millis(delay)).await;
            delay = (delay * 2).min(MAX_RETRY_DELAY_MS);
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Apply the configured key prefix
    pub fn make_key(&self, key: &str) -> String {
        self.config.make_key(key)
    }

    /// Set a value with expiration time
    pub async fn set_with_expiry(
        &self,
        key: &str,
        value: &str,
        expiry_seconds: u64,
    ) -> Result<(), InfrastructureError> {
        debug!(key, expiry_seconds, "Setting key");

        let key_owned = key.to_string();
        let value = value.to_string();
        self.execute_with_retry(move |mut conn| {
            let key = key_owned.clone();
            let value = value.clone();
            Box::pin(async move { conn.set_ex::<_, _, ()>(key, value, expiry_seconds).await })
        })
        .await
        .map_err(|e| {
            error!(key, error = %e, "Failed to set key");
            InfrastructureError::Cache(e)
        })
    }

    /// Get a value; `None` when missing or expired
    pub async fn get(&self, key: &str) -> Result<Option<String>, InfrastructureError> {
        let key_owned = key.to_string();
        let value = self
            .execute_with_retry(move |mut conn| {
                let key = key_owned.clone();
                Box::pin(async move { conn.get::<_, Option<String>>(key).await })
            })
            .await
            .map_err(|e| {
                error!(key, error = %e, "Failed to get key");
                InfrastructureError::Cache(e)
            })?;

        debug!(key, found = value.is_some(), "Got key");
        Ok(value)
    }

    /// Delete a key; `true` if it existed
    pub async fn delete(&self, key: &str) -> Result<bool, InfrastructureError> {
        let key_owned = key.to_string();
        let deleted = self
            .execute_with_retry(move |mut conn| {
                let key = key_owned.clone();
                Box::pin(async move { conn.del::<_, u32>(key).await })
            })
            .await
            .map_err(InfrastructureError::Cache)?;

        Ok(deleted > 0)
    }

    /// Set a value with expiry and record `member` in a sorted-set index
    ///
    /// Runs as one atomic pipeline: `SET EX`, `ZADD index score member`, and a
    /// `ZREMRANGEBYSCORE` dropping index members scored below `prune_below`.
    pub async fn set_indexed(
        &self,
        key: &str,
        value: &str,
        expiry_seconds: u64,
        index_key: &str,
        member: &str,
        score: i64,
        prune_below: i64,
    ) -> Result<(), InfrastructureError> {
        let (key, value, index_key, member) = (
            key.to_string(),
            value.to_string(),
            index_key.to_string(),
            member.to_string(),
        );

        self.execute_with_retry(move |mut conn| {
            let mut pipe = redis::pipe();
            pipe.atomic()
                .set_ex(&key, &value, expiry_seconds)
                .ignore()
                .zadd(&index_key, &member, score)
                .ignore()
                .cmd("ZREMRANGEBYSCORE")
                .arg(&index_key)
                .arg("-inf")
                .arg(format!("({}", prune_below))
                .ignore();
            Box::pin(async move { pipe.query_async::<_, ()>(&mut conn).await })
        })
        .await
        .map_err(InfrastructureError::Cache)
    }

    /// Count index members scored at or above `min_score`, pruning the rest
    pub async fn count_indexed(&self, index_key: &str, min_score: i64) -> Result<usize, InfrastructureError> {
        let index_key = index_key.to_string();

        self.execute_with_retry(move |mut conn| {
            let index_key = index_key.clone();
            Box::pin(async move {
                redis::cmd("ZREMRANGEBYSCORE")
                    .arg(&index_key)
                    .arg("-inf")
                    .arg(format!("({}", min_score))
                    .query_async::<_, i64>(&mut conn)
                    .await?;
                conn.zcard::<_, usize>(&index_key).await
            })
        })
        .await
        .map_err(InfrastructureError::Cache)
    }

    /// Check if the Redis connection is healthy via `PING`
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        let response = self
            .execute_with_retry(|mut conn| {
                Box::pin(async move { redis::cmd("PING").query_async::<_, String>(&mut conn).await })
            })
            .await
            .map_err(|e| {
                error!(error = %e, "Redis health check failed");
                InfrastructureError::Cache(e)
            })?;

        if response != "PONG" {
            warn!(response = %response, "Redis health check returned unexpected response");
            return Ok(false);
        }
        Ok(true)
    }

    /// Execute a Redis operation with automatic retry logic
    ///
    /// Only transient errors are retried, with exponential back-off.
    async fn execute_with_retry<F, T>(&self, operation: F) -> RedisResult<T>
    where
        F: Fn(MultiplexedConnection) -> RedisFuture<T>,
    {
        let max_attempts = self.config.max_retries.max(1);
        let mut attempts = 0;
        let mut delay = self.config.retry_delay_ms;

        loop {
            attempts += 1;

            match operation(self.connection.clone()).await {
                Ok(result) => return Ok(result),
                Err(e) if attempts < max_attempts && is_retriable_error(&e) => {
                    warn!(
                        attempt = attempts,
                        max_attempts,
                        retry_in_ms = delay,
                        error = %e,
                        "Redis operation failed, retrying"
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(MAX_RETRY_DELAY_MS);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Whether a Redis error is transient
pub(crate) fn is_retriable_error(error: &RedisError) -> bool {
    matches!(
        error.kind(),
        redis::ErrorKind::IoError
            | redis::ErrorKind::ClientError
            | redis::ErrorKind::BusyLoadingError
            | redis::ErrorKind::TryAgain
    )
}

/// Mask credentials in a Redis URL for logging
pub(crate) fn mask_url(url: &str) -> String {
    if let (Some(at_pos), Some(proto_end)) = (url.find('@'), url.find("://")) {
        return format!("{}****{}", &url[..proto_end + 3], &url[at_pos..]);
    }
    url.to_string()
}
