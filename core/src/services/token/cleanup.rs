//! Key cleanup service for periodic maintenance of signing keys and
//! local revocation records

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::errors::DomainError;
use crate::services::revocation::RevocationStore;

use super::key_store::KeyStore;

/// Configuration for the key cleanup service
#[derive(Debug, Clone)]
pub struct KeyCleanupConfig {
    /// How often to run cleanup
    pub interval: Duration,
    /// Whether to enable automatic cleanup
    pub enabled: bool,
}

impl Default for KeyCleanupConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3600),
            enabled: true,
        }
    }
}

/// Service for purging retired keys and expired revocation records
pub struct KeyCleanupService {
    keys: Arc<KeyStore>,
    revocations: Option<Arc<RevocationStore>>,
    config: KeyCleanupConfig,
}

impl KeyCleanupService {
    pub fn new(keys: Arc<KeyStore>, config: KeyCleanupConfig) -> Self {
        Self {
            keys,
            revocations: None,
            config,
        }
    }

    /// Also sweep the revocation store's local backend
    pub fn with_revocations(mut self, revocations: Arc<RevocationStore>) -> Self {
        self.revocations = Some(revocations);
        self
    }

    /// Run a single cleanup cycle
    ///
    /// 1. Write a pending key set to storage
    /// 2. Purge keys whose grace period has elapsed
    /// 3. Drop expired local revocation records
    pub async fn run_cleanup(&self) -> Result<CleanupResult, DomainError> {
        if !self.config.enabled {
            return Ok(CleanupResult::default());
        }

        let keys = Arc::clone(&self.keys);
        let mut result = tokio::task::spawn_blocking(move || Self::maintain_keys(&keys))
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Key maintenance task failed: {}", e),
            })?;

        if let Some(revocations) = &self.revocations {
            match revocations.sweep_local().await {
                Ok(count) => result.revocations_expired = count,
                Err(e) => {
                    error!(error = %e, "Failed to sweep revocation records");
                    result.errors.push(format!("Revocation sweep error: {}", e));
                }
            }
        }

        if result.total_cleaned() > 0 || result.persisted {
            info!(
                keys_purged = result.keys_purged,
                revocations_expired = result.revocations_expired,
                persisted = result.persisted,
                "Key cleanup completed"
            );
        }

        Ok(result)
    }

    /// Storage writes and purge; runs on the blocking pool
    fn maintain_keys(keys: &KeyStore) -> CleanupResult {
        let mut result = CleanupResult::default();

        match keys.flush() {
            Ok(flushed) => result.persisted = flushed,
            Err(e) => {
                warn!(error = %e, "Signing key persistence still failing");
                result.errors.push(format!("Key persistence error: {}", e));
            }
        }

        match keys.purge_expired() {
            Ok(count) => result.keys_purged = count,
            Err(e) => {
                error!(error = %e, "Failed to purge signing keys");
                result.errors.push(format!("Key purge error: {}", e));
            }
        }

        result
    }

    /// Start the cleanup service as a background task
    ///
    /// Returns `None` when cleanup is disabled.
    pub fn start_background_task(self: Arc<Self>) -> Option<JoinHandle<()>> {
        if !self.config.enabled {
            warn!("Key cleanup service is disabled");
            return None;
        }

        let interval = self.config.interval.max(Duration::from_secs(1));

        Some(tokio::spawn(async move {
            info!(
                interval_secs = interval.as_secs(),
                "Key cleanup service started"
            );

            let mut interval_timer = tokio::time::interval(interval);
            // The first tick completes immediately
            interval_timer.tick().await;

            loop {
                interval_timer.tick().await;

                match self.run_cleanup().await {
                    Ok(result) => {
                        if !result.is_success() {
                            warn!(errors = ?result.errors, "Cleanup completed with errors");
                        }
                    }
                    Err(e) => {
                        error!(error = %e, "Key cleanup cycle failed");
                    }
                }
            }
        }))
    }
}

/// Result of a cleanup operation
#[derive(Debug, Default)]
pub struct CleanupResult {
    /// Number of retired signing keys removed
    pub keys_purged: usize,
    /// Number of expired local revocation records removed
    pub revocations_expired: usize,
    /// Whether a pending key write reached storage
    pub persisted: bool,
    /// Any errors encountered during cleanup
    pub errors: Vec<String>,
}

impl CleanupResult {
    /// Check if the cleanup was successful (no errors)
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get total number of items cleaned up
    pub fn total_cleaned(&self) -> usize {
        self.keys_purged + self.revocations_expired
    }
}
