//! Configuration-driven revocation store construction

use std::sync::Arc;

use tracing::{info, warn};

use ck_core::{RevocationSettings, RevocationStore};
use ck_shared::config::{AuthConfig, CacheConfig};

use crate::cache::redis_client::RedisClient;

use super::redis_backend::RedisRevocationBackend;

/// Builds the revocation store for this process
///
/// With the shared cache disabled the store is process-local. When it is
/// enabled but unreachable the process still starts, degraded to the local
/// backend; the failure is logged rather than returned.
pub async fn build_revocation_store(auth: &AuthConfig, cache: &CacheConfig) -> RevocationStore {
    let settings = RevocationSettings::from_config(auth, cache);

    if !cache.enabled {
        info!("Revocation store using process-local backend");
        return RevocationStore::new(settings);
    }

    match RedisClient::new(cache.clone()).await {
        Ok(client) => {
            info!("Revocation store using Redis backend");
            let backend = RedisRevocationBackend::new(Arc::new(client));
            RevocationStore::with_backend(settings, Arc::new(backend))
        }
        Err(e) => {
            warn!(error = %e, "Redis unavailable at startup, revocations are local to this instance");
            RevocationStore::degraded(settings, &e.to_string())
        }
    }
}
