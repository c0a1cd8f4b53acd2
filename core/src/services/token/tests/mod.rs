
use std::sync::Arc;

use chrono::Duration;

use crate::services::token::{KeyStore, KeyStoreConfig, TokenIssuer, TokenServiceConfig, TokenVerifier};

pub(super) fn store_config() -> KeyStoreConfig {
    KeyStoreConfig {
        rotation_interval: Duration::days(30),
        grace_period: Duration::hours(1),
    }
}

/// Key store, issuer and verifier sharing one in-memory key set
pub(super) fn token_services(secret: &str) -> (Arc<KeyStore>, TokenIssuer, TokenVerifier) {
    let keys = Arc::new(KeyStore::in_memory(store_config(), secret));
    let config = TokenServiceConfig::default();
    let issuer = TokenIssuer::new(keys.clone(), config.clone());
    let verifier = TokenVerifier::new(keys.clone(), &config);
    (keys, issuer, verifier)
}
