mod service_tests;

use std::sync::Arc;
use std::time::Duration;

use crate::services::credential::CredentialService;
use crate::services::revocation::{RevocationSettings, RevocationStore};
use crate::services::token::{KeyStore, KeyStoreConfig, TokenServiceConfig};

pub(super) fn service_with_grace(grace: Duration) -> CredentialService {
    let keys = Arc::new(KeyStore::in_memory(KeyStoreConfig::default(), "credential-secret"));
    let revocations = Arc::new(RevocationStore::new(RevocationSettings {
        rotation_grace: grace,
        ..RevocationSettings::default()
    }));
    CredentialService::from_parts(keys, TokenServiceConfig::default(), revocations)
}

pub(super) fn service() -> CredentialService {
    service_with_grace(Duration::from_secs(10))
}
