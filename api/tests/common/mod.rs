//! Shared fixtures for the HTTP integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use actix_web::web;
use chrono::Utc;

use ck_api::app::AppState;
use ck_core::{
    CredentialService, KeyStore, KeyStoreConfig, RevocationSettings, RevocationStore,
    TokenClaims, TokenServiceConfig, TokenType,
};

pub const SECRET: &str = "integration-test-secret";

pub fn credentials_with(settings: RevocationSettings) -> Arc<CredentialService> {
    let keys = Arc::new(KeyStore::in_memory(KeyStoreConfig::default(), SECRET));
    Arc::new(CredentialService::from_parts(
        keys,
        TokenServiceConfig::default(),
        Arc::new(RevocationStore::new(settings)),
    ))
}

pub fn credentials() -> Arc<CredentialService> {
    credentials_with(RevocationSettings::default())
}

/// Rotated refresh tokens are rejected immediately
pub fn strict_credentials() -> Arc<CredentialService> {
    credentials_with(RevocationSettings {
        rotation_grace: Duration::ZERO,
        ..RevocationSettings::default()
    })
}

pub fn state(credentials: Arc<CredentialService>) -> web::Data<AppState> {
    web::Data::new(AppState::new(credentials))
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

/// Access token that expired an hour ago, signed with the current key
pub fn expired_access_token(credentials: &CredentialService) -> String {
    let config = TokenServiceConfig::default();
    let now = Utc::now().timestamp();
    credentials
        .issuer()
        .sign(TokenClaims {
            sub: "u1".to_string(),
            token_type: TokenType::Access,
            jti: "expired".to_string(),
            kid: String::new(),
            role: None,
            permissions: Vec::new(),
            pair_id: None,
            iat: now - 7200,
            nbf: now - 7200,
            exp: now - 3600,
            iss: config.issuer,
            aud: config.audience,
        })
        .unwrap()
}
