use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::domain::entities::{RevocationReason, TokenClaims, TokenType};
use crate::errors::{DomainError, TokenError};
use crate::services::revocation::{RevocationSettings, RevocationStore};
use crate::services::token::TokenVerifier;

use super::{access_token, issuer, refresh_token, FlakyBackend};

fn settings() -> RevocationSettings {
    RevocationSettings {
        rotation_grace: Duration::from_secs(10),
        ..RevocationSettings::default()
    }
}

#[tokio::test]
async fn test_manual_revoke_is_authoritative() {
    let issuer = issuer();
    let store = RevocationStore::new(settings());
    let token = access_token(&issuer);

    assert!(!store.is_revoked(&token, false).await.unwrap());
    assert!(store
        .revoke(&token, RevocationReason::ManualRevoke, None)
        .await
        .unwrap());
    assert!(store.is_revoked(&token, false).await.unwrap());
    assert!(store.is_revoked(&token, true).await.unwrap());
}

#[tokio::test]
async fn test_rotated_token_tolerated_inside_grace_window() {
    let issuer = issuer();
    let store = RevocationStore::new(settings());
    let token = refresh_token(&issuer);

    store
        .revoke(&token, RevocationReason::TokenRotated, None)
        .await
        .unwrap();

    assert!(!store.is_revoked(&token, false).await.unwrap());
    assert!(store.is_revoked(&token, true).await.unwrap());
}

#[tokio::test]
async fn test_rotated_token_revoked_after_grace_window() {
    let issuer = issuer();
    let store = RevocationStore::new(RevocationSettings {
        rotation_grace: Duration::ZERO,
        ..RevocationSettings::default()
    });
    let token = refresh_token(&issuer);

    store
        .revoke(&token, RevocationReason::TokenRotated, None)
        .await
        .unwrap();

    assert!(store.is_revoked(&token, false).await.unwrap());
}

#[tokio::test]
async fn test_logout_after_rotation_is_authoritative() {
    let issuer = issuer();
    let store = RevocationStore::new(settings());
    let token = refresh_token(&issuer);

    store
        .revoke(&token, RevocationReason::TokenRotated, None)
        .await
        .unwrap();
    store
        .revoke(&token, RevocationReason::TokenRotated, None)
        .await
        .unwrap();
    assert!(!store.is_revoked(&token, false).await.unwrap());

    store.revoke(&token, RevocationReason::Logout, None).await.unwrap();

    assert!(store.is_revoked(&token, false).await.unwrap());
}

#[tokio::test]
async fn test_logout_has_no_grace_window() {
    let issuer = issuer();
    let store = RevocationStore::new(settings());
    let token = refresh_token(&issuer);

    store.revoke(&token, RevocationReason::Logout, None).await.unwrap();

    assert!(store.is_revoked(&token, false).await.unwrap());
}

#[tokio::test]
async fn test_revocation_disabled() {
    let issuer = issuer();
    let store = RevocationStore::new(RevocationSettings {
        enabled: false,
        ..settings()
    });
    let token = access_token(&issuer);

    assert!(!store
        .revoke(&token, RevocationReason::ManualRevoke, None)
        .await
        .unwrap());
    assert!(!store.is_revoked(&token, true).await.unwrap());
}

#[tokio::test]
async fn test_revocation_check_disabled() {
    let issuer = issuer();
    let store = RevocationStore::new(RevocationSettings {
        check_enabled: false,
        ..settings()
    });
    let token = access_token(&issuer);

    store
        .revoke(&token, RevocationReason::ManualRevoke, None)
        .await
        .unwrap();

    assert!(!store.is_revoked(&token, true).await.unwrap());
    assert_eq!(store.stats().await.revoked_count, 1);
}

#[tokio::test]
async fn test_malformed_token_cannot_be_revoked() {
    let store = RevocationStore::new(settings());

    let result = store
        .revoke("not-a-token", RevocationReason::ManualRevoke, None)
        .await;

    assert!(matches!(result, Err(DomainError::Token(TokenError::Malformed))));
}

#[tokio::test]
async fn test_expired_token_revocation_stores_nothing() {
    let issuer = issuer();
    let store = RevocationStore::new(settings());
    let now = Utc::now().timestamp();
    let token = issuer
        .sign(TokenClaims {
            sub: "u1".to_string(),
            token_type: TokenType::Access,
            jti: "expired-jti".to_string(),
            kid: String::new(),
            role: None,
            permissions: Vec::new(),
            pair_id: None,
            iat: now - 7200,
            nbf: now - 7200,
            exp: now - 3600,
            iss: "credkeep".to_string(),
            aud: "credkeep-api".to_string(),
        })
        .unwrap();

    assert!(store
        .revoke(&token, RevocationReason::ManualRevoke, None)
        .await
        .unwrap());
    assert_eq!(store.stats().await.revoked_count, 0);
}

#[tokio::test(start_paused = true)]
async fn test_default_ttl_follows_token_type() {
    let issuer = issuer();
    let store = RevocationStore::new(RevocationSettings {
        access_ttl: Duration::from_secs(60),
        ..settings()
    });
    let token = access_token(&issuer);

    store
        .revoke(&token, RevocationReason::ManualRevoke, None)
        .await
        .unwrap();
    assert!(store.is_revoked(&token, true).await.unwrap());

    tokio::time::advance(Duration::from_secs(61)).await;

    assert!(!store.is_revoked(&token, true).await.unwrap());
    assert_eq!(store.sweep_local().await.unwrap(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_explicit_ttl_overrides_default() {
    let issuer = issuer();
    let store = RevocationStore::new(settings());
    let token = refresh_token(&issuer);

    store
        .revoke(&token, RevocationReason::ManualRevoke, Some(Duration::from_secs(5)))
        .await
        .unwrap();

    tokio::time::advance(Duration::from_secs(6)).await;
    assert!(!store.is_revoked(&token, true).await.unwrap());
}

#[tokio::test]
async fn test_revoke_many_reports_each_token() {
    let issuer = issuer();
    let store = RevocationStore::new(settings());
    let tokens = vec![
        access_token(&issuer),
        "garbage".to_string(),
        refresh_token(&issuer),
    ];

    let report = store.revoke_many(&tokens, RevocationReason::BulkRevoke).await;

    assert_eq!(report.outcomes.len(), 3);
    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.failed(), 1);
    assert!(report.outcomes[0].revoked);
    assert!(!report.outcomes[1].revoked);
    assert!(report.outcomes[1].token_id.is_none());
    assert!(report.outcomes[1].error.is_some());
    assert!(report.outcomes[2].revoked);

    assert!(store.is_revoked(&tokens[0], false).await.unwrap());
    assert!(store.is_revoked(&tokens[2], false).await.unwrap());
}

#[tokio::test]
async fn test_stats_on_local_backend() {
    let issuer = issuer();
    let store = RevocationStore::new(settings());
    store
        .revoke(&access_token(&issuer), RevocationReason::Logout, None)
        .await
        .unwrap();

    let stats = store.stats().await;
    assert_eq!(stats.revoked_count, 1);
    assert_eq!(stats.backend, "memory");
    assert!(!stats.degraded);
}

#[tokio::test]
async fn test_shared_backend_visible_across_instances() {
    let issuer = issuer();
    let shared = Arc::new(FlakyBackend::new());
    let instance_a = RevocationStore::with_backend(settings(), shared.clone());
    let instance_b = RevocationStore::with_backend(settings(), shared.clone());
    let token = access_token(&issuer);

    instance_a
        .revoke(&token, RevocationReason::Logout, None)
        .await
        .unwrap();

    assert!(instance_b.is_revoked(&token, false).await.unwrap());
    let stats = instance_b.stats().await;
    assert_eq!(stats.backend, "flaky");
    assert_eq!(stats.revoked_count, 1);
}

#[tokio::test]
async fn test_failing_backend_falls_back_to_local() {
    let issuer = issuer();
    let shared = Arc::new(FlakyBackend::new());
    shared.set_failing(true);
    let store = RevocationStore::with_backend(settings(), shared.clone());
    let token = access_token(&issuer);

    assert!(store
        .revoke(&token, RevocationReason::Logout, None)
        .await
        .unwrap());
    assert!(store.is_degraded());
    assert!(store.is_revoked(&token, false).await.unwrap());

    let stats = store.stats().await;
    assert_eq!(stats.backend, "memory");
    assert!(stats.degraded);
}

#[tokio::test(start_paused = true)]
async fn test_stalled_backend_times_out() {
    let issuer = issuer();
    let shared = Arc::new(FlakyBackend::new());
    shared.set_stalled(true);
    let store = RevocationStore::with_backend(settings(), shared.clone());
    let token = access_token(&issuer);

    assert!(!store.is_revoked(&token, false).await.unwrap());
    assert!(store.is_degraded());
}

#[tokio::test(start_paused = true)]
async fn test_backend_skipped_during_back_off_then_recovers() {
    let issuer = issuer();
    let shared = Arc::new(FlakyBackend::new());
    shared.set_failing(true);
    let store = RevocationStore::with_backend(
        RevocationSettings {
            retry_after: Duration::from_secs(30),
            ..settings()
        },
        shared.clone(),
    );
    let token = access_token(&issuer);

    store.is_revoked(&token, false).await.unwrap();
    assert_eq!(shared.calls(), 1);

    // Inside the back-off window the shared backend is not contacted
    store.is_revoked(&token, false).await.unwrap();
    assert_eq!(shared.calls(), 1);

    shared.set_failing(false);
    tokio::time::advance(Duration::from_secs(31)).await;

    store.is_revoked(&token, false).await.unwrap();
    assert_eq!(shared.calls(), 2);
    assert!(!store.is_degraded());
}

#[tokio::test]
async fn test_startup_degraded_store() {
    let store = RevocationStore::degraded(settings(), "connection refused");

    let stats = store.stats().await;
    assert!(stats.degraded);
    assert_eq!(stats.backend, "memory");
}

#[tokio::test]
async fn test_peeked_claims_match_revocation_key() {
    let issuer = issuer();
    let store = RevocationStore::new(settings());
    let token = access_token(&issuer);
    let claims = TokenVerifier::peek_claims(&token).unwrap();

    store
        .revoke_claims(&claims, RevocationReason::ManualRevoke, None)
        .await
        .unwrap();

    assert!(store.is_revoked(&token, false).await.unwrap());
}
