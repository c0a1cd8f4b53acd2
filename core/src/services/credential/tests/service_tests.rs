use std::time::Duration;

use crate::domain::entities::{ClaimSet, RevocationReason, TokenType};
use crate::errors::{DomainError, TokenError};
use crate::services::credential::PairRevocation;
use crate::services::token::TokenVerifier;

use super::{service, service_with_grace};

fn member() -> ClaimSet {
    ClaimSet::new(Some("member".to_string()), vec!["expenses:read".to_string()])
}

fn token_error<T: std::fmt::Debug>(result: Result<T, DomainError>) -> TokenError {
    match result {
        Err(DomainError::Token(e)) => e,
        other => panic!("expected token error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_authenticate_resolves_identity() {
    let service = service();
    let pair = service.issue_pair("u1", &member()).unwrap();

    let identity = service.authenticate(&pair.access_token).await.unwrap();

    assert_eq!(identity.subject_id, "u1");
    assert_eq!(identity.role.as_deref(), Some("member"));
    assert_eq!(identity.permissions, vec!["expenses:read".to_string()]);
    assert_eq!(identity.pair_id.as_deref(), Some(pair.pair_id.as_str()));
}

#[tokio::test]
async fn test_authenticate_rejects_refresh_token() {
    let service = service();
    let pair = service.issue_pair("u1", &member()).unwrap();

    let err = token_error(service.authenticate(&pair.refresh_token).await);
    assert_eq!(
        err,
        TokenError::WrongType {
            expected: TokenType::Access,
            actual: TokenType::Refresh,
        }
    );
}

#[tokio::test]
async fn test_authenticate_rejects_revoked_token() {
    let service = service();
    let pair = service.issue_pair("u1", &member()).unwrap();

    service
        .revocations()
        .revoke(&pair.access_token, RevocationReason::ManualRevoke, None)
        .await
        .unwrap();

    assert_eq!(
        token_error(service.authenticate(&pair.access_token).await),
        TokenError::Revoked
    );
}

#[tokio::test]
async fn test_refresh_consumes_presented_token() {
    let service = service();
    let original = service.issue_pair("u1", &member()).unwrap();

    let renewed = service.refresh(&original.refresh_token, None).await.unwrap();

    let revocations = service.revocations();
    assert!(!revocations.is_revoked(&original.refresh_token, false).await.unwrap());
    assert!(revocations.is_revoked(&original.refresh_token, true).await.unwrap());

    assert!(!revocations.is_revoked(&renewed.access_token, true).await.unwrap());
    assert!(!revocations.is_revoked(&renewed.refresh_token, true).await.unwrap());
    assert_ne!(renewed.pair_id, original.pair_id);

    let identity = service.authenticate(&renewed.access_token).await.unwrap();
    assert_eq!(identity.subject_id, "u1");
    assert_eq!(identity.role.as_deref(), Some("member"));

    assert!(service
        .verifier()
        .verify_typed(&renewed.refresh_token, TokenType::Refresh)
        .is_ok());
}

#[tokio::test]
async fn test_refresh_with_access_token_issues_nothing() {
    let service = service();
    let pair = service.issue_pair("u1", &member()).unwrap();

    let err = token_error(service.refresh(&pair.access_token, None).await);

    assert!(matches!(err, TokenError::WrongType { .. }));
    assert_eq!(service.revocation_stats().await.revoked_count, 0);
}

#[tokio::test]
async fn test_refresh_reuse_after_grace_is_rejected() {
    let service = service_with_grace(Duration::ZERO);
    let pair = service.issue_pair("u1", &member()).unwrap();

    service.refresh(&pair.refresh_token, None).await.unwrap();

    assert_eq!(
        token_error(service.refresh(&pair.refresh_token, None).await),
        TokenError::Revoked
    );
}

#[tokio::test]
async fn test_grace_window_anchored_at_first_rotation() {
    let service = service_with_grace(Duration::from_millis(1000));
    let pair = service.issue_pair("u1", &member()).unwrap();

    service.refresh(&pair.refresh_token, None).await.unwrap();

    tokio::time::sleep(Duration::from_millis(600)).await;
    service.refresh(&pair.refresh_token, None).await.unwrap();

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(
        token_error(service.refresh(&pair.refresh_token, None).await),
        TokenError::Revoked
    );
}

#[tokio::test]
async fn test_concurrent_refresh_within_grace_both_succeed() {
    let service = service();
    let pair = service.issue_pair("u1", &member()).unwrap();

    let (first, second) = futures_util::future::join(
        service.refresh(&pair.refresh_token, None),
        service.refresh(&pair.refresh_token, None),
    )
    .await;

    let first = first.unwrap();
    let second = second.unwrap();
    assert_ne!(first.refresh_token, second.refresh_token);
    assert!(service.authenticate(&first.access_token).await.is_ok());
    assert!(service.authenticate(&second.access_token).await.is_ok());
}

#[tokio::test]
async fn test_refresh_applies_overrides() {
    let service = service();
    let pair = service.issue_pair("u1", &member()).unwrap();

    let renewed = service
        .refresh(&pair.refresh_token, Some(ClaimSet::with_role("admin")))
        .await
        .unwrap();

    let claims = TokenVerifier::peek_claims(&renewed.access_token).unwrap();
    assert_eq!(claims.role.as_deref(), Some("admin"));
    assert_eq!(claims.permissions, vec!["expenses:read".to_string()]);
}

#[tokio::test]
async fn test_revoke_pair_for_logout() {
    let service = service();
    let pair = service.issue_pair("u1", &member()).unwrap();

    let result = service
        .revoke_pair(
            Some(&pair.access_token),
            Some(&pair.refresh_token),
            RevocationReason::Logout,
        )
        .await;

    assert_eq!(
        result,
        PairRevocation {
            access_revoked: true,
            refresh_revoked: true,
        }
    );
    assert_eq!(
        token_error(service.authenticate(&pair.access_token).await),
        TokenError::Revoked
    );
    assert_eq!(
        token_error(service.refresh(&pair.refresh_token, None).await),
        TokenError::Revoked
    );
}

#[tokio::test]
async fn test_revoke_pair_sides_are_independent() {
    let service = service();
    let pair = service.issue_pair("u1", &member()).unwrap();

    let result = service
        .revoke_pair(Some("garbage"), Some(&pair.refresh_token), RevocationReason::Logout)
        .await;

    assert!(!result.access_revoked);
    assert!(result.refresh_revoked);

    let nothing = service.revoke_pair(None, None, RevocationReason::Logout).await;
    assert_eq!(nothing, PairRevocation::default());
}

#[tokio::test]
async fn test_revoke_tokens_in_bulk() {
    let service = service();
    let a = service.issue_pair("u1", &member()).unwrap();
    let b = service.issue_pair("u2", &member()).unwrap();

    let report = service
        .revoke_tokens(
            &[a.access_token.clone(), b.access_token.clone()],
            RevocationReason::BulkRevoke,
        )
        .await;

    assert_eq!(report.succeeded(), 2);
    assert!(service.authenticate(&a.access_token).await.is_err());
    assert!(service.authenticate(&b.access_token).await.is_err());
}

#[tokio::test]
async fn test_diagnostics() {
    let service = service();
    let pair = service.issue_pair("u1", &member()).unwrap();
    service.refresh(&pair.refresh_token, None).await.unwrap();

    let status = service.key_status();
    assert!(status.current_key_id.is_some());
    assert_eq!(status.verification_key_count, 2);

    let stats = service.revocation_stats().await;
    assert_eq!(stats.revoked_count, 1);
    assert_eq!(stats.backend, "memory");
}
