use std::time::Duration;

use crate::domain::entities::{RevocationReason, RevocationRecord, TokenType};
use crate::services::revocation::{InMemoryRevocationBackend, RevocationBackend};

fn record(token_id: &str) -> RevocationRecord {
    RevocationRecord::new(token_id, RevocationReason::Logout, TokenType::Access)
}

#[tokio::test(start_paused = true)]
async fn test_record_visible_until_ttl() {
    let backend = InMemoryRevocationBackend::new();
    backend.put(&record("t1"), Duration::from_secs(60)).await.unwrap();

    let found = backend.get("t1").await.unwrap().unwrap();
    assert_eq!(found.reason, RevocationReason::Logout);
    assert_eq!(backend.count().await.unwrap(), 1);

    tokio::time::advance(Duration::from_secs(61)).await;

    assert!(backend.get("t1").await.unwrap().is_none());
    assert_eq!(backend.count().await.unwrap(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_purge_removes_only_expired() {
    let backend = InMemoryRevocationBackend::new();
    backend.put(&record("short"), Duration::from_secs(5)).await.unwrap();
    backend.put(&record("long"), Duration::from_secs(500)).await.unwrap();

    tokio::time::advance(Duration::from_secs(10)).await;

    assert_eq!(backend.stored_len().await, 2);
    assert_eq!(backend.purge_expired().await.unwrap(), 1);
    assert_eq!(backend.stored_len().await, 1);
    assert!(backend.get("long").await.unwrap().is_some());
}

#[tokio::test]
async fn test_missing_record() {
    let backend = InMemoryRevocationBackend::new();
    assert!(backend.get("unknown").await.unwrap().is_none());
    assert_eq!(backend.name(), "memory");
}

#[tokio::test]
async fn test_put_overwrites_existing_record() {
    let backend = InMemoryRevocationBackend::new();
    backend.put(&record("t1"), Duration::from_secs(60)).await.unwrap();

    let rotated = RevocationRecord::new("t1", RevocationReason::TokenRotated, TokenType::Refresh);
    backend.put(&rotated, Duration::from_secs(60)).await.unwrap();

    let found = backend.get("t1").await.unwrap().unwrap();
    assert_eq!(found.reason, RevocationReason::TokenRotated);
    assert_eq!(backend.count().await.unwrap(), 1);
}
