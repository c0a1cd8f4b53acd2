//! Integration tests for the refresh endpoint

mod common;

use actix_web::test;
use serde_json::{json, Value};

use ck_api::app::create_app;
use ck_api::dto::TokenResponse;
use ck_core::{ClaimSet, TokenType};

use common::{credentials, state, strict_credentials};

#[actix_web::test]
async fn test_refresh_returns_new_pair() {
    let credentials = credentials();
    let pair = credentials
        .issue_pair("u1", &ClaimSet::with_role("member"))
        .unwrap();
    let app = test::init_service(create_app(state(credentials.clone()))).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .set_json(json!({ "refresh_token": pair.refresh_token }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let body: TokenResponse = test::read_body_json(resp).await;
    assert_eq!(body.token_type, "Bearer");
    assert_eq!(body.access_expires_in, 3600);
    assert_ne!(body.refresh_token, pair.refresh_token);

    let claims = credentials
        .verifier()
        .verify_typed(&body.access_token, TokenType::Access)
        .unwrap();
    assert_eq!(claims.sub, "u1");
    assert_eq!(claims.role.as_deref(), Some("member"));
}

#[actix_web::test]
async fn test_refresh_ignores_client_claims() {
    let credentials = credentials();
    let pair = credentials
        .issue_pair(
            "u1",
            &ClaimSet::new(Some("member".to_string()), vec!["read".to_string()]),
        )
        .unwrap();
    let app = test::init_service(create_app(state(credentials.clone()))).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .set_json(json!({
            "refresh_token": pair.refresh_token,
            "role": "admin",
            "permissions": ["expenses:approve"]
        }))
        .to_request();
    let body: TokenResponse = test::call_and_read_body_json(&app, req).await;

    let access = credentials.verifier().verify(&body.access_token).unwrap();
    assert_eq!(access.role.as_deref(), Some("member"));
    assert_eq!(access.permissions, vec!["read".to_string()]);

    let refresh = credentials.verifier().verify(&body.refresh_token).unwrap();
    assert_eq!(refresh.role.as_deref(), Some("member"));
}

#[actix_web::test]
async fn test_refresh_token_is_single_use() {
    let credentials = strict_credentials();
    let pair = credentials.issue_pair("u1", &ClaimSet::default()).unwrap();
    let app = test::init_service(create_app(state(credentials))).await;

    let first = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .set_json(json!({ "refresh_token": pair.refresh_token }))
        .to_request();
    assert_eq!(test::call_service(&app, first).await.status(), 200);

    let replay = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .set_json(json!({ "refresh_token": pair.refresh_token }))
        .to_request();
    let resp = test::call_service(&app, replay).await;

    assert_eq!(resp.status(), 403);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "token_revoked");
}

#[actix_web::test]
async fn test_refresh_rejects_access_token() {
    let credentials = credentials();
    let pair = credentials.issue_pair("u1", &ClaimSet::default()).unwrap();
    let app = test::init_service(create_app(state(credentials.clone()))).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .set_json(json!({ "refresh_token": pair.access_token }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 403);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid_token");

    // The misused access token was not consumed
    assert!(credentials.authenticate(&pair.access_token).await.is_ok());
}

#[actix_web::test]
async fn test_refresh_with_empty_token() {
    let app = test::init_service(create_app(state(credentials()))).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .set_json(json!({ "refresh_token": "" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 401);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "unauthenticated");
}

#[actix_web::test]
async fn test_refresh_with_garbage_token() {
    let app = test::init_service(create_app(state(credentials()))).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .set_json(json!({ "refresh_token": "a.b.c" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 401);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid_token");
}

#[actix_web::test]
async fn test_refresh_with_missing_field() {
    let app = test::init_service(create_app(state(credentials()))).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .set_json(json!({ "token": "x" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "bad_request");
}
