#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Auth endpoints exercised through the production router.
//!
//! Verifies:
//! - registration assigns the default role and never echoes secrets
//! - login returns a signed token; failures are uniform across causes
//! - missing, malformed, tampered, expired, and orphaned tokens all
//!   yield 401 on protected routes
//! - a credential-store outage surfaces as 500, not as 401
//! - upload requires the ADMIN role; downloads require authentication

mod common;

use std::sync::atomic::Ordering;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::json;

use popcorn_picks::services::auth::store::UserRecord;
use popcorn_picks::services::auth::{Principal, TokenService};

use common::{
    auth_req, body_bytes, body_json, get_req, json_req, login, multipart_upload, send, spawn_app,
    test_secret_base64,
};

fn ghost_principal() -> Principal {
    Principal::from_record(UserRecord {
        id: 9999,
        username: "ghost".to_string(),
        password_hash: String::new(),
        roles: vec!["USER".to_string()],
    })
}

#[tokio::test]
async fn test_health_is_public_and_carries_request_id() {
    let app = spawn_app().await;

    let response = send(&app.router, get_req("/health")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(
        response.headers()["x-content-type-options"],
        "nosniff"
    );

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_register_assigns_default_role() {
    let app = spawn_app().await;

    let response = send(
        &app.router,
        json_req(
            "POST",
            "/api/v1/auth/register",
            json!({ "username": "carol", "password": "carol-password" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["username"], "carol");
    assert_eq!(body["roles"], json!(["USER"]));
    assert!(body["id"].as_i64().unwrap() > 0);
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());

    // The new account can log in right away.
    login(&app, "carol", "carol-password").await;
}

#[tokio::test]
async fn test_register_duplicate_username_conflicts() {
    let app = spawn_app().await;

    let response = send(
        &app.router,
        json_req(
            "POST",
            "/api/v1/auth/register",
            json!({ "username": "alice", "password": "another-password" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_rejects_invalid_auth_payloads() {
    let app = spawn_app().await;

    // Password below the minimum length.
    let response = send(
        &app.router,
        json_req(
            "POST",
            "/api/v1/auth/register",
            json!({ "username": "dave", "password": "2short" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Blank username on login.
    let response = send(
        &app.router,
        json_req(
            "POST",
            "/api/v1/auth/login",
            json!({ "username": "   ", "password": "whatever" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_login_returns_a_signed_token() {
    let app = spawn_app().await;

    let token = login(&app, "alice", "alice-password").await;
    assert_eq!(token.split('.').count(), 3);

    // The issued token is accepted by the verifier it came from.
    let claims = app.tokens.verify(&token).unwrap();
    assert_eq!(claims.sub, "alice");
}

#[tokio::test]
async fn test_login_failure_is_uniform_across_causes() {
    let app = spawn_app().await;

    let wrong_password = send(
        &app.router,
        json_req(
            "POST",
            "/api/v1/auth/login",
            json!({ "username": "alice", "password": "not-her-password" }),
        ),
    )
    .await;
    let unknown_user = send(
        &app.router,
        json_req(
            "POST",
            "/api/v1/auth/login",
            json!({ "username": "mallory", "password": "not-her-password" }),
        ),
    )
    .await;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);

    // Byte-identical bodies: no hint about which part was wrong.
    let a = body_bytes(wrong_password).await;
    let b = body_bytes(unknown_user).await;
    assert_eq!(a, b);

    let body: serde_json::Value = serde_json::from_slice(&a).unwrap();
    assert_eq!(body["error"]["message"], "invalid username or password");
}

#[tokio::test]
async fn test_missing_token_returns_401() {
    let app = spawn_app().await;

    let response = send(&app.router, get_req("/api/v1/watchlist")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_malformed_token_returns_401() {
    let app = spawn_app().await;

    let response = send(
        &app.router,
        auth_req("GET", "/api/v1/watchlist", "not.a.jwt"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_tampered_token_returns_401() {
    let app = spawn_app().await;

    let token = login(&app, "alice", "alice-password").await;

    // Flip the first character of the signature segment.
    let mut tampered: Vec<char> = token.chars().collect();
    let sig_start = token.rfind('.').unwrap() + 1;
    tampered[sig_start] = if tampered[sig_start] == 'A' { 'B' } else { 'A' };
    let tampered: String = tampered.into_iter().collect();
    assert_ne!(tampered, token);

    let response = send(&app.router, auth_req("GET", "/api/v1/watchlist", &tampered)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_token_returns_401() {
    let app = spawn_app().await;

    // Same signing secret, zero lifetime: expired the moment it is issued.
    let expiring = TokenService::new(&test_secret_base64(), 0).unwrap();
    let token = expiring
        .issue(&Principal::from_record(UserRecord {
            id: 1,
            username: "alice".to_string(),
            password_hash: String::new(),
            roles: vec!["USER".to_string()],
        }))
        .unwrap();

    let response = send(&app.router, auth_req("GET", "/api/v1/watchlist", &token)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_for_unknown_subject_returns_401() {
    let app = spawn_app().await;

    // Validly signed, but the subject no longer exists in the store.
    let token = app.tokens.issue(&ghost_principal()).unwrap();

    let response = send(&app.router, auth_req("GET", "/api/v1/watchlist", &token)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_store_outage_is_a_server_error_not_unauthorized() {
    let app = spawn_app().await;
    let token = login(&app, "alice", "alice-password").await;

    app.store.fail.store(true, Ordering::SeqCst);

    // Token verification succeeds; the principal lookup fails.
    let response = send(&app.router, auth_req("GET", "/api/v1/watchlist", &token)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "INTERNAL");

    // Anonymous requests never touch the store and still get a plain 401.
    let response = send(&app.router, get_req("/api/v1/watchlist")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_upload_requires_the_admin_role() {
    let app = spawn_app().await;
    let (content_type, body) = multipart_upload("file", "poster.png", b"png-bytes");

    let anonymous = Request::builder()
        .method("POST")
        .uri("/api/v1/files/upload")
        .header(header::CONTENT_TYPE, &content_type)
        .body(Body::from(body.clone()))
        .unwrap();
    let response = send(&app.router, anonymous).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let token = login(&app, "alice", "alice-password").await;
    let as_user = Request::builder()
        .method("POST")
        .uri("/api/v1/files/upload")
        .header(header::CONTENT_TYPE, &content_type)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body))
        .unwrap();
    let response = send(&app.router, as_user).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_admin_uploads_and_any_authenticated_user_downloads() {
    let app = spawn_app().await;
    let poster = b"fake png contents".to_vec();
    let (content_type, body) = multipart_upload("file", "poster.png", &poster);

    let admin_token = login(&app, "admin", "admin-password").await;
    let upload = Request::builder()
        .method("POST")
        .uri("/api/v1/files/upload")
        .header(header::CONTENT_TYPE, &content_type)
        .header(header::AUTHORIZATION, format!("Bearer {admin_token}"))
        .body(Body::from(body))
        .unwrap();
    let response = send(&app.router, upload).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let stored = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(stored.ends_with(".png"), "stored as {stored}");

    // Downloads are open to any authenticated user, not just admins.
    let alice_token = login(&app, "alice", "alice-password").await;
    let response = send(
        &app.router,
        auth_req("GET", &format!("/api/v1/files/{stored}"), &alice_token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    assert!(
        response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .starts_with("attachment"),
    );
    assert_eq!(body_bytes(response).await, poster);

    // Anonymous downloads are rejected before the file store is consulted.
    let response = send(&app.router, get_req(&format!("/api/v1/files/{stored}"))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
