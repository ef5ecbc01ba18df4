//! Registration, login, and account integration tests.

mod common;

use axum::http::StatusCode;
use common::TestHarness;
use serde_json::json;

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn register_grants_signup_bonus_and_login_works() {
    let harness = TestHarness::new();

    let (_, user) = harness.register("alice", "a@x.com", "pw123").await;
    assert_eq!(user["tokens"], 500);
    assert_eq!(user["isOwner"], false);

    // Same credentials log in, by username and by (differently-cased) email.
    for credential in ["alice", "A@X.com"] {
        let response = harness
            .server
            .post("/api/auth/login")
            .json(&json!({ "credential": credential, "password": "pw123" }))
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["user"]["username"], "alice");
    }
}

#[tokio::test]
async fn register_reports_bonus_tokens() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/api/auth/register")
        .json(&json!({ "username": "alice", "email": "a@x.com", "password": "pw123" }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["bonusTokens"], 500);
    assert!(body["token"].as_str().is_some());
}

#[tokio::test]
async fn register_missing_fields_is_rejected() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/api/auth/register")
        .json(&json!({ "username": "alice" }))
        .await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Username, email & password required");
}

#[tokio::test]
async fn duplicate_username_conflicts_case_insensitive() {
    let harness = TestHarness::new();
    harness.register("alice", "a@x.com", "pw123").await;

    let response = harness
        .server
        .post("/api/auth/register")
        .json(&json!({ "username": "ALICE", "email": "other@x.com", "password": "pw456" }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Username already taken");

    // No second record was created: the rejected email cannot log in.
    let response = harness
        .server
        .post("/api/auth/login")
        .json(&json!({ "credential": "other@x.com", "password": "pw456" }))
        .await;
    response.assert_status_unauthorized();
}

#[tokio::test]
async fn duplicate_email_conflicts_case_insensitive() {
    let harness = TestHarness::new();
    harness.register("alice", "a@x.com", "pw123").await;

    let response = harness
        .server
        .post("/api/auth/register")
        .json(&json!({ "username": "bob", "email": "A@X.COM", "password": "pw456" }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Email already registered");
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn login_with_wrong_password_is_rejected() {
    let harness = TestHarness::new();
    harness.register("alice", "a@x.com", "pw123").await;

    let response = harness
        .server
        .post("/api/auth/login")
        .json(&json!({ "credential": "alice", "password": "wrong" }))
        .await;

    response.assert_status_unauthorized();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn login_with_unknown_credential_is_rejected() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/api/auth/login")
        .json(&json!({ "credential": "nobody", "password": "pw123" }))
        .await;

    response.assert_status_unauthorized();
}

// ============================================================================
// Current user & balance
// ============================================================================

#[tokio::test]
async fn me_returns_profile_without_password_hash() {
    let harness = TestHarness::new();
    let (token, _) = harness.register("alice", "a@x.com", "pw123").await;

    let response = harness
        .server
        .get("/api/auth/me")
        .add_header("authorization", TestHarness::bearer(&token))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["username"], "alice");
    assert_eq!(body["email"], "a@x.com");
    assert_eq!(body["tokens"], 500);
    assert!(body.get("passwordHash").is_none());
}

#[tokio::test]
async fn me_without_token_is_unauthorized() {
    let harness = TestHarness::new();

    harness.server.get("/api/auth/me").await.assert_status_unauthorized();
}

#[tokio::test]
async fn garbage_token_is_unauthorized() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .get("/api/balance")
        .add_header("authorization", "Bearer not-a-jwt")
        .await;

    response.assert_status_unauthorized();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Invalid token");
}

#[tokio::test]
async fn balance_reports_current_tokens() {
    let harness = TestHarness::new();
    let (token, _) = harness.register("alice", "a@x.com", "pw123").await;

    assert_eq!(harness.balance(&token).await, 500);
}

#[tokio::test]
async fn logout_acknowledges() {
    let harness = TestHarness::new();
    let (token, _) = harness.register("alice", "a@x.com", "pw123").await;

    let response = harness
        .server
        .post("/api/auth/logout")
        .add_header("authorization", TestHarness::bearer(&token))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["ok"], true);
}
