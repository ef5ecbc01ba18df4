//! Token-metered generation integration tests.
//!
//! The Groq endpoint is stood in by a wiremock server so the full pipeline
//! (deduct, call provider, record history, respond) runs end to end.

mod common;

use axum::http::StatusCode;
use common::TestHarness;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use aksara_service::ServiceConfig;

async fn harness_with_groq(signup_bonus_tokens: i64) -> (TestHarness, MockServer) {
    let groq = MockServer::start().await;
    let config = ServiceConfig {
        signup_bonus_tokens,
        groq_api_key: Some("test-key".into()),
        groq_api_url: groq.uri(),
        ..ServiceConfig::default()
    };
    (TestHarness::with_config(config), groq)
}

fn groq_reply(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{ "message": { "role": "assistant", "content": text } }]
    }))
}

// ============================================================================
// Chat
// ============================================================================

#[tokio::test]
async fn chat_deducts_one_token_and_records_history() {
    let (harness, groq) = harness_with_groq(500).await;
    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .respond_with(groq_reply("hi there"))
        .expect(1)
        .mount(&groq)
        .await;

    let (token, _) = harness.register("alice", "a@x.com", "pw123").await;

    let response = harness
        .server
        .post("/api/chat")
        .add_header("authorization", TestHarness::bearer(&token))
        .json(&json!({ "message": "hello" }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["reply"], "hi there");
    assert_eq!(body["tokens"], 499);
    assert!(body.get("cost").is_none());

    assert_eq!(harness.balance(&token).await, 499);

    // Exactly one history entry, charged at the chat cost.
    let response = harness
        .server
        .get("/api/history/chat")
        .add_header("authorization", TestHarness::bearer(&token))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["excerpt"], "hi there");
    assert_eq!(items[0]["tokensUsed"], 1);
    assert_eq!(items[0]["title"], "hello");
}

#[tokio::test]
async fn empty_chat_message_is_rejected_before_charging() {
    let (harness, _groq) = harness_with_groq(500).await;
    let (token, _) = harness.register("alice", "a@x.com", "pw123").await;

    let response = harness
        .server
        .post("/api/chat")
        .add_header("authorization", TestHarness::bearer(&token))
        .json(&json!({ "message": "   " }))
        .await;

    response.assert_status_bad_request();
    assert_eq!(harness.balance(&token).await, 500);
}

#[tokio::test]
async fn generation_requires_authentication() {
    let (harness, _groq) = harness_with_groq(500).await;

    harness
        .server
        .post("/api/chat")
        .json(&json!({ "message": "hello" }))
        .await
        .assert_status_unauthorized();
}

// ============================================================================
// Balance exhaustion
// ============================================================================

#[tokio::test]
async fn skenario_below_cost_is_refused_without_provider_call() {
    // Balance 3 against a 5000-word description costing 104.
    let (harness, groq) = harness_with_groq(3).await;
    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .respond_with(groq_reply("never used"))
        .expect(0)
        .mount(&groq)
        .await;

    let (token, _) = harness.register("alice", "a@x.com", "pw123").await;

    let description = "kata ".repeat(5000);
    let response = harness
        .server
        .post("/api/skenario")
        .add_header("authorization", TestHarness::bearer(&token))
        .json(&json!({ "judul": "Senja", "genre": "drama", "deskripsi": description }))
        .await;

    response.assert_status(StatusCode::PAYMENT_REQUIRED);
    let body: serde_json::Value = response.json();
    assert_eq!(body, json!({ "error": "Saldo token habis", "tokens": 3 }));

    // Balance unchanged, no history written.
    assert_eq!(harness.balance(&token).await, 3);
    let response = harness
        .server
        .get("/api/history/skenario")
        .add_header("authorization", TestHarness::bearer(&token))
        .await;
    let body: serde_json::Value = response.json();
    assert!(body["items"].as_array().unwrap().is_empty());
}

// ============================================================================
// Provider unavailability
// ============================================================================

#[tokio::test]
async fn unconfigured_provider_answers_with_notice_without_charging() {
    let harness = TestHarness::new();
    let (token, _) = harness.register("alice", "a@x.com", "pw123").await;

    let response = harness
        .server
        .post("/api/chat")
        .add_header("authorization", TestHarness::bearer(&token))
        .json(&json!({ "message": "hello" }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert!(body["reply"].as_str().unwrap().contains("belum aktif"));
    assert!(body.get("tokens").is_none());

    assert_eq!(harness.balance(&token).await, 500);
}

#[tokio::test]
async fn provider_failure_refunds_the_cost() {
    let (harness, groq) = harness_with_groq(500).await;
    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&groq)
        .await;

    let (token, _) = harness.register("alice", "a@x.com", "pw123").await;

    let response = harness
        .server
        .post("/api/cerpen")
        .add_header("authorization", TestHarness::bearer(&token))
        .json(&json!({ "judul": "Senja", "tema": "rindu", "genre": "drama" }))
        .await;

    // Apologetic reply in a 200, balance restored, no history entry.
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert!(body["reply"].as_str().unwrap().contains("dikembalikan"));
    assert_eq!(body["tokens"], 500);

    assert_eq!(harness.balance(&token).await, 500);
    let response = harness
        .server
        .get("/api/history/cerpen")
        .add_header("authorization", TestHarness::bearer(&token))
        .await;
    let body: serde_json::Value = response.json();
    assert!(body["items"].as_array().unwrap().is_empty());
}

// ============================================================================
// Cost model over the wire
// ============================================================================

#[tokio::test]
async fn cerpen_cost_scales_with_target_length() {
    let (harness, groq) = harness_with_groq(500).await;
    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .respond_with(groq_reply("sebuah cerpen"))
        .mount(&groq)
        .await;

    let (token, _) = harness.register("alice", "a@x.com", "pw123").await;

    // Default 500-word target costs 8.
    let response = harness
        .server
        .post("/api/cerpen")
        .add_header("authorization", TestHarness::bearer(&token))
        .json(&json!({ "judul": "Senja", "tema": "rindu", "genre": "drama" }))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["tokens"], 492);
}

#[tokio::test]
async fn novel_create_reports_cost() {
    let (harness, groq) = harness_with_groq(500).await;
    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .respond_with(groq_reply("Bab 1. Hujan turun."))
        .mount(&groq)
        .await;

    let (token, _) = harness.register("alice", "a@x.com", "pw123").await;

    let response = harness
        .server
        .post("/api/novel/create")
        .add_header("authorization", TestHarness::bearer(&token))
        .json(&json!({ "judul": "Senja", "genre": "fantasi", "tema": "pengorbanan" }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    // Default 800-word chapter costs 13.
    assert_eq!(body["cost"], 13);
    assert_eq!(body["tokens"], 487);
}

#[tokio::test]
async fn novel_continue_accepts_legacy_field_spellings() {
    let (harness, groq) = harness_with_groq(500).await;
    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .respond_with(groq_reply("Raka melangkah maju."))
        .mount(&groq)
        .await;

    let (token, _) = harness.register("alice", "a@x.com", "pw123").await;

    let response = harness
        .server
        .post("/api/novel/continue")
        .add_header("authorization", TestHarness::bearer(&token))
        .json(&json!({ "context": "Raka berdiri di tepi jurang.", "arahan": "Dia melompat." }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    // Default 600-word continuation costs 10.
    assert_eq!(body["cost"], 10);
    assert_eq!(body["tokens"], 490);
}
