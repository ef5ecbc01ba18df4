//! Health check integration test.

mod common;

use common::TestHarness;

#[tokio::test]
async fn health_check_is_public() {
    let harness = TestHarness::new();

    let response = harness.server.get("/api/health").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body, serde_json::json!({ "ok": true }));
}
