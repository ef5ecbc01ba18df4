//! Common test utilities for aksara integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use tempfile::TempDir;

use aksara_service::{create_router, AppState, ServiceConfig};
use aksara_store::{JsonStore, Store};

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Direct store handle for seeding data behind the API.
    pub store: Arc<JsonStore>,
    /// Temporary data directory (kept alive for the test duration).
    pub temp_dir: TempDir,
}

impl TestHarness {
    /// Create a new harness with a fresh data directory, no AI provider, and
    /// no payment gateway.
    pub fn new() -> Self {
        Self::with_config(ServiceConfig::default())
    }

    /// Create a harness over a custom configuration. The data directory and
    /// signing secret are always replaced with test values.
    pub fn with_config(mut config: ServiceConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        config.data_dir = temp_dir.path().to_string_lossy().to_string();
        config.jwt_secret = "test-secret".into();

        let store = Arc::new(JsonStore::open(temp_dir.path()).expect("Failed to open store"));
        let state = AppState::new(store.clone(), config);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            store,
            temp_dir,
        }
    }

    /// Register a user and return its bearer token and user object.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> (String, serde_json::Value) {
        let response = self
            .server
            .post("/api/auth/register")
            .json(&serde_json::json!({
                "username": username,
                "email": email,
                "password": password,
            }))
            .await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        let token = body["token"].as_str().expect("token in response").to_string();
        (token, body["user"].clone())
    }

    /// Format a bearer authorization header value.
    pub fn bearer(token: &str) -> String {
        format!("Bearer {token}")
    }

    /// Promote a user to owner and mint a token carrying the owner flag.
    pub async fn promote_to_owner(&self, user_id: &str, credential: &str, password: &str) -> String {
        let id: aksara_core::UserId = user_id.parse().expect("valid user id");
        let mut user = self
            .store
            .get_user(&id)
            .expect("store read")
            .expect("user exists");
        user.is_owner = true;
        self.store.put_user(&user).expect("store write");

        // Re-login so the token carries the owner flag.
        let response = self
            .server
            .post("/api/auth/login")
            .json(&serde_json::json!({
                "credential": credential,
                "password": password,
            }))
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        body["token"].as_str().expect("token").to_string()
    }

    /// Fetch the current balance through the API.
    pub async fn balance(&self, token: &str) -> i64 {
        let response = self
            .server
            .get("/api/balance")
            .add_header("authorization", Self::bearer(token))
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        body["tokens"].as_i64().expect("tokens in response")
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
