//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{delete, get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{admin, auth, generate, health, history, topup};
use crate::state::AppState;

/// Maximum concurrent in-flight generation requests.
/// Generation handlers hold slow upstream connections, so they are bounded
/// separately from the cheap CRUD endpoints.
const GENERATE_MAX_CONCURRENT_REQUESTS: usize = 50;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /api/health` - Health check
/// - `POST /api/topup/notification` - Payment gateway webhook
///
/// ## Auth
/// - `POST /api/auth/register`, `POST /api/auth/login`
/// - `GET /api/auth/me`, `POST /api/auth/logout`, `GET /api/balance`
///
/// ## Admin (owner only)
/// - `GET /api/admin/users`
/// - `POST /api/admin/user/:user_id/tokens`, `DELETE /api/admin/user/:user_id`
///
/// ## Top-up
/// - `GET /api/topup/packages`, `POST /api/topup/create`
/// - `GET /api/topup/history`, `GET /api/topup/status/:order_id`
///
/// ## Generation (token metered, concurrency limited)
/// - `POST /api/chat`, `/api/cerpen`, `/api/skenario`, `/api/rewrite`
/// - `POST /api/novel/{create,continue,outline,character,world}`
///
/// ## History
/// - `GET /api/history` (legacy), `GET /api/history/:feature`,
///   `GET /api/history/:feature/:id`
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    // Build CORS layer
    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    // Generation routes hold upstream connections for the duration of the AI
    // call, so they get their own concurrency limit.
    let generate_routes = Router::new()
        .route("/chat", post(generate::chat))
        .route("/cerpen", post(generate::cerpen))
        .route("/skenario", post(generate::skenario))
        .route("/rewrite", post(generate::rewrite))
        .route("/novel/create", post(generate::novel_create))
        .route("/novel/continue", post(generate::novel_continue))
        .route("/novel/outline", post(generate::novel_outline))
        .route("/novel/character", post(generate::novel_character))
        .route("/novel/world", post(generate::novel_world))
        .layer(ConcurrencyLimitLayer::new(GENERATE_MAX_CONCURRENT_REQUESTS));

    let api_routes = Router::new()
        // Health
        .route("/health", get(health::health))
        // Auth
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        .route("/auth/logout", post(auth::logout))
        .route("/balance", get(auth::balance))
        // Admin (owner only)
        .route("/admin/users", get(admin::list_users))
        .route("/admin/user/:user_id/tokens", post(admin::adjust_tokens))
        .route("/admin/user/:user_id", delete(admin::delete_user))
        // Top-up
        .route("/topup/packages", get(topup::packages))
        .route("/topup/create", post(topup::create))
        .route("/topup/notification", post(topup::notification))
        .route("/topup/history", get(topup::history))
        .route("/topup/status/:order_id", get(topup::status))
        // History
        .route("/history", get(history::legacy_sessions))
        .route("/history/:feature", get(history::list))
        .route("/history/:feature/:id", get(history::detail))
        // Generation routes (with their own concurrency limit)
        .merge(generate_routes);

    Router::new()
        .nest("/api", api_routes)
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
