//! Service configuration.

use aksara_core::{default_catalog, TokenPackage};

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on. `PORT` sets the port (default 3000).
    pub listen_addr: String,

    /// Directory holding the JSON data files (default: "data").
    pub data_dir: String,

    /// HS256 signing secret for bearer tokens.
    pub jwt_secret: String,

    /// Token balance granted to new registrations (default: 500).
    pub signup_bonus_tokens: i64,

    /// Groq API key (optional; `REPLACE_ME` counts as unset).
    pub groq_api_key: Option<String>,

    /// Groq API base URL.
    pub groq_api_url: String,

    /// Groq model name.
    pub groq_model: String,

    /// Gemini API key (optional; `GOOGLE_API_KEY` is accepted as an alias).
    pub gemini_api_key: Option<String>,

    /// Gemini API base URL.
    pub gemini_api_url: String,

    /// Gemini model name.
    pub gemini_model: String,

    /// Midtrans server key (optional; payments disabled without it).
    pub midtrans_server_key: Option<String>,

    /// Midtrans client key (optional; exposed to the checkout frontend).
    pub midtrans_client_key: Option<String>,

    /// Midtrans API base URL (sandbox by default).
    pub midtrans_api_url: String,

    /// The purchasable token package catalog.
    pub packages: Vec<TokenPackage>,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds. Generation requests may traverse two
    /// providers at 30s each, so this sits above twice the client timeout.
    pub request_timeout_seconds: u64,
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            listen_addr: std::env::var("PORT")
                .map(|port| format!("0.0.0.0:{port}"))
                .unwrap_or_else(|_| "0.0.0.0:3000".into()),
            data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "data".into()),
            jwt_secret: std::env::var("JWT_SECRET")
                .unwrap_or_else(|_| "dev-secret-please-change".into()),
            signup_bonus_tokens: std::env::var("DEFAULT_TOKENS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(500),
            groq_api_key: std::env::var("GROQ_API_KEY")
                .ok()
                .filter(|key| !key.is_empty() && key != "REPLACE_ME"),
            groq_api_url: std::env::var("GROQ_API_URL")
                .unwrap_or_else(|_| "https://api.groq.com".into()),
            groq_model: std::env::var("GROQ_MODEL")
                .unwrap_or_else(|_| "llama-3.1-8b-instant".into()),
            gemini_api_key: std::env::var("GEMINI_API_KEY")
                .ok()
                .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
                .filter(|key| !key.is_empty()),
            gemini_api_url: std::env::var("GEMINI_API_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".into()),
            gemini_model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-1.5-flash".into()),
            midtrans_server_key: std::env::var("MIDTRANS_SERVER_KEY")
                .ok()
                .filter(|key| !key.is_empty()),
            midtrans_client_key: std::env::var("MIDTRANS_CLIENT_KEY")
                .ok()
                .filter(|key| !key.is_empty()),
            midtrans_api_url: std::env::var("MIDTRANS_API_URL")
                .unwrap_or_else(|_| "https://app.sandbox.midtrans.com".into()),
            packages: default_catalog(),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_body_bytes: std::env::var("MAX_BODY_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1024 * 1024), // 1MB
            request_timeout_seconds: std::env::var("REQUEST_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(90),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:3000".into(),
            data_dir: "data".into(),
            jwt_secret: "dev-secret-please-change".into(),
            signup_bonus_tokens: 500,
            groq_api_key: None,
            groq_api_url: "https://api.groq.com".into(),
            groq_model: "llama-3.1-8b-instant".into(),
            gemini_api_key: None,
            gemini_api_url: "https://generativelanguage.googleapis.com".into(),
            gemini_model: "gemini-1.5-flash".into(),
            midtrans_server_key: None,
            midtrans_client_key: None,
            midtrans_api_url: "https://app.sandbox.midtrans.com".into(),
            packages: default_catalog(),
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 90,
        }
    }
}
