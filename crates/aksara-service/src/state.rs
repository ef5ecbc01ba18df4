//! Application state.

use std::sync::Arc;

use aksara_store::JsonStore;

use crate::ai::AiClient;
use crate::config::ServiceConfig;
use crate::midtrans::MidtransClient;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend.
    pub store: Arc<JsonStore>,

    /// Service configuration.
    pub config: ServiceConfig,

    /// AI completion client (absent when no provider key is configured).
    pub ai: Option<Arc<AiClient>>,

    /// Midtrans client for top-ups (absent when no server key is configured).
    pub midtrans: Option<Arc<MidtransClient>>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<JsonStore>, config: ServiceConfig) -> Self {
        let ai = AiClient::from_config(&config).map(Arc::new);
        match &ai {
            Some(ai) => {
                tracing::info!(providers = ?ai.provider_names(), "AI providers enabled");
            }
            None => {
                tracing::warn!(
                    "No AI provider configured - generation endpoints will answer with a notice"
                );
            }
        }

        let midtrans = config.midtrans_server_key.as_ref().and_then(|server_key| {
            match MidtransClient::new(&config.midtrans_api_url, server_key) {
                Ok(client) => {
                    tracing::info!("Midtrans integration enabled");
                    Some(Arc::new(client))
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to create Midtrans client");
                    None
                }
            }
        });

        if midtrans.is_none() {
            tracing::warn!("Midtrans not configured - top-ups will not be available");
        }

        Self {
            store,
            config,
            ai,
            midtrans,
        }
    }

    /// Check if an AI provider is configured.
    #[must_use]
    pub fn has_ai(&self) -> bool {
        self.ai.is_some()
    }

    /// Check if Midtrans is configured.
    #[must_use]
    pub fn has_midtrans(&self) -> bool {
        self.midtrans.is_some()
    }
}
