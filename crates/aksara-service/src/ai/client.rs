//! AI completion client implementation.

use std::time::Duration;

use reqwest::Client;

use crate::config::ServiceConfig;

use super::types::{
    ChatMessage, GeminiContent, GeminiGenerateRequest, GeminiGenerateResponse, GeminiPart,
    GroqChatRequest, GroqChatResponse,
};

/// Error type for AI completion operations.
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider returned a non-success status.
    #[error("{provider} API error: {status}: {body}")]
    Api {
        /// Provider name.
        provider: &'static str,
        /// HTTP status code.
        status: u16,
        /// Response body, for logging.
        body: String,
    },

    /// Provider answered without any completion text.
    #[error("{provider} returned an empty completion")]
    Empty {
        /// Provider name.
        provider: &'static str,
    },

    /// No provider key is configured.
    #[error("no AI provider configured")]
    NotConfigured,
}

/// A completion request: a chat transcript or a single prompt, optionally
/// with a system instruction.
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    /// System instruction prepended to the conversation.
    pub system: Option<String>,
    /// Chat transcript. When empty, `prompt` is used instead.
    pub messages: Vec<ChatMessage>,
    /// Single-shot prompt.
    pub prompt: Option<String>,
}

impl CompletionRequest {
    /// Build a single-shot prompt request.
    #[must_use]
    pub fn prompt(prompt: impl Into<String>) -> Self {
        Self {
            prompt: Some(prompt.into()),
            ..Self::default()
        }
    }

    /// Build a conversational request.
    #[must_use]
    pub fn conversation(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    /// Attach a system instruction.
    #[must_use]
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

/// One provider strategy in the fallback chain.
#[derive(Debug, Clone)]
enum Provider {
    Groq {
        api_key: String,
        base_url: String,
        model: String,
    },
    Gemini {
        api_key: String,
        base_url: String,
        model: String,
    },
}

impl Provider {
    const fn name(&self) -> &'static str {
        match self {
            Self::Groq { .. } => "groq",
            Self::Gemini { .. } => "gemini",
        }
    }
}

/// AI completion client holding the ordered provider chain.
#[derive(Debug, Clone)]
pub struct AiClient {
    client: Client,
    providers: Vec<Provider>,
}

impl AiClient {
    /// Per-request timeout towards a provider.
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Build the client from configuration.
    ///
    /// Returns `None` when no provider key is configured; callers answer
    /// without charging in that case.
    #[must_use]
    pub fn from_config(config: &ServiceConfig) -> Option<Self> {
        let mut providers = Vec::new();

        if let Some(api_key) = &config.groq_api_key {
            providers.push(Provider::Groq {
                api_key: api_key.clone(),
                base_url: config.groq_api_url.trim_end_matches('/').to_string(),
                model: config.groq_model.clone(),
            });
        }
        if let Some(api_key) = &config.gemini_api_key {
            providers.push(Provider::Gemini {
                api_key: api_key.clone(),
                base_url: config.gemini_api_url.trim_end_matches('/').to_string(),
                model: config.gemini_model.clone(),
            });
        }

        if providers.is_empty() {
            return None;
        }

        let client = Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .build()
            .ok()?;

        Some(Self { client, providers })
    }

    /// Names of the configured providers, in fallback order.
    #[must_use]
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(Provider::name).collect()
    }

    /// Run a completion through the provider chain.
    ///
    /// # Errors
    ///
    /// Returns the last provider's error when every provider fails.
    pub async fn complete(&self, request: &CompletionRequest) -> Result<String, AiError> {
        let mut last_error = AiError::NotConfigured;

        for provider in &self.providers {
            match self.try_provider(provider, request).await {
                Ok(text) => return Ok(text),
                Err(err) => {
                    tracing::warn!(
                        provider = provider.name(),
                        error = %err,
                        "AI provider failed, falling through"
                    );
                    last_error = err;
                }
            }
        }

        Err(last_error)
    }

    async fn try_provider(
        &self,
        provider: &Provider,
        request: &CompletionRequest,
    ) -> Result<String, AiError> {
        match provider {
            Provider::Groq {
                api_key,
                base_url,
                model,
            } => self.complete_groq(api_key, base_url, model, request).await,
            Provider::Gemini {
                api_key,
                base_url,
                model,
            } => {
                self.complete_gemini(api_key, base_url, model, request)
                    .await
            }
        }
    }

    async fn complete_groq(
        &self,
        api_key: &str,
        base_url: &str,
        model: &str,
        request: &CompletionRequest,
    ) -> Result<String, AiError> {
        let messages = if request.messages.is_empty() {
            let content = match &request.system {
                Some(system) => {
                    format!("{system}\n\n{}", request.prompt.as_deref().unwrap_or_default())
                }
                None => request.prompt.clone().unwrap_or_default(),
            };
            vec![ChatMessage::user(content)]
        } else {
            let mut messages = Vec::with_capacity(request.messages.len() + 1);
            if let Some(system) = &request.system {
                messages.push(ChatMessage::system(system.clone()));
            }
            messages.extend(request.messages.iter().cloned());
            messages
        };

        let response = self
            .client
            .post(format!("{base_url}/openai/v1/chat/completions"))
            .bearer_auth(api_key)
            .json(&GroqChatRequest {
                model: model.to_string(),
                messages,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Api {
                provider: "groq",
                status,
                body,
            });
        }

        let payload: GroqChatResponse = response.json().await?;
        payload
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.is_empty())
            .ok_or(AiError::Empty { provider: "groq" })
    }

    async fn complete_gemini(
        &self,
        api_key: &str,
        base_url: &str,
        model: &str,
        request: &CompletionRequest,
    ) -> Result<String, AiError> {
        let url = format!("{base_url}/v1beta/models/{model}:generateContent?key={api_key}");

        let response = self
            .client
            .post(url)
            .json(&GeminiGenerateRequest {
                contents: vec![GeminiContent {
                    parts: vec![GeminiPart {
                        text: compose_gemini_text(request),
                    }],
                }],
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Api {
                provider: "gemini",
                status,
                body,
            });
        }

        let payload: GeminiGenerateResponse = response.json().await?;
        payload
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .filter(|text| !text.is_empty())
            .ok_or(AiError::Empty { provider: "gemini" })
    }
}

/// Flatten a completion request into the single text block Gemini expects.
fn compose_gemini_text(request: &CompletionRequest) -> String {
    let mut out = String::new();

    if let Some(system) = &request.system {
        out.push_str("System instruction:\n");
        out.push_str(system);
        out.push_str("\n\n");
    }

    if request.messages.is_empty() {
        out.push_str(request.prompt.as_deref().unwrap_or_default());
    } else {
        let transcript: Vec<String> = request
            .messages
            .iter()
            .map(|message| {
                let speaker = if message.role == "user" {
                    "User"
                } else {
                    "Assistant"
                };
                format!("{speaker}: {}", message.content)
            })
            .collect();
        out.push_str(&transcript.join("\n\n"));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_with(groq: Option<&MockServer>, gemini: Option<&MockServer>) -> ServiceConfig {
        ServiceConfig {
            groq_api_key: groq.map(|_| "groq-test-key".into()),
            groq_api_url: groq.map_or_else(|| "http://127.0.0.1:1".into(), MockServer::uri),
            gemini_api_key: gemini.map(|_| "gemini-test-key".into()),
            gemini_api_url: gemini.map_or_else(|| "http://127.0.0.1:1".into(), MockServer::uri),
            ..ServiceConfig::default()
        }
    }

    fn groq_reply(text: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": text } }]
        }))
    }

    #[test]
    fn unconfigured_client_is_absent() {
        assert!(AiClient::from_config(&ServiceConfig::default()).is_none());
    }

    #[test]
    fn provider_order_is_groq_then_gemini() {
        let config = ServiceConfig {
            groq_api_key: Some("k1".into()),
            gemini_api_key: Some("k2".into()),
            ..ServiceConfig::default()
        };
        let client = AiClient::from_config(&config).unwrap();
        assert_eq!(client.provider_names(), vec!["groq", "gemini"]);
    }

    #[test]
    fn gemini_text_flattens_system_and_transcript() {
        let request = CompletionRequest::conversation(vec![
            ChatMessage::user("halo"),
            ChatMessage {
                role: "assistant".into(),
                content: "hai".into(),
            },
        ])
        .with_system("Kamu adalah asisten.");

        let text = compose_gemini_text(&request);
        assert_eq!(
            text,
            "System instruction:\nKamu adalah asisten.\n\nUser: halo\n\nAssistant: hai"
        );
    }

    #[tokio::test]
    async fn groq_success_returns_text() {
        let groq = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/openai/v1/chat/completions"))
            .respond_with(groq_reply("hi there"))
            .expect(1)
            .mount(&groq)
            .await;

        let client = AiClient::from_config(&config_with(Some(&groq), None)).unwrap();
        let reply = client
            .complete(&CompletionRequest::prompt("hello"))
            .await
            .unwrap();
        assert_eq!(reply, "hi there");
    }

    #[tokio::test]
    async fn groq_failure_falls_through_to_gemini() {
        let groq = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/openai/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&groq)
            .await;

        let gemini = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [{ "text": "dari gemini" }] } }]
            })))
            .expect(1)
            .mount(&gemini)
            .await;

        let client = AiClient::from_config(&config_with(Some(&groq), Some(&gemini))).unwrap();
        let reply = client
            .complete(&CompletionRequest::prompt("hello"))
            .await
            .unwrap();
        assert_eq!(reply, "dari gemini");
    }

    #[tokio::test]
    async fn empty_groq_payload_counts_as_failure() {
        let groq = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/openai/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&groq)
            .await;

        let client = AiClient::from_config(&config_with(Some(&groq), None)).unwrap();
        let err = client
            .complete(&CompletionRequest::prompt("hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::Empty { provider: "groq" }));
    }

    #[tokio::test]
    async fn all_providers_failing_propagates_last_error() {
        let groq = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/openai/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&groq)
            .await;

        let gemini = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&gemini)
            .await;

        let client = AiClient::from_config(&config_with(Some(&groq), Some(&gemini))).unwrap();
        let err = client
            .complete(&CompletionRequest::prompt("hello"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AiError::Api {
                provider: "gemini",
                status: 503,
                ..
            }
        ));
    }
}
