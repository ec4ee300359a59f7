//! OpenAI-compatible completion backend implementation.

use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use notesai_core::{CompletionBackend, CompletionRequest, Error, Result};

use super::error::{to_notesai_error, OpenAIErrorCode};
use super::types::*;

/// Default endpoint (OpenRouter's OpenAI-compatible API).
pub const DEFAULT_OPENAI_URL: &str = "https://openrouter.ai/api/v1";

/// Default generation model.
pub const DEFAULT_GEN_MODEL: &str = "deepseek/deepseek-r1-0528:free";

/// Default timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default `X-Title` header identifying the app on OpenRouter.
pub const DEFAULT_X_TITLE: &str = "NoteAI";

/// Configuration for the OpenAI-compatible backend.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// Base URL for the API endpoint.
    pub base_url: String,
    /// API key for authentication (optional for local endpoints).
    pub api_key: Option<String>,
    /// Model to use for generation.
    pub gen_model: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
    /// Skip TLS verification (for self-signed certs in local environments).
    pub skip_tls_verify: bool,
    /// HTTP-Referer header for OpenRouter.ai rankings (optional).
    pub http_referer: Option<String>,
    /// X-Title header for app name on OpenRouter.ai (optional).
    pub x_title: Option<String>,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OPENAI_URL.to_string(),
            api_key: None,
            gen_model: DEFAULT_GEN_MODEL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            skip_tls_verify: false,
            http_referer: None,
            x_title: Some(DEFAULT_X_TITLE.to_string()),
        }
    }
}

impl OpenAIConfig {
    /// Load configuration from environment variables.
    ///
    /// `OPENROUTER_API_KEY` is accepted as a fallback for `OPENAI_API_KEY`.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_OPENAI_URL.to_string()),
            api_key: std::env::var("OPENAI_API_KEY")
                .or_else(|_| std::env::var("OPENROUTER_API_KEY"))
                .ok()
                .filter(|k| !k.trim().is_empty()),
            gen_model: std::env::var("OPENAI_GEN_MODEL")
                .unwrap_or_else(|_| DEFAULT_GEN_MODEL.to_string()),
            timeout_seconds: std::env::var("OPENAI_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            skip_tls_verify: std::env::var("OPENAI_SKIP_TLS_VERIFY")
                .map(|v| v == "1" || v.to_lowercase() == "true")
                .unwrap_or(false),
            http_referer: std::env::var("OPENAI_HTTP_REFERER").ok(),
            x_title: Some(
                std::env::var("OPENAI_X_TITLE").unwrap_or_else(|_| DEFAULT_X_TITLE.to_string()),
            ),
        }
    }
}

/// OpenAI-compatible completion backend.
pub struct OpenAIBackend {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIBackend {
    /// Create a new OpenAI backend with the given configuration.
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        let mut client_builder =
            Client::builder().timeout(Duration::from_secs(config.timeout_seconds));

        if config.skip_tls_verify {
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        let client = client_builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        if config.api_key.is_none() {
            warn!(
                subsystem = "inference",
                "No API key configured; requests will be sent unauthenticated"
            );
        }

        info!(
            subsystem = "inference",
            url = %config.base_url,
            model = %config.gen_model,
            "Initializing OpenAI backend"
        );

        Ok(Self { client, config })
    }

    /// Create with default configuration.
    pub fn with_defaults() -> Result<Self> {
        Self::new(OpenAIConfig::default())
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(OpenAIConfig::from_env())
    }

    /// Get the current configuration.
    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    /// Build a request with authentication if configured.
    fn build_request(&self, endpoint: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint);
        let mut req = self.client.post(&url);

        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        // OpenRouter attribution headers
        if let Some(ref referer) = self.config.http_referer {
            req = req.header("HTTP-Referer", referer);
        }

        if let Some(ref title) = self.config.x_title {
            req = req.header("X-Title", title);
        }

        req.header("Content-Type", "application/json")
    }
}

#[async_trait]
impl CompletionBackend for OpenAIBackend {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let start = Instant::now();
        debug!(
            subsystem = "inference",
            op = "complete",
            model = %self.config.gen_model,
            prompt_len = request.user.len(),
            "Sending chat completion"
        );

        let mut messages = Vec::with_capacity(2);
        if !request.system.is_empty() {
            messages.push(ChatMessage::system(request.system));
        }
        messages.push(ChatMessage::user(request.user));

        let body = ChatCompletionRequest {
            model: self.config.gen_model.clone(),
            messages,
            temperature: Some(request.temperature),
            max_tokens: Some(request.max_tokens),
        };

        let response = self
            .build_request("/chat/completions")
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Generation(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body: OpenAIErrorResponse = response.json().await.unwrap_or(OpenAIErrorResponse {
                error: OpenAIError {
                    message: "Unknown error".to_string(),
                    error_type: None,
                    code: None,
                },
            });
            let code = OpenAIErrorCode::from_response(
                status.as_u16(),
                body.error.error_type.as_deref().unwrap_or(""),
            );
            warn!(
                subsystem = "inference",
                op = "complete",
                status = status.as_u16(),
                error = %body.error.message,
                "Completion service returned an error"
            );
            return Err(to_notesai_error(code, &body.error.message));
        }

        let result: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::Generation(format!("Failed to parse response: {}", e)))?;

        let content = result
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        debug!(
            subsystem = "inference",
            op = "complete",
            response_len = content.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Completion finished"
        );
        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.config.gen_model
    }
}
