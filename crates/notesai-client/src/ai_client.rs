//! HTTP client for the server's `/api/ai/*` endpoints.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use notesai_core::{AiAssistant, Error, NoteExcerpt, Result};
use notesai_inference::{require, validate_answer_input, CONTENT_REQUIRED, PROMPT_REQUIRED};

/// Default server address for local development.
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Default timeout in seconds. Completions can be slow.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Serialize)]
struct GenerateBody<'a> {
    prompt: &'a str,
}

#[derive(Debug, Serialize)]
struct EnhanceBody<'a> {
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct AnswerBody<'a> {
    question: &'a str,
    notes: &'a [NoteExcerpt],
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    content: String,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error: Option<String>,
}

/// [`AiAssistant`] that delegates to a NotesAI server over HTTP.
///
/// Input is validated locally first, so blank input never leaves the client.
pub struct AiEndpointClient {
    client: Client,
    base_url: String,
}

impl AiEndpointClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Create from `NOTESAI_API_URL`.
    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var("NOTESAI_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::new(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B: Serialize + ?Sized>(&self, op: &'static str, body: &B) -> Result<String> {
        let url = format!("{}/api/ai/{}", self.base_url.trim_end_matches('/'), op);
        debug!(subsystem = "client", component = "ai_client", op, "Calling AI endpoint");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Generation(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorResponse>()
                .await
                .unwrap_or_default()
                .error
                .unwrap_or_else(|| format!("Server returned {}", status));
            warn!(
                subsystem = "client",
                component = "ai_client",
                op,
                status = status.as_u16(),
                error = %message,
                "AI endpoint failed"
            );
            return Err(if status == StatusCode::BAD_REQUEST {
                Error::Validation(message)
            } else {
                Error::Generation(message)
            });
        }

        let body: ContentResponse = response
            .json()
            .await
            .map_err(|e| Error::Generation(format!("Failed to parse response: {}", e)))?;
        let content = body.content.trim().to_string();
        if content.is_empty() {
            return Err(Error::Generation("Empty response from model".to_string()));
        }
        Ok(content)
    }
}

#[async_trait]
impl AiAssistant for AiEndpointClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        require(prompt, PROMPT_REQUIRED)?;
        self.post("generate", &GenerateBody { prompt }).await
    }

    async fn enhance(&self, content: &str) -> Result<String> {
        require(content, CONTENT_REQUIRED)?;
        self.post("enhance", &EnhanceBody { content }).await
    }

    async fn answer(&self, question: &str, notes: &[NoteExcerpt]) -> Result<String> {
        validate_answer_input(question, notes)?;
        self.post("answer", &AnswerBody { question, notes }).await
    }
}
