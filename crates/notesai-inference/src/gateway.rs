//! In-process AI gateway.
//!
//! Validates input, renders the prompt template, runs one completion and
//! cleans the output. Validation failures never reach the backend.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, warn};

use notesai_core::{AiAssistant, CompletionBackend, CompletionRequest, Error, NoteExcerpt, Result};

use crate::templates;
use crate::thinking::strip_thinking;

pub const PROMPT_REQUIRED: &str = "Prompt is required";
pub const CONTENT_REQUIRED: &str = "Missing note content.";
pub const QUESTION_REQUIRED: &str = "Question is required";
pub const NOTES_REQUIRED: &str = "At least one note is required";

/// [`AiAssistant`] backed directly by a [`CompletionBackend`].
#[derive(Clone)]
pub struct AiGateway {
    backend: Arc<dyn CompletionBackend>,
}

impl AiGateway {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self { backend }
    }

    /// Model identifier of the underlying backend.
    pub fn model_name(&self) -> &str {
        self.backend.model_name()
    }

    async fn run(&self, op: &'static str, request: CompletionRequest) -> Result<String> {
        let start = Instant::now();
        let raw = self.backend.complete(request).await.map_err(|e| {
            warn!(
                subsystem = "inference",
                component = "gateway",
                op,
                error = %e,
                "Completion failed"
            );
            e
        })?;

        let text = strip_thinking(&raw).trim().to_string();
        if text.is_empty() {
            warn!(
                subsystem = "inference",
                component = "gateway",
                op,
                "Completion returned no usable text"
            );
            return Err(Error::Generation("Empty response from model".to_string()));
        }

        debug!(
            subsystem = "inference",
            component = "gateway",
            op,
            model = %self.backend.model_name(),
            response_len = text.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "AI operation complete"
        );
        Ok(text)
    }
}

/// Reject a blank required field with `message`.
pub fn require(value: &str, message: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(message));
    }
    Ok(())
}

/// Input check for `answer`: a question and at least one note.
pub fn validate_answer_input(question: &str, notes: &[NoteExcerpt]) -> Result<()> {
    require(question, QUESTION_REQUIRED)?;
    if notes.is_empty() {
        return Err(Error::validation(NOTES_REQUIRED));
    }
    Ok(())
}

#[async_trait]
impl AiAssistant for AiGateway {
    async fn generate(&self, prompt: &str) -> Result<String> {
        require(prompt, PROMPT_REQUIRED)?;
        self.run("generate", templates::generate_request(prompt.trim()))
            .await
    }

    async fn enhance(&self, content: &str) -> Result<String> {
        require(content, CONTENT_REQUIRED)?;
        self.run("enhance", templates::enhance_request(content))
            .await
    }

    async fn answer(&self, question: &str, notes: &[NoteExcerpt]) -> Result<String> {
        validate_answer_input(question, notes)?;
        debug!(
            subsystem = "inference",
            component = "gateway",
            op = "answer",
            result_count = notes.len(),
            "Answering from notes"
        );
        self.run("answer", templates::answer_request(question.trim(), notes))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockCompletionBackend;

    fn gateway(mock: &MockCompletionBackend) -> AiGateway {
        AiGateway::new(Arc::new(mock.clone()))
    }

    #[tokio::test]
    async fn test_blank_prompt_rejected_without_call() {
        let mock = MockCompletionBackend::new();
        let err = gateway(&mock).generate("   ").await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), format!("Validation error: {}", PROMPT_REQUIRED));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_enhance_empty_rejected_without_call() {
        let mock = MockCompletionBackend::new();
        let err = gateway(&mock).enhance("").await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_answer_without_notes_rejected_without_call() {
        let mock = MockCompletionBackend::new();
        let err = gateway(&mock)
            .answer("What is the capital?", &[])
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains(NOTES_REQUIRED));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_answer_blank_question_rejected() {
        let mock = MockCompletionBackend::new();
        let notes = vec![NoteExcerpt {
            title: "t".to_string(),
            content: "c".to_string(),
        }];
        let err = gateway(&mock).answer(" ", &notes).await.unwrap_err();
        assert!(err.to_string().contains(QUESTION_REQUIRED));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_generate_trims_and_strips_reasoning() {
        let mock = MockCompletionBackend::new()
            .with_fixed_response("<think>plan it</think>\n  Pack light.  \n");
        let text = gateway(&mock).generate("packing").await.unwrap();
        assert_eq!(text, "Pack light.");

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].user, "Write a plain text note about: packing");
        assert_eq!(calls[0].temperature, 0.6);
    }

    #[tokio::test]
    async fn test_empty_output_is_generation_error() {
        let mock = MockCompletionBackend::new().with_fixed_response("   ");
        let err = gateway(&mock).enhance("draft").await.unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
    }

    #[tokio::test]
    async fn test_backend_failure_propagates() {
        let mock = MockCompletionBackend::new().failing("upstream down");
        let err = gateway(&mock).generate("topic").await.unwrap_err();
        assert!(matches!(err, Error::Generation(ref m) if m == "upstream down"));
    }

    #[tokio::test]
    async fn test_answer_sends_notes_in_order() {
        let mock = MockCompletionBackend::new().with_fixed_response("In May.");
        let notes = vec![
            NoteExcerpt {
                title: "Trip".to_string(),
                content: "Paris in May".to_string(),
            },
            NoteExcerpt {
                title: "Work".to_string(),
                content: "Quarterly review".to_string(),
            },
        ];
        let text = gateway(&mock).answer("When is the trip?", &notes).await.unwrap();
        assert_eq!(text, "In May.");

        let user = &mock.calls()[0].user;
        let trip = user.find("Title: Trip").unwrap();
        let work = user.find("Title: Work").unwrap();
        assert!(trip < work);
        assert!(user.ends_with("Question: When is the trip?"));
    }
}
