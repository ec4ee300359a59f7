//! Shared handler state.

use std::sync::Arc;

use notesai_core::AiAssistant;

use crate::config::GlobalRateLimiter;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub assistant: Arc<dyn AiAssistant>,
    /// Model identifier reported by `/health`.
    pub model: String,
    /// Global rate limiter (None if rate limiting is disabled).
    pub rate_limiter: Option<Arc<GlobalRateLimiter>>,
}

impl AppState {
    pub fn new(assistant: Arc<dyn AiAssistant>, model: impl Into<String>) -> Self {
        Self {
            assistant,
            model: model.into(),
            rate_limiter: None,
        }
    }

    pub fn with_rate_limiter(mut self, limiter: Option<Arc<GlobalRateLimiter>>) -> Self {
        self.rate_limiter = limiter;
        self
    }
}
