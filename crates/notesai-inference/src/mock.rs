//! Mock completion backend for deterministic testing.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use notesai_inference::mock::MockCompletionBackend;
//!
//! let backend = MockCompletionBackend::new().with_fixed_response("A short note.");
//! let gateway = AiGateway::new(Arc::new(backend.clone()));
//! gateway.generate("topic").await?;
//! assert_eq!(backend.call_count(), 1);
//! ```

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use notesai_core::{CompletionBackend, CompletionRequest, Error, Result};

/// Records every request and replies with a canned response or failure.
#[derive(Clone)]
pub struct MockCompletionBackend {
    response: String,
    failure: Option<String>,
    latency: Duration,
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockCompletionBackend {
    pub fn new() -> Self {
        Self {
            response: "Mock response".to_string(),
            failure: None,
            latency: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the text returned for every request.
    pub fn with_fixed_response(mut self, response: impl Into<String>) -> Self {
        self.response = response.into();
        self
    }

    /// Fail every request with a `Generation` error.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Delay each reply, for ordering tests.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Requests received so far.
    pub fn calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Default for MockCompletionBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionBackend for MockCompletionBackend {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        self.calls.lock().unwrap().push(request);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        match &self.failure {
            Some(message) => Err(Error::Generation(message.clone())),
            None => Ok(self.response.clone()),
        }
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}
