//! OpenAI-compatible completion backend.
//!
//! Works with any endpoint speaking the chat-completions protocol. The
//! defaults target OpenRouter, which also reads the optional `HTTP-Referer`
//! and `X-Title` attribution headers.
//!
//! # Example
//!
//! ```rust,no_run
//! use notesai_core::{CompletionBackend, CompletionRequest};
//! use notesai_inference::openai::{OpenAIBackend, OpenAIConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = OpenAIConfig {
//!         base_url: "http://localhost:11434/v1".to_string(),
//!         api_key: None,
//!         gen_model: "llama3".to_string(),
//!         ..Default::default()
//!     };
//!     let backend = OpenAIBackend::new(config).unwrap();
//!
//!     let text = backend
//!         .complete(CompletionRequest {
//!             system: "Answer briefly.".to_string(),
//!             user: "What is a note?".to_string(),
//!             max_tokens: 200,
//!             temperature: 0.5,
//!         })
//!         .await
//!         .unwrap();
//!     println!("{text}");
//! }
//! ```

mod backend;
mod error;
mod types;

pub use backend::{
    OpenAIBackend, OpenAIConfig, DEFAULT_GEN_MODEL, DEFAULT_OPENAI_URL, DEFAULT_TIMEOUT_SECS,
    DEFAULT_X_TITLE,
};
pub use error::{to_notesai_error, OpenAIErrorCode};
pub use types::*;
