//! # notesai-inference
//!
//! Completion backend and AI gateway for NotesAI.
//!
//! This crate provides:
//! - An OpenAI-compatible [`CompletionBackend`] (OpenRouter by default)
//! - Prompt templates for generate / enhance / answer
//! - [`AiGateway`], the in-process [`AiAssistant`]
//! - Reasoning-block removal for thinking models
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use notesai_inference::{AiAssistant, AiGateway, OpenAIBackend};
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = OpenAIBackend::from_env().unwrap();
//!     let gateway = AiGateway::new(Arc::new(backend));
//!     let note = gateway.generate("weekend hiking checklist").await.unwrap();
//!     println!("{note}");
//! }
//! ```

pub mod gateway;
pub mod openai;
pub mod templates;
pub mod thinking;

// Mock completion backend for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export core types
pub use notesai_core::*;

pub use gateway::{
    require, validate_answer_input, AiGateway, CONTENT_REQUIRED, NOTES_REQUIRED,
    PROMPT_REQUIRED, QUESTION_REQUIRED,
};
pub use openai::{OpenAIBackend, OpenAIConfig};
pub use templates::PromptTemplate;
