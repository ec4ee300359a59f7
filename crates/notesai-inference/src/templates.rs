//! Prompt templates for the three AI operations.
//!
//! Each template pairs a fixed system instruction with a token budget and
//! temperature; the user message is built from the caller's input.

use notesai_core::{CompletionRequest, NoteExcerpt};

/// Separator placed between notes in the answer context.
pub const NOTE_SEPARATOR: &str = "\n\n---\n\n";

/// Fixed instruction and sampling parameters for one operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PromptTemplate {
    pub system: &'static str,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl PromptTemplate {
    /// Pair this template with a user message.
    pub fn request(&self, user: String) -> CompletionRequest {
        CompletionRequest {
            system: self.system.to_string(),
            user,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

pub const GENERATE: PromptTemplate = PromptTemplate {
    system: "You are a helpful assistant that creates notes in plain text only. \
             No markdown, no formatting. Keep the note simple, clear, and under 100 words.",
    max_tokens: 1000,
    temperature: 0.6,
};

pub const ENHANCE: PromptTemplate = PromptTemplate {
    system: "You are an expert editor. Rewrite the note to improve clarity and structure \
             using plain text only (no markdown, no formatting). Keep it under 100 words.",
    max_tokens: 1000,
    temperature: 0.4,
};

pub const ANSWER: PromptTemplate = PromptTemplate {
    system: "You are a helpful assistant. Answer the user's question briefly using the \
             provided notes only. Keep the answer clear, plain, and under 250 words. \
             If the answer cannot be found in the notes, say so.",
    max_tokens: 1000,
    temperature: 0.5,
};

pub fn generate_request(prompt: &str) -> CompletionRequest {
    GENERATE.request(format!("Write a plain text note about: {}", prompt))
}

pub fn enhance_request(content: &str) -> CompletionRequest {
    ENHANCE.request(format!("Please enhance this note:\n\n{}", content))
}

pub fn answer_request(question: &str, notes: &[NoteExcerpt]) -> CompletionRequest {
    ANSWER.request(format!(
        "Notes:\n\n{}\n\nQuestion: {}",
        notes_context(notes),
        question
    ))
}

/// Render notes as the answer context, in the order given.
pub fn notes_context(notes: &[NoteExcerpt]) -> String {
    notes
        .iter()
        .map(|n| format!("Title: {}\nContent: {}", n.title, n.content))
        .collect::<Vec<_>>()
        .join(NOTE_SEPARATOR)
}
