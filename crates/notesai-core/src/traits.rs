//! Core traits for NotesAI abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and testability.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::events::AuthEventReceiver;
use crate::models::*;

// =============================================================================
// NOTE REPOSITORY
// =============================================================================

/// Repository for note CRUD operations against the durable store.
///
/// Every operation is scoped to an owner; rows belonging to other owners
/// are never read or written.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Insert a new note owned by `owner_id`, returning the stored row.
    async fn insert(&self, owner_id: Uuid, draft: NoteDraft) -> Result<Note>;

    /// Apply a partial patch. Fails if no row with this id belongs to the owner.
    async fn update(&self, owner_id: Uuid, id: Uuid, patch: &NotePatch) -> Result<()>;

    /// Delete a note. Fails if no row with this id belongs to the owner.
    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<()>;

    /// All notes of the owner, pinned first, then newest first.
    async fn fetch_all(&self, owner_id: Uuid) -> Result<Vec<Note>>;
}

// =============================================================================
// IDENTITY SERVICE
// =============================================================================

/// External identity provider: password auth plus session notifications.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Sign in with email and password.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session>;

    /// Register a new account. Returns the session when the provider signs
    /// the user in immediately (no email confirmation step).
    async fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>>;

    /// End the current session.
    async fn sign_out(&self) -> Result<()>;

    /// The current session, if any.
    async fn get_session(&self) -> Result<Option<Session>>;

    /// Subscribe to session-change events.
    fn subscribe(&self) -> AuthEventReceiver;
}

// =============================================================================
// COMPLETION SERVICE
// =============================================================================

/// A single templated chat-completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Backend for the hosted completion service.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Run one completion round trip and return the raw generated text.
    async fn complete(&self, request: CompletionRequest) -> Result<String>;

    /// Model identifier sent with each request.
    fn model_name(&self) -> &str;
}

// =============================================================================
// AI ASSISTANT
// =============================================================================

/// The three note-level AI operations.
///
/// Implemented by the in-process gateway (direct completion calls) and by
/// the HTTP client that calls the server's AI endpoints.
#[async_trait]
pub trait AiAssistant: Send + Sync {
    /// Produce a new note body about `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Rewrite `content` for clarity.
    async fn enhance(&self, content: &str) -> Result<String>;

    /// Answer `question` using only `notes`.
    async fn answer(&self, question: &str, notes: &[NoteExcerpt]) -> Result<String>;
}
