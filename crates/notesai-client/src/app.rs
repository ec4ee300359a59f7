//! Application state object.
//!
//! [`NotesApp`] owns the session store, the note cache, the filter criteria
//! and the AI assistant. Collaborators are injected, so tests can swap any of
//! them for in-process fakes.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use notesai_core::{
    title_from_prompt, AiAssistant, ColorFilter, Credentials, Error, FilterCriteria, Identity,
    IdentityService, Note, NoteColor, NoteDraft, NotePatch, NoteRepository, Result, Session,
};
use notesai_db::{open_note_repository, PoolConfig, MEMORY_DATABASE_URL};

use crate::ai_client::{AiEndpointClient, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS};
use crate::cache::NoteCache;
use crate::gotrue::{GoTrueClient, GoTrueConfig};
use crate::session::SessionStore;

/// Settings for wiring a [`NotesApp`] from the environment.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// `memory` or a PostgreSQL URL.
    pub database_url: String,
    pub pool: PoolConfig,
    pub gotrue: GoTrueConfig,
    /// Base URL of the NotesAI server hosting `/api/ai/*`.
    pub api_url: String,
    pub ai_timeout_seconds: u64,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| MEMORY_DATABASE_URL.to_string()),
            pool: PoolConfig::from_env(),
            gotrue: GoTrueConfig::from_env(),
            api_url: std::env::var("NOTESAI_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            ai_timeout_seconds: std::env::var("NOTESAI_AI_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Explicit application state, injected with its services.
pub struct NotesApp {
    cache: Arc<NoteCache>,
    session: SessionStore,
    ai: Arc<dyn AiAssistant>,
    criteria: RwLock<FilterCriteria>,
}

impl NotesApp {
    pub fn new(
        identity: Arc<dyn IdentityService>,
        repo: Arc<dyn NoteRepository>,
        ai: Arc<dyn AiAssistant>,
    ) -> Self {
        let cache = Arc::new(NoteCache::new(repo));
        Self {
            session: SessionStore::new(identity, cache.clone()),
            cache,
            ai,
            criteria: RwLock::new(FilterCriteria::default()),
        }
    }

    /// Wire the GoTrue client, the configured repository and the HTTP AI
    /// client.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        let identity = Arc::new(GoTrueClient::new(config.gotrue)?);
        let repo = open_note_repository(&config.database_url, config.pool).await?;
        let ai = Arc::new(AiEndpointClient::new(
            config.api_url,
            Duration::from_secs(config.ai_timeout_seconds),
        )?);
        Ok(Self::new(identity, repo, ai))
    }

    pub fn cache(&self) -> &NoteCache {
        &self.cache
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    // -------------------------------------------------------------------------
    // Session
    // -------------------------------------------------------------------------

    /// Resolve the existing session and start following session changes.
    pub async fn initialize(&self) -> Result<()> {
        self.session.initialize().await
    }

    pub async fn identity(&self) -> Option<Identity> {
        self.session.identity().await
    }

    pub fn is_auth_loading(&self) -> bool {
        self.session.is_loading()
    }

    pub fn is_loading_notes(&self) -> bool {
        self.cache.is_loading()
    }

    pub async fn sign_in(&self, credentials: &Credentials) -> Result<Session> {
        credentials.validate()?;
        self.session
            .sign_in(credentials.email.trim(), &credentials.password)
            .await
    }

    pub async fn sign_up(&self, credentials: &Credentials) -> Result<Option<Session>> {
        credentials.validate()?;
        self.session
            .sign_up(credentials.email.trim(), &credentials.password)
            .await
    }

    pub async fn sign_out(&self) -> Result<()> {
        self.session.sign_out().await
    }

    // -------------------------------------------------------------------------
    // Notes
    // -------------------------------------------------------------------------

    pub async fn notes(&self) -> Vec<Note> {
        self.cache.snapshot().await
    }

    /// Fetch the signed-in owner's notes again.
    pub async fn refresh(&self) -> Result<()> {
        let identity = self.identity().await.ok_or(Error::Unauthenticated)?;
        self.cache.reload(identity.id).await
    }

    pub async fn add_note(&self, draft: NoteDraft) -> Result<Note> {
        draft.validate()?;
        self.cache.add(draft.normalized()).await
    }

    pub async fn update_note(&self, id: Uuid, patch: NotePatch) -> Result<()> {
        self.cache.update(id, patch).await
    }

    /// Save from the edit dialog: title, content and color together.
    pub async fn edit_note(
        &self,
        id: Uuid,
        title: &str,
        content: &str,
        color: NoteColor,
    ) -> Result<()> {
        NoteDraft::new(title, content, color).validate()?;
        self.cache
            .update(id, NotePatch::edit(title, content, color))
            .await
    }

    /// Flip the pin flag of a cached note.
    pub async fn toggle_pin(&self, id: Uuid) -> Result<()> {
        let note = self
            .cache
            .get(id)
            .await
            .ok_or_else(|| Error::Repository(format!("Note {} not found", id)))?;
        self.cache
            .update(id, NotePatch::pinned(!note.is_pinned))
            .await
    }

    pub async fn delete_note(&self, id: Uuid) -> Result<()> {
        self.cache.delete(id).await
    }

    // -------------------------------------------------------------------------
    // Filtering
    // -------------------------------------------------------------------------

    pub async fn set_search_query(&self, query: impl Into<String>) {
        self.criteria.write().await.search_query = query.into();
    }

    pub async fn set_selected_color(&self, color: ColorFilter) {
        self.criteria.write().await.selected_color = color;
    }

    pub async fn criteria(&self) -> FilterCriteria {
        self.criteria.read().await.clone()
    }

    /// Cached notes passing the current criteria, in cache order.
    pub async fn filtered_notes(&self) -> Vec<Note> {
        let criteria = self.criteria().await;
        self.cache.filtered(&criteria).await
    }

    // -------------------------------------------------------------------------
    // AI
    // -------------------------------------------------------------------------

    pub async fn generate_note(&self, prompt: &str) -> Result<String> {
        self.ai.generate(prompt).await
    }

    /// Generate a body for `prompt` and package it as a draft titled after
    /// the prompt. Nothing is saved.
    pub async fn draft_from_prompt(&self, prompt: &str, color: NoteColor) -> Result<NoteDraft> {
        let content = self.ai.generate(prompt).await?;
        Ok(NoteDraft::new(title_from_prompt(prompt), content, color))
    }

    pub async fn enhance_note(&self, content: &str) -> Result<String> {
        self.ai.enhance(content).await
    }

    /// Enhanced content, or `content` unchanged if enhancement fails.
    pub async fn enhance_or_keep(&self, content: &str) -> String {
        match self.ai.enhance(content).await {
            Ok(enhanced) => enhanced,
            Err(e) => {
                warn!(
                    subsystem = "client",
                    component = "app",
                    op = "enhance",
                    error = %e,
                    "Enhancement failed; keeping original content"
                );
                content.to_string()
            }
        }
    }

    /// Answer `question` from every cached note, regardless of filters.
    pub async fn answer_question(&self, question: &str) -> Result<String> {
        let notes = self.cache.excerpts().await;
        debug!(
            subsystem = "client",
            component = "app",
            op = "answer",
            result_count = notes.len(),
            "Answering from cached notes"
        );
        self.ai.answer(question, &notes).await
    }
}
