//! # notesai-client
//!
//! Client-side state for NotesAI.
//!
//! This crate provides:
//! - [`NoteCache`]: remote-then-apply mirror of the owner's notes
//! - [`SessionStore`]: current identity and the session-change listener
//! - [`NotesApp`]: the application state object wiring both to an AI assistant
//! - [`GoTrueClient`]: a GoTrue-compatible [`IdentityService`]
//! - [`AiEndpointClient`]: an [`AiAssistant`] over the server's AI endpoints
//!
//! ## Example
//!
//! ```rust,ignore
//! use notesai_client::{ClientConfig, Credentials, NotesApp, NoteDraft, NoteColor};
//!
//! let app = NotesApp::connect(ClientConfig::from_env()).await?;
//! app.initialize().await?;
//! app.sign_in(&Credentials::new("me@example.com", "hunter22")).await?;
//! app.add_note(NoteDraft::new("Groceries", "milk", NoteColor::Yellow)).await?;
//! ```

pub mod ai_client;
pub mod app;
pub mod cache;
pub mod gotrue;
pub mod session;

// Re-export core types
pub use notesai_core::*;

pub use ai_client::AiEndpointClient;
pub use app::{ClientConfig, NotesApp};
pub use cache::NoteCache;
pub use gotrue::{GoTrueClient, GoTrueConfig};
pub use session::{SessionStore, SessionSubscription};
