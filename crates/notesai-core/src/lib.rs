//! # notesai-core
//!
//! Core types, traits, and abstractions for NotesAI.
//!
//! This crate provides the domain model (notes, identities, sessions), the
//! error taxonomy shared by every other crate, the service traits that the
//! storage, identity, and completion backends implement, and the pure
//! filter engine used to derive the visible note list.

pub mod error;
pub mod events;
pub mod filter;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use events::{AuthEventBus, AuthEventReceiver};
pub use filter::{filter_notes, matches_color, matches_search, ColorFilter, FilterCriteria};
pub use models::*;
pub use traits::*;
