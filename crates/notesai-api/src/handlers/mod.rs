//! HTTP handlers for notesai-api.

pub mod ai;
pub mod system;
