//! In-process note repository.
//!
//! Mirrors the PostgreSQL repository's contract (owner scoping, store-assigned
//! ids and timestamps, pinned-then-newest ordering) without a database. Used
//! by tests and by the `DATABASE_URL=memory` development mode.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use notesai_core::{Error, Note, NoteDraft, NotePatch, NoteRepository, Result};

#[derive(Default)]
struct Rows {
    notes: Vec<Note>,
    last_created_at: Option<DateTime<Utc>>,
}

/// Note repository backed by a `Vec` behind an async lock.
#[derive(Default)]
pub struct MemoryNoteRepository {
    rows: RwLock<Rows>,
}

impl MemoryNoteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored notes across all owners.
    pub async fn len(&self) -> usize {
        self.rows.read().await.notes.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl NoteRepository for MemoryNoteRepository {
    async fn insert(&self, owner_id: Uuid, draft: NoteDraft) -> Result<Note> {
        let draft = draft.normalized();
        let mut rows = self.rows.write().await;

        // Keep creation timestamps strictly increasing so ordering is stable.
        let mut now = Utc::now();
        if let Some(last) = rows.last_created_at {
            if now <= last {
                now = last + Duration::microseconds(1);
            }
        }
        rows.last_created_at = Some(now);

        let note = Note {
            id: Uuid::now_v7(),
            owner_id,
            title: draft.title,
            content: draft.content,
            color: draft.color,
            is_pinned: draft.is_pinned,
            created_at: now,
            updated_at: now,
        };
        rows.notes.push(note.clone());
        Ok(note)
    }

    async fn update(&self, owner_id: Uuid, id: Uuid, patch: &NotePatch) -> Result<()> {
        let mut rows = self.rows.write().await;
        let note = rows
            .notes
            .iter_mut()
            .find(|n| n.id == id && n.owner_id == owner_id)
            .ok_or_else(|| Error::Repository(format!("Note {} not found", id)))?;

        if !patch.is_empty() {
            note.apply(patch);
            note.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<()> {
        let mut rows = self.rows.write().await;
        let before = rows.notes.len();
        rows.notes.retain(|n| !(n.id == id && n.owner_id == owner_id));
        if rows.notes.len() == before {
            return Err(Error::Repository(format!("Note {} not found", id)));
        }
        Ok(())
    }

    async fn fetch_all(&self, owner_id: Uuid) -> Result<Vec<Note>> {
        let rows = self.rows.read().await;
        let mut notes: Vec<Note> = rows
            .notes
            .iter()
            .filter(|n| n.owner_id == owner_id)
            .cloned()
            .collect();
        notes.sort_by(|a, b| {
            b.is_pinned
                .cmp(&a.is_pinned)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(notes)
    }
}
