//! Note repository implementation.

use std::time::Instant;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::debug;
use uuid::Uuid;

use notesai_core::{Error, Note, NoteDraft, NotePatch, NoteRepository, Result};

const NOTE_COLUMNS: &str = "id, user_id, title, content, color, is_pinned, created_at, updated_at";

/// PostgreSQL implementation of NoteRepository.
///
/// Every statement filters on `user_id`, so a caller can never read or
/// write another owner's rows even with a valid note id.
#[derive(Clone)]
pub struct PgNoteRepository {
    pool: Pool<Postgres>,
}

impl PgNoteRepository {
    /// Create a new PgNoteRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn exists(&self, owner_id: Uuid, id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM notes WHERE id = $1 AND user_id = $2)",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(exists)
    }
}

/// Map a database row to a Note.
fn map_row_to_note(row: &PgRow) -> Result<Note> {
    let color: String = row.try_get("color").map_err(Error::Database)?;
    Ok(Note {
        id: row.try_get("id").map_err(Error::Database)?,
        owner_id: row.try_get("user_id").map_err(Error::Database)?,
        title: row.try_get("title").map_err(Error::Database)?,
        content: row.try_get("content").map_err(Error::Database)?,
        color: color
            .parse()
            .map_err(|_| Error::Repository(format!("Stored note has unknown color: {}", color)))?,
        is_pinned: row.try_get("is_pinned").map_err(Error::Database)?,
        created_at: row.try_get("created_at").map_err(Error::Database)?,
        updated_at: row.try_get("updated_at").map_err(Error::Database)?,
    })
}

/// Build the SET clause for a patch.
///
/// `$1` is the new `updated_at`, `$2` the note id and `$3` the owner; patch
/// parameters start at `$4` in field order title, content, color, is_pinned.
fn build_set_clause(patch: &NotePatch) -> String {
    let mut updates: Vec<String> = vec!["updated_at = $1".to_string()];
    let mut param_idx = 4;
    for (present, column) in [
        (patch.title.is_some(), "title"),
        (patch.content.is_some(), "content"),
        (patch.color.is_some(), "color"),
        (patch.is_pinned.is_some(), "is_pinned"),
    ] {
        if present {
            updates.push(format!("{} = ${}", column, param_idx));
            param_idx += 1;
        }
    }
    updates.join(", ")
}

#[async_trait]
impl NoteRepository for PgNoteRepository {
    async fn insert(&self, owner_id: Uuid, draft: NoteDraft) -> Result<Note> {
        let start = Instant::now();
        let draft = draft.normalized();
        let id = Uuid::now_v7();

        let row = sqlx::query(&format!(
            "INSERT INTO notes (id, user_id, title, content, color, is_pinned)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {}",
            NOTE_COLUMNS
        ))
        .bind(id)
        .bind(owner_id)
        .bind(&draft.title)
        .bind(&draft.content)
        .bind(draft.color.as_str())
        .bind(draft.is_pinned)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        let note = map_row_to_note(&row)?;
        debug!(
            subsystem = "db",
            component = "notes",
            op = "insert",
            note_id = %note.id,
            owner_id = %owner_id,
            duration_ms = start.elapsed().as_millis() as u64,
            "Note inserted"
        );
        Ok(note)
    }

    async fn update(&self, owner_id: Uuid, id: Uuid, patch: &NotePatch) -> Result<()> {
        if patch.is_empty() {
            // Nothing to write; still report a missing note as a failure.
            if !self.exists(owner_id, id).await? {
                return Err(Error::Repository(format!("Note {} not found", id)));
            }
            return Ok(());
        }

        let start = Instant::now();
        let query = format!(
            "UPDATE notes SET {} WHERE id = $2 AND user_id = $3",
            build_set_clause(patch)
        );

        let mut q = sqlx::query(&query)
            .bind(chrono::Utc::now())
            .bind(id)
            .bind(owner_id);
        if let Some(title) = &patch.title {
            q = q.bind(notesai_core::normalize_title(title));
        }
        if let Some(content) = &patch.content {
            q = q.bind(content);
        }
        if let Some(color) = patch.color {
            q = q.bind(color.as_str());
        }
        if let Some(pinned) = patch.is_pinned {
            q = q.bind(pinned);
        }

        let result = q.execute(&self.pool).await.map_err(Error::Database)?;
        if result.rows_affected() == 0 {
            return Err(Error::Repository(format!("Note {} not found", id)));
        }

        debug!(
            subsystem = "db",
            component = "notes",
            op = "update",
            note_id = %id,
            duration_ms = start.elapsed().as_millis() as u64,
            "Note updated"
        );
        Ok(())
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::Repository(format!("Note {} not found", id)));
        }
        debug!(subsystem = "db", component = "notes", op = "delete", note_id = %id, "Note deleted");
        Ok(())
    }

    async fn fetch_all(&self, owner_id: Uuid) -> Result<Vec<Note>> {
        let start = Instant::now();
        let rows = sqlx::query(&format!(
            "SELECT {} FROM notes WHERE user_id = $1
             ORDER BY is_pinned DESC, created_at DESC",
            NOTE_COLUMNS
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let notes = rows.iter().map(map_row_to_note).collect::<Result<Vec<_>>>()?;
        debug!(
            subsystem = "db",
            component = "notes",
            op = "fetch_all",
            owner_id = %owner_id,
            result_count = notes.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Notes fetched"
        );
        Ok(notes)
    }
}
