//! # notesai-db
//!
//! Durable note storage for NotesAI.
//!
//! This crate provides:
//! - Connection pool management
//! - The PostgreSQL note repository (owner-scoped CRUD)
//! - An in-process repository with the same contract
//!
//! ## Example
//!
//! ```rust,ignore
//! use notesai_db::{Database, NoteDraft, NoteColor, NoteRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/notesai", &PoolConfig::default()).await?;
//!     db.migrate().await?;
//!
//!     let owner = uuid::Uuid::new_v4();
//!     let note = db.notes
//!         .insert(owner, NoteDraft::new("Groceries", "milk, eggs", NoteColor::Yellow))
//!         .await?;
//!     println!("Created note: {}", note.id);
//!     Ok(())
//! }
//! ```

pub mod memory;
pub mod notes;
pub mod pool;

use std::sync::Arc;

// Re-export core types
pub use notesai_core::*;

pub use memory::MemoryNoteRepository;
pub use notes::PgNoteRepository;
pub use pool::{create_pool, PoolConfig};

/// `DATABASE_URL` value selecting the in-process repository.
pub const MEMORY_DATABASE_URL: &str = "memory";

/// Combined database context.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Note repository for owner-scoped CRUD.
    pub notes: PgNoteRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            notes: PgNoteRepository::new(pool.clone()),
            pool,
        }
    }

    /// Connect a pool and wrap it.
    pub async fn connect(url: &str, config: &PoolConfig) -> Result<Self> {
        let pool = create_pool(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }
}

/// Open the note repository named by a `DATABASE_URL`.
///
/// `memory` selects [`MemoryNoteRepository`]; anything else is treated as a
/// PostgreSQL URL, connected with `config` and migrated.
pub async fn open_note_repository(
    url: &str,
    config: PoolConfig,
) -> Result<Arc<dyn NoteRepository>> {
    if url.trim() == MEMORY_DATABASE_URL {
        tracing::info!(subsystem = "db", op = "open", "Using in-memory note repository");
        return Ok(Arc::new(MemoryNoteRepository::new()));
    }

    let db = Database::connect(url, &config).await?;
    #[cfg(feature = "migrations")]
    db.migrate().await?;
    Ok(Arc::new(db.notes))
}
