//! Client mirror of the signed-in owner's notes.
//!
//! Every mutator is remote-then-apply: the repository call runs first with
//! no lock held, and the local list changes only when it succeeds. Concurrent
//! mutations are not serialised; whichever response lands last wins.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use notesai_core::{
    filter_notes, Error, FilterCriteria, Note, NoteDraft, NoteExcerpt, NotePatch, NoteRepository,
    Result,
};

#[derive(Debug, Default)]
struct CacheState {
    owner: Option<Uuid>,
    /// Bumped whenever the owner changes, so in-flight work for a previous
    /// owner can detect that its result is stale.
    epoch: u64,
    notes: Vec<Note>,
}

impl CacheState {
    fn is_current(&self, owner: Uuid, epoch: u64) -> bool {
        self.owner == Some(owner) && self.epoch == epoch
    }
}

/// Ordered, de-duplicated list of the current owner's notes.
pub struct NoteCache {
    repo: Arc<dyn NoteRepository>,
    state: RwLock<CacheState>,
    /// Reloads currently waiting on the repository.
    reloads_in_flight: AtomicUsize,
}

impl NoteCache {
    pub fn new(repo: Arc<dyn NoteRepository>) -> Self {
        Self {
            repo,
            state: RwLock::new(CacheState::default()),
            reloads_in_flight: AtomicUsize::new(0),
        }
    }

    /// Owner whose notes are mirrored, if any.
    pub async fn owner(&self) -> Option<Uuid> {
        self.state.read().await.owner
    }

    /// True while any full reload is in flight.
    pub fn is_loading(&self) -> bool {
        self.reloads_in_flight.load(Ordering::SeqCst) > 0
    }

    async fn current(&self) -> Result<(Uuid, u64)> {
        let state = self.state.read().await;
        match state.owner {
            Some(owner) => Ok((owner, state.epoch)),
            None => Err(Error::Unauthenticated),
        }
    }

    /// Fetch all of `owner`'s notes and replace the cache with them.
    ///
    /// Switching owner empties the cache immediately. If the owner changes
    /// again before the fetch returns, the result is discarded.
    pub async fn reload(&self, owner: Uuid) -> Result<()> {
        let epoch = {
            let mut state = self.state.write().await;
            if state.owner != Some(owner) {
                state.owner = Some(owner);
                state.epoch += 1;
                state.notes.clear();
            }
            state.epoch
        };

        let start = Instant::now();
        self.reloads_in_flight.fetch_add(1, Ordering::SeqCst);
        let fetched = self.repo.fetch_all(owner).await;
        self.reloads_in_flight.fetch_sub(1, Ordering::SeqCst);

        let notes = fetched.map_err(|e| {
            warn!(
                subsystem = "client",
                component = "cache",
                op = "reload",
                owner_id = %owner,
                error = %e,
                "Failed to fetch notes"
            );
            e
        })?;

        let mut state = self.state.write().await;
        if !state.is_current(owner, epoch) {
            debug!(
                subsystem = "client",
                component = "cache",
                op = "reload",
                owner_id = %owner,
                "Discarding stale reload"
            );
            return Ok(());
        }
        state.notes = dedup_by_id(notes);
        debug!(
            subsystem = "client",
            component = "cache",
            op = "reload",
            result_count = state.notes.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Cache reloaded"
        );
        Ok(())
    }

    /// Wholesale replacement after a full fetch made elsewhere.
    pub async fn replace_all(&self, notes: Vec<Note>) {
        self.state.write().await.notes = dedup_by_id(notes);
    }

    /// Forget the owner and all notes.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.owner = None;
        state.epoch += 1;
        state.notes.clear();
    }

    /// Insert a note for the current owner and prepend the stored row.
    ///
    /// The new row goes first regardless of pin state; the next reload
    /// restores store ordering.
    pub async fn add(&self, draft: NoteDraft) -> Result<Note> {
        let (owner, epoch) = self.current().await?;
        let note = self.repo.insert(owner, draft.normalized()).await.map_err(|e| {
            warn!(
                subsystem = "client",
                component = "cache",
                op = "add",
                error = %e,
                "Failed to add note"
            );
            e
        })?;

        let mut state = self.state.write().await;
        if state.is_current(owner, epoch) {
            state.notes.retain(|n| n.id != note.id);
            state.notes.insert(0, note.clone());
        }
        debug!(
            subsystem = "client",
            component = "cache",
            op = "add",
            note_id = %note.id,
            "Note added"
        );
        Ok(note)
    }

    /// Patch a note remotely, then merge the patch into the cached entry.
    pub async fn update(&self, id: Uuid, patch: NotePatch) -> Result<()> {
        let (owner, epoch) = self.current().await?;
        self.repo.update(owner, id, &patch).await.map_err(|e| {
            warn!(
                subsystem = "client",
                component = "cache",
                op = "update",
                note_id = %id,
                error = %e,
                "Failed to update note"
            );
            e
        })?;

        let mut state = self.state.write().await;
        if state.is_current(owner, epoch) {
            if let Some(note) = state.notes.iter_mut().find(|n| n.id == id) {
                note.apply(&patch);
            }
        }
        debug!(
            subsystem = "client",
            component = "cache",
            op = "update",
            note_id = %id,
            "Note updated"
        );
        Ok(())
    }

    /// Delete a note remotely, then drop it from the cache.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let (owner, epoch) = self.current().await?;
        self.repo.delete(owner, id).await.map_err(|e| {
            warn!(
                subsystem = "client",
                component = "cache",
                op = "delete",
                note_id = %id,
                error = %e,
                "Failed to delete note"
            );
            e
        })?;

        let mut state = self.state.write().await;
        if state.is_current(owner, epoch) {
            state.notes.retain(|n| n.id != id);
        }
        debug!(
            subsystem = "client",
            component = "cache",
            op = "delete",
            note_id = %id,
            "Note deleted"
        );
        Ok(())
    }

    /// Copy of the cached notes, in cache order.
    pub async fn snapshot(&self) -> Vec<Note> {
        self.state.read().await.notes.clone()
    }

    pub async fn get(&self, id: Uuid) -> Option<Note> {
        self.state
            .read()
            .await
            .notes
            .iter()
            .find(|n| n.id == id)
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.notes.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.notes.is_empty()
    }

    /// Cached notes matching `criteria`, in cache order.
    pub async fn filtered(&self, criteria: &FilterCriteria) -> Vec<Note> {
        let state = self.state.read().await;
        filter_notes(&state.notes, criteria)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Title/content pairs of every cached note, for answering questions.
    pub async fn excerpts(&self) -> Vec<NoteExcerpt> {
        self.state
            .read()
            .await
            .notes
            .iter()
            .map(NoteExcerpt::from)
            .collect()
    }
}

/// Keep the first occurrence of each id.
fn dedup_by_id(notes: Vec<Note>) -> Vec<Note> {
    let mut seen = std::collections::HashSet::with_capacity(notes.len());
    notes.into_iter().filter(|n| seen.insert(n.id)).collect()
}
