//! End-to-end behaviour of the application state object.
//!
//! Covers:
//! - session restore, sign-in/out and the session listener
//! - cache mutators (remote-then-apply, failure propagation)
//! - filtering over the cache
//! - AI operations and their local validation
//! - last-writer-wins for overlapping edits

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use common::{app_with, eventually, DelayedRepository, FakeIdentity, BAD_PASSWORD};
use notesai_client::{
    AuthEvent, ColorFilter, Credentials, Error, NoteColor, NoteDraft, NotePatch, NoteRepository,
    NotesApp,
};
use notesai_db::MemoryNoteRepository;
use notesai_inference::mock::MockCompletionBackend;

const EMAIL: &str = "ada@example.com";
const PASSWORD: &str = "correct-horse";

async fn signed_in_app() -> (Arc<FakeIdentity>, Arc<MemoryNoteRepository>, MockCompletionBackend, NotesApp) {
    let identity = Arc::new(FakeIdentity::with_session(EMAIL));
    let repo = Arc::new(MemoryNoteRepository::new());
    let model = MockCompletionBackend::new().with_fixed_response("Generated body.");
    let app = app_with(identity.clone(), repo.clone(), model.clone());
    app.initialize().await.unwrap();
    (identity, repo, model, app)
}

// =============================================================================
// SESSION
// =============================================================================

#[tokio::test]
async fn test_initialize_restores_session_and_loads_notes() {
    let identity = Arc::new(FakeIdentity::with_session(EMAIL));
    let repo = Arc::new(MemoryNoteRepository::new());
    let owner = identity.user_id(EMAIL);
    repo.insert(owner, NoteDraft::new("Existing", "from before", NoteColor::Pink))
        .await
        .unwrap();

    let app = app_with(identity, repo, MockCompletionBackend::new());
    assert!(app.is_auth_loading());

    app.initialize().await.unwrap();
    assert!(!app.is_auth_loading());
    assert_eq!(app.identity().await.unwrap().id, owner);
    assert_eq!(app.notes().await.len(), 1);
    assert!(app.session().is_listening().await);
}

#[tokio::test]
async fn test_initialize_failure_still_clears_loading() {
    let identity = Arc::new(FakeIdentity::new());
    identity.fail_get_session.store(true, Ordering::SeqCst);
    let app = app_with(
        identity,
        Arc::new(MemoryNoteRepository::new()),
        MockCompletionBackend::new(),
    );

    assert!(app.initialize().await.is_err());
    assert!(!app.is_auth_loading());
    assert!(app.identity().await.is_none());
}

#[tokio::test]
async fn test_sign_in_loads_identity_and_notes_before_returning() {
    let identity = Arc::new(FakeIdentity::new());
    let repo = Arc::new(MemoryNoteRepository::new());
    let owner = identity.user_id(EMAIL);
    repo.insert(owner, NoteDraft::new("Mine", "", NoteColor::Default))
        .await
        .unwrap();

    let app = app_with(identity, repo, MockCompletionBackend::new());
    app.initialize().await.unwrap();
    assert!(app.identity().await.is_none());

    app.sign_in(&Credentials::new(EMAIL, PASSWORD)).await.unwrap();
    assert_eq!(app.identity().await.unwrap().email, EMAIL);
    assert_eq!(app.notes().await.len(), 1);
}

#[tokio::test]
async fn test_add_note_straight_after_sign_in() {
    let identity = Arc::new(FakeIdentity::new());
    let repo = Arc::new(MemoryNoteRepository::new());
    let app = app_with(identity.clone(), repo.clone(), MockCompletionBackend::new());
    app.initialize().await.unwrap();

    app.sign_in(&Credentials::new(EMAIL, PASSWORD)).await.unwrap();
    let note = app
        .add_note(NoteDraft::new("t", "c", NoteColor::Default))
        .await
        .unwrap();

    // The listener's copy of the sign-in event must not reload over the add.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(app.notes().await.len(), 1);
    assert_eq!(app.notes().await[0].id, note.id);
    assert_eq!(note.owner_id, identity.user_id(EMAIL));
}

#[tokio::test]
async fn test_sign_up_with_session_signs_in_immediately() {
    let identity = Arc::new(FakeIdentity::new());
    let app = app_with(
        identity,
        Arc::new(MemoryNoteRepository::new()),
        MockCompletionBackend::new(),
    );
    app.initialize().await.unwrap();

    let session = app.sign_up(&Credentials::new(EMAIL, PASSWORD)).await.unwrap();
    assert!(session.is_some());
    assert_eq!(app.identity().await.unwrap().email, EMAIL);
    app.add_note(NoteDraft::new("First", "", NoteColor::Default))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_short_password_rejected_before_identity_service() {
    let (_identity, _repo, _model, app) = signed_in_app().await;
    let err = app
        .sign_in(&Credentials::new(EMAIL, "12345"))
        .await
        .unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn test_sign_in_failure_propagates_unchanged() {
    let identity = Arc::new(FakeIdentity::new());
    let app = app_with(
        identity,
        Arc::new(MemoryNoteRepository::new()),
        MockCompletionBackend::new(),
    );
    app.initialize().await.unwrap();

    let err = app
        .sign_in(&Credentials::new(EMAIL, BAD_PASSWORD))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Auth(ref m) if m == "Invalid login credentials"));
    assert!(app.identity().await.is_none());
}

#[tokio::test]
async fn test_sign_out_clears_identity_and_cache() {
    let (_identity, _repo, _model, app) = signed_in_app().await;
    app.add_note(NoteDraft::new("Soon gone", "", NoteColor::Default))
        .await
        .unwrap();

    app.sign_out().await.unwrap();
    assert!(app.identity().await.is_none());
    assert!(app.notes().await.is_empty());
}

#[tokio::test]
async fn test_sign_out_failure_keeps_local_state() {
    let (identity, _repo, _model, app) = signed_in_app().await;
    app.add_note(NoteDraft::new("Kept", "", NoteColor::Default))
        .await
        .unwrap();
    identity.fail_sign_out.store(true, Ordering::SeqCst);

    assert!(app.sign_out().await.is_err());
    assert!(app.identity().await.is_some());
    assert_eq!(app.notes().await.len(), 1);
}

#[tokio::test]
async fn test_external_sign_out_event_clears_cache() {
    let (identity, _repo, _model, app) = signed_in_app().await;
    app.add_note(NoteDraft::new("x", "", NoteColor::Default))
        .await
        .unwrap();

    identity.emit(AuthEvent::SignedOut);
    assert!(eventually(|| async { app.identity().await.is_none() }).await);
    assert!(eventually(|| async { app.notes().await.is_empty() }).await);
}

#[tokio::test]
async fn test_reinitialize_replaces_listener() {
    let (identity, _repo, _model, app) = signed_in_app().await;
    app.initialize().await.unwrap();
    assert!(app.session().is_listening().await);

    app.session().teardown().await;
    assert!(!app.session().is_listening().await);

    // With the listener gone, events no longer reach the store.
    identity.emit(AuthEvent::SignedOut);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(app.identity().await.is_some());
}

// =============================================================================
// NOTES
// =============================================================================

#[tokio::test]
async fn test_add_then_fetch_matches_fields() {
    let (identity, repo, _model, app) = signed_in_app().await;
    let note = app
        .add_note(NoteDraft::new("Trip", "Paris notes", NoteColor::Blue))
        .await
        .unwrap();

    let stored = repo.fetch_all(identity.user_id(EMAIL)).await.unwrap();
    let found = stored.iter().find(|n| n.id == note.id).unwrap();
    assert_eq!(found.title, "Trip");
    assert_eq!(found.content, "Paris notes");
    assert_eq!(found.color, NoteColor::Blue);
}

#[tokio::test]
async fn test_add_blank_note_rejected() {
    let (_identity, _repo, _model, app) = signed_in_app().await;
    let err = app
        .add_note(NoteDraft::new("  ", "  ", NoteColor::Default))
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert!(app.notes().await.is_empty());
}

#[tokio::test]
async fn test_blank_title_defaults_to_untitled() {
    let (_identity, _repo, _model, app) = signed_in_app().await;
    let note = app
        .add_note(NoteDraft::new("", "just a body", NoteColor::Default))
        .await
        .unwrap();
    assert_eq!(note.title, "Untitled");
}

#[tokio::test]
async fn test_note_typed_as_untitled_is_saved() {
    let (_identity, _repo, _model, app) = signed_in_app().await;
    let note = app
        .add_note(NoteDraft::new("Untitled", "", NoteColor::Default))
        .await
        .unwrap();
    assert_eq!(note.title, "Untitled");
    assert_eq!(app.notes().await.len(), 1);
}

#[tokio::test]
async fn test_empty_patch_leaves_note_unchanged() {
    let (_identity, _repo, _model, app) = signed_in_app().await;
    let note = app
        .add_note(NoteDraft::new("Same", "same", NoteColor::Purple))
        .await
        .unwrap();

    app.update_note(note.id, NotePatch::default()).await.unwrap();
    let after = app.cache().get(note.id).await.unwrap();
    assert_eq!(after.title, note.title);
    assert_eq!(after.content, note.content);
    assert_eq!(after.color, note.color);
    assert_eq!(after.is_pinned, note.is_pinned);
}

#[tokio::test]
async fn test_pin_toggle_round_trip() {
    let (_identity, _repo, _model, app) = signed_in_app().await;
    let note = app
        .add_note(NoteDraft::new("Pin", "", NoteColor::Default))
        .await
        .unwrap();

    app.toggle_pin(note.id).await.unwrap();
    assert!(app.cache().get(note.id).await.unwrap().is_pinned);
    app.toggle_pin(note.id).await.unwrap();
    let after = app.cache().get(note.id).await.unwrap();
    assert_eq!(after.is_pinned, note.is_pinned);
}

#[tokio::test]
async fn test_edit_note_merges_in_place() {
    let (_identity, _repo, _model, app) = signed_in_app().await;
    let first = app
        .add_note(NoteDraft::new("First", "", NoteColor::Default))
        .await
        .unwrap();
    let second = app
        .add_note(NoteDraft::new("Second", "", NoteColor::Default))
        .await
        .unwrap();

    app.edit_note(first.id, "First (edited)", "now with body", NoteColor::Green)
        .await
        .unwrap();

    let notes = app.notes().await;
    assert_eq!(notes[0].id, second.id);
    assert_eq!(notes[1].title, "First (edited)");
    assert_eq!(notes[1].color, NoteColor::Green);
}

#[tokio::test]
async fn test_delete_failure_propagates() {
    let (_identity, _repo, _model, app) = signed_in_app().await;
    let err = app.delete_note(uuid::Uuid::new_v4()).await.unwrap_err();
    assert!(err.is_repository());
}

#[tokio::test]
async fn test_mutation_when_signed_out_is_unauthenticated() {
    let identity = Arc::new(FakeIdentity::new());
    let app = app_with(
        identity,
        Arc::new(MemoryNoteRepository::new()),
        MockCompletionBackend::new(),
    );
    app.initialize().await.unwrap();

    let err = app
        .add_note(NoteDraft::new("t", "c", NoteColor::Default))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Unauthenticated));
}

#[tokio::test]
async fn test_overlapping_updates_last_response_wins() {
    // The first update is slow, the second fast: the first lands last.
    let identity = Arc::new(FakeIdentity::with_session(EMAIL));
    let repo = Arc::new(DelayedRepository::new([
        Duration::from_millis(150),
        Duration::from_millis(5),
    ]));
    let app = app_with(identity, repo, MockCompletionBackend::new());
    app.initialize().await.unwrap();
    let note = app
        .add_note(NoteDraft::new("Original", "", NoteColor::Default))
        .await
        .unwrap();

    let slow = NotePatch {
        title: Some("Slow edit".to_string()),
        ..Default::default()
    };
    let fast = NotePatch {
        title: Some("Fast edit".to_string()),
        ..Default::default()
    };
    let (a, b) = tokio::join!(app.update_note(note.id, slow), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        app.update_note(note.id, fast).await
    });
    a.unwrap();
    b.unwrap();

    assert_eq!(app.cache().get(note.id).await.unwrap().title, "Slow edit");
}

// =============================================================================
// FILTERING
// =============================================================================

#[tokio::test]
async fn test_unfiltered_returns_pinned_and_unpinned_in_cache_order() {
    let (_identity, _repo, _model, app) = signed_in_app().await;
    let a = app
        .add_note(NoteDraft::new("A", "", NoteColor::Default))
        .await
        .unwrap();
    let b = app
        .add_note(NoteDraft::new("B", "", NoteColor::Yellow))
        .await
        .unwrap();
    app.toggle_pin(a.id).await.unwrap();

    app.set_selected_color(ColorFilter::All).await;
    app.set_search_query("").await;
    let ids: Vec<_> = app.filtered_notes().await.iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![b.id, a.id]);
}

#[tokio::test]
async fn test_search_and_color_filters() {
    let (_identity, _repo, _model, app) = signed_in_app().await;
    let trip = app
        .add_note(NoteDraft::new("Trip", "Paris notes", NoteColor::Blue))
        .await
        .unwrap();
    app.add_note(NoteDraft::new("Groceries", "milk", NoteColor::Blue))
        .await
        .unwrap();
    app.add_note(NoteDraft::new("Paris museums", "Louvre", NoteColor::Green))
        .await
        .unwrap();

    app.set_search_query("PARIS").await;
    app.set_selected_color(ColorFilter::Only(NoteColor::Blue)).await;
    let hits = app.filtered_notes().await;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, trip.id);
    assert_eq!(app.notes().await.len(), 3);
}

// =============================================================================
// AI
// =============================================================================

#[tokio::test]
async fn test_answer_with_no_notes_fails_without_model_call() {
    let (_identity, _repo, model, app) = signed_in_app().await;
    let err = app.answer_question("What is the capital?").await.unwrap_err();
    assert!(err.is_validation());
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn test_answer_uses_all_cached_notes_not_filtered() {
    let (_identity, _repo, model, app) = signed_in_app().await;
    app.add_note(NoteDraft::new("Trip", "Paris notes", NoteColor::Blue))
        .await
        .unwrap();
    app.add_note(NoteDraft::new("Work", "review", NoteColor::Red))
        .await
        .unwrap();
    app.set_search_query("paris").await;

    app.answer_question("Where?").await.unwrap();
    let prompt = &model.calls()[0].user;
    assert!(prompt.contains("Title: Trip"));
    assert!(prompt.contains("Title: Work"));
}

#[tokio::test]
async fn test_enhance_empty_fails_and_keeps_content() {
    let (_identity, _repo, model, app) = signed_in_app().await;
    let err = app.enhance_note("").await.unwrap_err();
    assert!(err.is_validation());
    assert_eq!(app.enhance_or_keep("").await, "");
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn test_enhance_failure_keeps_original() {
    let identity = Arc::new(FakeIdentity::with_session(EMAIL));
    let app = app_with(
        identity,
        Arc::new(MemoryNoteRepository::new()),
        MockCompletionBackend::new().failing("model offline"),
    );
    assert_eq!(app.enhance_or_keep("rough draft").await, "rough draft");
}

#[tokio::test]
async fn test_draft_from_prompt_titles_after_prompt() {
    let (_identity, _repo, _model, app) = signed_in_app().await;
    let prompt = "a very long prompt about planning a two week trip through northern Italy";
    let draft = app.draft_from_prompt(prompt, NoteColor::Yellow).await.unwrap();
    assert_eq!(draft.content, "Generated body.");
    assert!(draft.title.ends_with("..."));
    assert_eq!(draft.title.chars().count(), 53);
}
