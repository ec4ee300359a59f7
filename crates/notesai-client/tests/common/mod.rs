//! Shared fakes for client integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use notesai_client::{
    AuthEvent, AuthEventBus, AuthEventReceiver, Error, Identity, IdentityService, Note, NoteDraft,
    NotePatch, NoteRepository, NotesApp, Result, Session,
};
use notesai_db::MemoryNoteRepository;
use notesai_inference::mock::MockCompletionBackend;
use notesai_inference::AiGateway;
use uuid::Uuid;

pub const BAD_PASSWORD: &str = "wrong-password";

/// In-process identity service that publishes events like a real one.
#[derive(Default)]
pub struct FakeIdentity {
    events: AuthEventBus,
    session: Mutex<Option<Session>>,
    users: Mutex<HashMap<String, Uuid>>,
    pub fail_sign_out: AtomicBool,
    pub fail_get_session: AtomicBool,
}

impl FakeIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    fn session_for(&self, email: &str) -> Session {
        let id = *self
            .users
            .lock()
            .unwrap()
            .entry(email.to_string())
            .or_insert_with(Uuid::new_v4);
        Session {
            access_token: format!("token-{id}"),
            refresh_token: None,
            expires_at: None,
            user: Identity {
                id,
                email: email.to_string(),
            },
        }
    }

    /// Start with an already signed-in session, as if restored from storage.
    pub fn with_session(email: &str) -> Self {
        let fake = Self::new();
        let session = fake.session_for(email);
        *fake.session.lock().unwrap() = Some(session);
        fake
    }

    pub fn emit(&self, event: AuthEvent) {
        self.events.emit(event);
    }

    pub fn user_id(&self, email: &str) -> Uuid {
        self.session_for(email).user.id
    }
}

#[async_trait]
impl IdentityService for FakeIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        if password == BAD_PASSWORD {
            return Err(Error::Auth("Invalid login credentials".to_string()));
        }
        let session = self.session_for(email);
        *self.session.lock().unwrap() = Some(session.clone());
        self.events.emit(AuthEvent::SignedIn(session.clone()));
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>> {
        self.sign_in(email, password).await.map(Some)
    }

    async fn sign_out(&self) -> Result<()> {
        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(Error::Auth("network unreachable".to_string()));
        }
        *self.session.lock().unwrap() = None;
        self.events.emit(AuthEvent::SignedOut);
        Ok(())
    }

    async fn get_session(&self) -> Result<Option<Session>> {
        if self.fail_get_session.load(Ordering::SeqCst) {
            return Err(Error::Auth("session lookup failed".to_string()));
        }
        Ok(self.session.lock().unwrap().clone())
    }

    fn subscribe(&self) -> AuthEventReceiver {
        self.events.subscribe()
    }
}

/// Repository wrapper that delays each update, and each fetch_all, by the
/// next queued duration for that call. An empty queue means no delay.
pub struct DelayedRepository {
    inner: MemoryNoteRepository,
    update_delays: Mutex<VecDeque<Duration>>,
    fetch_delays: Mutex<VecDeque<Duration>>,
}

impl DelayedRepository {
    pub fn new(delays: impl IntoIterator<Item = Duration>) -> Self {
        Self {
            inner: MemoryNoteRepository::new(),
            update_delays: Mutex::new(delays.into_iter().collect()),
            fetch_delays: Mutex::new(VecDeque::new()),
        }
    }

    pub fn with_fetch_delays(self, delays: impl IntoIterator<Item = Duration>) -> Self {
        *self.fetch_delays.lock().unwrap() = delays.into_iter().collect();
        self
    }
}

async fn pause(queue: &Mutex<VecDeque<Duration>>) {
    let delay = queue.lock().unwrap().pop_front();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
}

#[async_trait]
impl NoteRepository for DelayedRepository {
    async fn insert(&self, owner_id: Uuid, draft: NoteDraft) -> Result<Note> {
        self.inner.insert(owner_id, draft).await
    }

    async fn update(&self, owner_id: Uuid, id: Uuid, patch: &NotePatch) -> Result<()> {
        pause(&self.update_delays).await;
        self.inner.update(owner_id, id, patch).await
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<()> {
        self.inner.delete(owner_id, id).await
    }

    async fn fetch_all(&self, owner_id: Uuid) -> Result<Vec<Note>> {
        pause(&self.fetch_delays).await;
        self.inner.fetch_all(owner_id).await
    }
}

/// App over a fake identity, the in-memory repository and a mock model.
pub fn app_with(
    identity: Arc<FakeIdentity>,
    repo: Arc<dyn NoteRepository>,
    model: MockCompletionBackend,
) -> NotesApp {
    let ai = Arc::new(AiGateway::new(Arc::new(model)));
    NotesApp::new(identity, repo, ai)
}

/// Poll `check` until it holds or two seconds pass.
pub async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..200 {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
