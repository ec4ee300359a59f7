//! Session store: current identity plus the listener that keeps the note
//! cache in step with session changes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use notesai_core::{AuthEvent, AuthEventReceiver, Identity, IdentityService, Result, Session};

use crate::cache::NoteCache;

/// Handle to the background auth listener. Dropping it stops the listener.
#[derive(Debug)]
pub struct SessionSubscription {
    handle: JoinHandle<()>,
}

impl SessionSubscription {
    /// Stop the listener now.
    pub fn cancel(self) {
        self.handle.abort();
    }

    pub fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for SessionSubscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Shared identity state, written by the listener and by the store's own
/// sign-in calls.
#[derive(Debug)]
struct SessionState {
    identity: RwLock<Option<Identity>>,
    loading: AtomicBool,
    /// Serialises event application so a listener reload never overlaps the
    /// caller's own.
    apply_lock: Mutex<()>,
}

impl SessionState {
    /// React to one session-change event.
    ///
    /// A `SignedIn` for the identity the cache already mirrors has been
    /// applied by the caller and is skipped.
    async fn apply(&self, cache: &NoteCache, event: &AuthEvent) {
        let _guard = self.apply_lock.lock().await;
        let identity = event.identity().cloned();

        if let (AuthEvent::SignedIn(_), Some(next)) = (event, &identity) {
            let unchanged = self.identity.read().await.as_ref() == Some(next);
            if unchanged && cache.owner().await == Some(next.id) {
                debug!(
                    subsystem = "client",
                    component = "session",
                    event_type = event.name(),
                    "Session already applied"
                );
                return;
            }
        }

        *self.identity.write().await = identity.clone();

        match identity {
            Some(identity) => {
                if let Err(e) = cache.reload(identity.id).await {
                    warn!(
                        subsystem = "client",
                        component = "session",
                        event_type = event.name(),
                        error = %e,
                        "Note reload after session change failed"
                    );
                }
            }
            None => cache.clear().await,
        }
    }
}

/// Tracks the signed-in identity and reloads or clears the cache on change.
pub struct SessionStore {
    identity_service: Arc<dyn IdentityService>,
    cache: Arc<NoteCache>,
    state: Arc<SessionState>,
    subscription: Mutex<Option<SessionSubscription>>,
}

impl SessionStore {
    pub fn new(identity_service: Arc<dyn IdentityService>, cache: Arc<NoteCache>) -> Self {
        Self {
            identity_service,
            cache,
            state: Arc::new(SessionState {
                identity: RwLock::new(None),
                loading: AtomicBool::new(true),
                apply_lock: Mutex::new(()),
            }),
            subscription: Mutex::new(None),
        }
    }

    /// Resolve the current session and start listening for changes.
    ///
    /// The loading flag is cleared however the lookup ends. Calling this
    /// again replaces the previous listener.
    pub async fn initialize(&self) -> Result<()> {
        // Subscribe before the lookup so no change in between is missed.
        let receiver = self.identity_service.subscribe();
        {
            let mut slot = self.subscription.lock().await;
            if let Some(previous) = slot.take() {
                debug!(
                    subsystem = "client",
                    component = "session",
                    "Replacing previous session listener"
                );
                previous.cancel();
            }
            *slot = Some(self.spawn_listener(receiver));
        }

        let result = self.identity_service.get_session().await;
        self.state.loading.store(false, Ordering::SeqCst);

        let session = result.map_err(|e| {
            warn!(
                subsystem = "client",
                component = "session",
                op = "initialize",
                error = %e,
                "Session lookup failed"
            );
            e
        })?;

        match session {
            Some(session) => {
                info!(
                    subsystem = "client",
                    component = "session",
                    owner_id = %session.user.id,
                    "Restored existing session"
                );
                *self.state.identity.write().await = Some(session.user.clone());
                self.cache.reload(session.user.id).await?;
            }
            None => {
                *self.state.identity.write().await = None;
                self.cache.clear().await;
            }
        }
        Ok(())
    }

    fn spawn_listener(&self, mut receiver: AuthEventReceiver) -> SessionSubscription {
        let state = self.state.clone();
        let cache = self.cache.clone();
        let handle = tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => {
                        debug!(
                            subsystem = "client",
                            component = "session",
                            event_type = event.name(),
                            "Session change"
                        );
                        state.apply(&cache, &event).await;
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(
                            subsystem = "client",
                            component = "session",
                            skipped,
                            "Session listener lagged"
                        );
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        SessionSubscription { handle }
    }

    /// Apply a session-change event directly, as the listener would.
    pub async fn handle_event(&self, event: &AuthEvent) {
        self.state.apply(&self.cache, event).await;
    }

    /// Stop listening for session changes.
    pub async fn teardown(&self) {
        if let Some(subscription) = self.subscription.lock().await.take() {
            subscription.cancel();
        }
    }

    pub async fn is_listening(&self) -> bool {
        self.subscription
            .lock()
            .await
            .as_ref()
            .is_some_and(SessionSubscription::is_active)
    }

    pub async fn identity(&self) -> Option<Identity> {
        self.state.identity.read().await.clone()
    }

    /// True until the first session lookup has finished.
    pub fn is_loading(&self) -> bool {
        self.state.loading.load(Ordering::SeqCst)
    }

    /// Sign in. The identity is set and the notes loaded before this
    /// returns.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let session = self.identity_service.sign_in(email, password).await?;
        self.state
            .apply(&self.cache, &AuthEvent::SignedIn(session.clone()))
            .await;
        Ok(session)
    }

    /// Register a new account. When the service signs the user straight in,
    /// the session is applied as for [`sign_in`](Self::sign_in).
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>> {
        let session = self.identity_service.sign_up(email, password).await?;
        if let Some(session) = &session {
            self.state
                .apply(&self.cache, &AuthEvent::SignedIn(session.clone()))
                .await;
        }
        Ok(session)
    }

    /// Sign out, then drop the local identity and cached notes.
    ///
    /// If the identity service fails, the error is returned and local state
    /// is left as it was.
    pub async fn sign_out(&self) -> Result<()> {
        self.identity_service.sign_out().await?;
        let _guard = self.state.apply_lock.lock().await;
        *self.state.identity.write().await = None;
        self.cache.clear().await;
        Ok(())
    }
}
