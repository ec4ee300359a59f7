//! Auth event bus for session-change notifications.
//!
//! Identity service implementations publish [`AuthEvent`]s here; the client
//! session store subscribes and reacts. Each subscriber gets an independent
//! stream, and events emitted with no subscribers are dropped.

use tokio::sync::broadcast;

use crate::models::AuthEvent;

/// Receiving half handed out by [`AuthEventBus::subscribe`].
pub type AuthEventReceiver = broadcast::Receiver<AuthEvent>;

/// Broadcast channel of session-change events.
#[derive(Debug, Clone)]
pub struct AuthEventBus {
    tx: broadcast::Sender<AuthEvent>,
}

impl AuthEventBus {
    /// Create a new event bus with the given buffer capacity.
    ///
    /// Recommended: 16 for clients, 4 for tests.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Emit an event to all subscribers.
    pub fn emit(&self, event: AuthEvent) {
        let subscriber_count = self.tx.receiver_count();
        tracing::debug!(
            event_type = event.name(),
            subscriber_count,
            "AuthEventBus emit"
        );
        let _ = self.tx.send(event);
    }

    /// Subscribe to receive events emitted from now on.
    pub fn subscribe(&self) -> AuthEventReceiver {
        self.tx.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for AuthEventBus {
    fn default() -> Self {
        Self::new(16)
    }
}
