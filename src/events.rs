//! Authentication notifications for UI listeners.

use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 16;

/// Events a front end reacts to, e.g. by showing a login prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthEvent {
    /// The session can no longer be refreshed; the user must log in again.
    NeedLogin,
}

/// Fan-out channel for [`AuthEvent`]s. Emitting with no listeners is fine.
#[derive(Clone, Debug)]
pub struct AuthEvents {
    tx: broadcast::Sender<AuthEvent>,
}

impl AuthEvents {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self { tx }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.tx.subscribe()
    }

    /// Publish an event, returning how many listeners received it.
    pub fn emit(&self, event: AuthEvent) -> usize {
        let delivered = self.tx.send(event).unwrap_or(0);
        tracing::info!(?event, listeners = delivered, "auth event emitted");
        delivered
    }
}

impl Default for AuthEvents {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "events_test.rs"]
mod tests;
