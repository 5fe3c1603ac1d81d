//! Session store: account and login-token state, read by OEG and DGW,
//! written only by the login use case on Main (spec.md §5).
//!
//! Readers see an immutable snapshot; writers publish a new one atomically.
//! No reader ever observes a partially-updated snapshot.

use std::sync::Arc;
use parking_lot::RwLock;

/// An immutable point-in-time view of the logged-in session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub logged_in: bool,
    pub account: String,
    pub token: String,
}

impl SessionSnapshot {
    pub fn logged_out() -> Self {
        Self {
            logged_in: false,
            account: String::new(),
            token: String::new(),
        }
    }
}

/// Read-only view of the current session, as consumed by OEG (for
/// `account`) and DGW (for auth state). This is the "consumed, not
/// implemented" interface spec.md §6 names.
pub trait SessionStore: Send + Sync {
    fn is_logged_in(&self) -> bool;
    fn account(&self) -> String;
    fn token_snapshot(&self) -> SessionSnapshot;
}

/// Process-local reference implementation: an `RwLock` around an `Arc`, so
/// a read only ever clones a cheap pointer to one complete, consistent
/// snapshot. The login use case is the only writer.
#[derive(Debug)]
pub struct InMemorySessionStore {
    current: RwLock<Arc<SessionSnapshot>>,
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new(SessionSnapshot::logged_out())
    }
}

impl InMemorySessionStore {
    pub fn new(initial: SessionSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
        }
    }

    /// Publishes a new snapshot, replacing the old one atomically for every
    /// subsequent reader.
    pub fn publish(&self, snapshot: SessionSnapshot) {
        *self.current.write() = Arc::new(snapshot);
    }
}

impl SessionStore for InMemorySessionStore {
    fn is_logged_in(&self) -> bool {
        self.current.read().logged_in
    }

    fn account(&self) -> String {
        self.current.read().account.clone()
    }

    fn token_snapshot(&self) -> SessionSnapshot {
        (**self.current.read()).clone()
    }
}
