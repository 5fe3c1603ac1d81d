//! Cooperative shutdown signal shared by every poll loop (SE, OEG, DGW's
//! handler thread, MDG's publisher).
//!
//! Every suspension point in those loops is a channel poll; this flag is
//! checked at each poll boundary rather than via any hidden scheduling, per
//! spec.md §5 and §9 ("Coroutine/event-loop semantics... replaced by
//! explicit polling loops with bounded timeouts and an atomic shutdown
//! flag").

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cheaply-cloneable, shareable shutdown flag. `Clone` gives every thread
/// holding a handle an independent `Arc` to the same underlying bool.
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag(Arc<AtomicBool>);

impl ShutdownFlag {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    /// Requests shutdown. Idempotent.
    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether shutdown has been requested. Checked at poll boundaries.
    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_clear_and_is_observable_after_request() {
        let flag = ShutdownFlag::new();
        assert!(!flag.is_requested());
        let clone = flag.clone();
        clone.request();
        assert!(flag.is_requested());
    }
}
