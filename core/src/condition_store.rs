//! Condition store: the external repository of user-configured
//! [`pipeline_model::Condition`]s, consumed (not implemented) by SE
//! (spec.md §6). External writes (from the out-of-scope CLI) are observed
//! eventually — this module's reference implementation polls an in-memory
//! vector that a writer can swap out from another thread.

use parking_lot::RwLock;
use pipeline_model::{Condition, ConditionId};
use std::sync::Arc;

/// Read-only interface SE polls once per loop iteration (or on whatever
/// cadence the caller chooses — SE itself decides how often to re-`list`).
pub trait ConditionStore: Send + Sync {
    fn list(&self) -> Vec<Condition>;
    fn get(&self, id: &ConditionId) -> Option<Condition>;
}

/// In-memory reference implementation: an `RwLock<Arc<Vec<Condition>>>` so a
/// `list()` call clones one pointer, not the whole vector, and a concurrent
/// writer swap never yields a torn read.
#[derive(Debug, Default)]
pub struct InMemoryConditionStore {
    conditions: RwLock<Arc<Vec<Condition>>>,
}

impl InMemoryConditionStore {
    pub fn new(conditions: Vec<Condition>) -> Self {
        Self {
            conditions: RwLock::new(Arc::new(conditions)),
        }
    }

    /// Replaces the whole condition set, simulating an external CLI write
    /// becoming visible to SE on its next poll.
    pub fn replace_all(&self, conditions: Vec<Condition>) {
        *self.conditions.write() = Arc::new(conditions);
    }
}

impl ConditionStore for InMemoryConditionStore {
    fn list(&self) -> Vec<Condition> {
        (**self.conditions.read()).clone()
    }

    fn get(&self, id: &ConditionId) -> Option<Condition> {
        self.conditions.read().iter().find(|c| &c.id == id).cloned()
    }
}
