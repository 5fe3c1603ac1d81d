//! Aggregate health tracking (spec.md §3 `SystemHealth`, §4.E
//! `get_system_health()`): one [`pipeline_model::ComponentStatus`] per
//! component, plus the wall-clock it was last observed, behind a single
//! lock so a reader never sees a half-updated snapshot.

use chrono::Utc;
use parking_lot::RwLock;
use pipeline_model::{ComponentHealth, ComponentStatus, SystemHealth};
use std::collections::HashMap;
use std::time::Instant;

/// The four tracked components, in the order spec.md §2's table lists them.
pub const COMPONENTS: [&str; 4] = ["MDG", "DGW", "SE", "OEG"];

#[derive(Debug, Clone, Copy)]
struct Entry {
    status: ComponentStatus,
    started_at: Instant,
}

/// Shared, lock-guarded health board every part of the supervisor writes to
/// and [`HealthBoard::snapshot`] reads from for `get_system_health()`.
#[derive(Debug)]
pub struct HealthBoard {
    entries: RwLock<HashMap<String, Entry>>,
}

impl Default for HealthBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthBoard {
    pub fn new() -> Self {
        let now = Instant::now();
        let entries = COMPONENTS
            .iter()
            .map(|name| {
                (
                    name.to_string(),
                    Entry {
                        status: ComponentStatus::Stopped,
                        started_at: now,
                    },
                )
            })
            .collect();
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Records a component's new status, resetting its uptime clock if this
    /// is the transition into RUNNING.
    pub fn set_status(&self, component: &str, status: ComponentStatus) {
        let mut entries = self.entries.write();
        let entry = entries.entry(component.to_string()).or_insert(Entry {
            status,
            started_at: Instant::now(),
        });
        if status == ComponentStatus::Running && entry.status != ComponentStatus::Running {
            entry.started_at = Instant::now();
        }
        entry.status = status;
    }

    pub fn status_of(&self, component: &str) -> Option<ComponentStatus> {
        self.entries.read().get(component).map(|e| e.status)
    }

    /// Builds the [`SystemHealth`] snapshot `get_system_health()` returns.
    pub fn snapshot(&self) -> SystemHealth {
        let entries = self.entries.read();
        let mut health = SystemHealth::default();
        for (name, entry) in entries.iter() {
            health.set(
                name.clone(),
                ComponentHealth {
                    status: entry.status,
                    uptime_secs: entry.started_at.elapsed().as_secs(),
                    last_check: Utc::now(),
                },
            );
        }
        health
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_every_tracked_component_stopped() {
        let board = HealthBoard::new();
        let snapshot = board.snapshot();
        assert_eq!(snapshot.components.len(), COMPONENTS.len());
        assert!(!snapshot.is_healthy());
    }

    #[test]
    fn healthy_once_every_component_is_running() {
        let board = HealthBoard::new();
        for name in COMPONENTS {
            board.set_status(name, ComponentStatus::Running);
        }
        assert!(board.snapshot().is_healthy());
    }

    #[test]
    fn a_single_non_running_component_keeps_the_system_unhealthy() {
        let board = HealthBoard::new();
        for name in COMPONENTS {
            board.set_status(name, ComponentStatus::Running);
        }
        board.set_status("SE", ComponentStatus::Error);
        assert!(!board.snapshot().is_healthy());
    }
}
