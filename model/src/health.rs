use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lifecycle state of any of the four components or the Supervisor itself.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ComponentStatus {
    Stopped,
    Starting,
    Running,
    Stopping,
    Error,
}

crate::wire_enum!(ComponentStatus {
    Stopped = 0 => "STOPPED",
    Starting = 1 => "STARTING",
    Running = 2 => "RUNNING",
    Stopping = 3 => "STOPPING",
    Error = 4 => "ERROR",
});

/// One component's health record within a [`SystemHealth`] snapshot.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    pub uptime_secs: u64,
    pub last_check: DateTime<Utc>,
}

/// Aggregate health of the whole pipeline, keyed by component name.
///
/// `is_healthy()` is computed rather than stored, so it can never drift from
/// the per-component statuses it is derived from.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct SystemHealth {
    pub components: BTreeMap<String, ComponentHealth>,
}

impl SystemHealth {
    /// True iff every tracked component is RUNNING.
    pub fn is_healthy(&self) -> bool {
        !self.components.is_empty()
            && self
                .components
                .values()
                .all(|c| c.status == ComponentStatus::Running)
    }

    pub fn set(&mut self, name: impl Into<String>, health: ComponentHealth) {
        self.components.insert(name.into(), health);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn health(status: ComponentStatus) -> ComponentHealth {
        ComponentHealth {
            status,
            uptime_secs: 1,
            last_check: Utc::now(),
        }
    }

    #[test]
    fn empty_system_is_not_healthy() {
        assert!(!SystemHealth::default().is_healthy());
    }

    #[test]
    fn healthy_requires_all_running() {
        let mut sys = SystemHealth::default();
        sys.set("MDG", health(ComponentStatus::Running));
        sys.set("SE", health(ComponentStatus::Running));
        assert!(sys.is_healthy());

        sys.set("OEG", health(ComponentStatus::Starting));
        assert!(!sys.is_healthy());
    }
}
