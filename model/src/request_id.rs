use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static COUNTER: AtomicU32 = AtomicU32::new(0);

/// A ULID-like identifier: a 48-bit millisecond timestamp followed by 80 bits
/// of per-process entropy (a monotonic counter plus random bits), so ids
/// sort roughly by creation time while staying unique across a single OEG
/// process's lifetime.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize)]
pub struct RequestId {
    timestamp_ms: u64,
    entropy: u64,
}

impl RequestId {
    /// Constructs a [`RequestId`] from explicit parts. Used by tests and by
    /// [`RequestId::generate`].
    pub fn new(timestamp_ms: u64, entropy: u64) -> Self {
        Self {
            timestamp_ms,
            entropy,
        }
    }

    /// Generates a fresh, process-unique [`RequestId`] for the current instant.
    pub fn generate() -> Self {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        let counter = COUNTER.fetch_add(1, Ordering::Relaxed) as u64;
        let entropy = (counter << 32) | u64::from(rand::random::<u32>());
        Self {
            timestamp_ms,
            entropy,
        }
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:012x}-{:016x}", self.timestamp_ms, self.entropy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        let a = RequestId::generate();
        let b = RequestId::generate();
        assert_ne!(a, b);
    }
}
