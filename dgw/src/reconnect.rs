use std::time::{Duration, Instant};

/// Backoff schedule attempted while the broker session is disconnected
/// (spec.md §4.D): 1s, 2s, 5s, 10s, then capped at 30s.
const SCHEDULE_SECS: [u64; 4] = [1, 2, 5, 10];
const CAP_SECS: u64 = 30;

/// Tracks when the handler loop should next attempt
/// [`pipeline_broker::BrokerHandle::authenticate`] after a disconnect.
#[derive(Debug)]
pub struct ReconnectPolicy {
    step: usize,
    next_attempt_at: Option<Instant>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl ReconnectPolicy {
    pub fn new() -> Self {
        Self {
            step: 0,
            // Due immediately the first time the handler observes a
            // disconnect.
            next_attempt_at: None,
        }
    }

    /// Whether a reconnect attempt is due right now.
    pub fn due(&self) -> bool {
        self.next_attempt_at.map_or(true, |t| Instant::now() >= t)
    }

    /// Resets the schedule after a successful reconnect.
    pub fn reset(&mut self) {
        self.step = 0;
        self.next_attempt_at = None;
    }

    /// Schedules the next attempt after a failed one.
    pub fn advance(&mut self) {
        let secs = SCHEDULE_SECS.get(self.step).copied().unwrap_or(CAP_SECS);
        self.step = self.step.saturating_add(1);
        self.next_attempt_at = Some(Instant::now() + Duration::from_secs(secs));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_immediately_on_construction() {
        assert!(ReconnectPolicy::new().due());
    }

    #[test]
    fn advance_schedules_a_future_attempt() {
        let mut policy = ReconnectPolicy::new();
        policy.advance();
        assert!(!policy.due());
    }

    #[test]
    fn reset_makes_it_due_again() {
        let mut policy = ReconnectPolicy::new();
        policy.advance();
        policy.reset();
        assert!(policy.due());
    }

    #[test]
    fn schedule_saturates_at_the_cap_past_the_table() {
        let mut policy = ReconnectPolicy::new();
        for _ in 0..10 {
            policy.advance();
        }
        // Past the table, every subsequent step still uses CAP_SECS; just
        // confirm it doesn't panic and stays not-due.
        assert!(!policy.due());
    }
}
