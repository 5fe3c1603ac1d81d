use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};

/// Per-commodity ring buffer length, per spec.md §4.B
/// ("a bounded ring buffer (length 64 per commodity)").
const RING_CAPACITY: usize = 64;

/// Deduplicates ticks by `(commodity_id, when)` so a retransmitted or
/// replayed tick never produces a duplicate state transition.
#[derive(Debug, Default)]
pub struct TickDedupe {
    seen: HashMap<String, VecDeque<DateTime<Utc>>>,
}

impl TickDedupe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `(commodity_id, when)` as observed, returning `true` if it
    /// was already present in the ring (a duplicate to be skipped) or
    /// `false` if it was newly recorded.
    pub fn observe(&mut self, commodity_id: &str, when: DateTime<Utc>) -> bool {
        let ring = self.seen.entry(commodity_id.to_string()).or_default();
        if ring.contains(&when) {
            return true;
        }
        if ring.len() >= RING_CAPACITY {
            ring.pop_front();
        }
        ring.push_back(when);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(micros: i64) -> DateTime<Utc> {
        Utc.timestamp_micros(micros).single().unwrap()
    }

    #[test]
    fn first_observation_is_not_a_duplicate() {
        let mut dedupe = TickDedupe::new();
        assert!(!dedupe.observe("MXFF5", at(1)));
    }

    #[test]
    fn repeated_when_on_same_commodity_is_a_duplicate() {
        let mut dedupe = TickDedupe::new();
        assert!(!dedupe.observe("MXFF5", at(1)));
        assert!(dedupe.observe("MXFF5", at(1)));
    }

    #[test]
    fn same_when_on_different_commodities_is_not_a_duplicate() {
        let mut dedupe = TickDedupe::new();
        assert!(!dedupe.observe("MXFF5", at(1)));
        assert!(!dedupe.observe("WINFG", at(1)));
    }

    #[test]
    fn ring_evicts_oldest_beyond_capacity() {
        let mut dedupe = TickDedupe::new();
        for i in 0..RING_CAPACITY as i64 {
            assert!(!dedupe.observe("MXFF5", at(i)));
        }
        // at(0) has now been evicted; it is treated as new again.
        assert!(!dedupe.observe("MXFF5", at(RING_CAPACITY as i64)));
        assert!(!dedupe.observe("MXFF5", at(0)));
    }
}
