//! Transport-failure retry policy for channel O requests (spec.md §4.C).
//!
//! Only failures classified as transport (timeouts, socket errors) are
//! retried; a broker's logical rejection of an order is returned to the
//! caller on the first attempt.

use std::time::Duration;

/// Backoff applied after each failed attempt, before the next one. The last
/// entry repeats if more attempts are configured than this table has
/// entries.
const BACKOFF_MS: [u64; 3] = [100, 300, 900];

/// Returns the delay to sleep after the attempt at `attempt_index` (0-based)
/// has failed, before making the next attempt.
pub fn backoff_after(attempt_index: usize) -> Duration {
    let ms = BACKOFF_MS[attempt_index.min(BACKOFF_MS.len() - 1)];
    Duration::from_millis(ms)
}
