#![forbid(unsafe_code)]
#![warn(missing_debug_implementations, rust_2018_idioms)]

//! # Strategy Engine (SE)
//!
//! Maintains a deterministic state machine per [`pipeline_model::Condition`]
//! over the tick stream and emits at-most-one entry and at-most-one exit
//! [`pipeline_model::TradingSignal`] per position cycle (spec.md §4.B).
//!
//! Runs as a single-threaded cooperative loop: poll channel T with a bounded
//! timeout, deduplicate by `(commodity_id, when)`, drive every matching
//! condition's state machine, push zero or more signals on channel S.

mod condition_state;
mod dedupe;
mod engine;

pub use condition_state::ConditionState;
pub use dedupe::TickDedupe;
pub use engine::{SeStats, StrategyEngine};
