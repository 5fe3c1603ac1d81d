#![forbid(unsafe_code)]
#![warn(
    unused,
    clippy::cognitive_complexity,
    unused_crate_dependencies,
    missing_debug_implementations,
    rust_2018_idioms
)]
#![allow(clippy::too_many_arguments)]

//! # Pipeline Model
//!
//! Shared domain types, request identifiers and the wire codec used across
//! every process in the trading pipeline (MDG, SE, OEG, DGW, Supervisor).
//!
//! Nothing in this crate talks to sockets or threads: it is the vocabulary
//! the rest of the workspace agrees on, plus the binary encode/decode rules
//! needed to move that vocabulary across channel T, S and O.

/// Market tick and its publish envelope.
pub mod tick;

/// User-configured strategy [`condition::Condition`] and its SE-owned runtime state.
pub mod condition;

/// Strategy-emitted [`signal::TradingSignal`].
pub mod signal;

/// Broker-bound [`order::OrderRequest`]/[`order::OrderResponse`] and [`order::Position`].
pub mod order;

/// Component lifecycle and aggregate system health.
pub mod health;

/// Crate-wide error kinds shared by every component.
pub mod error;

/// Binary wire codec (MessagePack) plus the decimal/timestamp wire shims.
pub mod wire;

/// Request identifier generation (ULID-like: time-ordered, unique per process).
pub mod request_id;

/// Order channel request/reply envelopes.
pub mod rpc;

pub use condition::{Condition, ConditionId, ConditionRuntimeState};
pub use error::ErrorKind;
pub use health::{ComponentHealth, ComponentStatus, SystemHealth};
pub use order::{DayTrade, OpenClose, OrderRequest, OrderResponse, OrderType, Position, TimeInForce};
pub use request_id::RequestId;
pub use rpc::{GetPositionsParams, HealthCheckResult, ORequest, OResponse};
pub use signal::TradingSignal;
pub use tick::{Tick, TickEvent};

/// Direction of a trade or a [`condition::Condition`]'s configured action.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Action {
    Buy,
    Sell,
}

crate::wire_enum!(Action {
    Buy = 0 => "BUY",
    Sell = 1 => "SELL",
});

impl Action {
    /// The opposite action, used when mirroring a condition's entry into its exit signal.
    pub fn opposite(self) -> Self {
        match self {
            Action::Buy => Action::Sell,
            Action::Sell => Action::Buy,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Buy => write!(f, "BUY"),
            Action::Sell => write!(f, "SELL"),
        }
    }
}
