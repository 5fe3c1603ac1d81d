#![forbid(unsafe_code)]
#![warn(missing_debug_implementations, rust_2018_idioms)]

//! # Pipeline Transport
//!
//! Thin wrappers around `zmq` sockets implementing the tick channel
//! (market data PUB/SUB), the signal channel (PUSH/PULL) and the order
//! channel (REQ/REP).
//!
//! Every socket here is bounded: binds/connects use explicit HWMs, and every
//! blocking call (`recv`) takes an explicit timeout. Nothing in this crate
//! blocks indefinitely.

mod error;
mod order_channel;
mod signal_channel;
mod tick_channel;

pub use error::TransportError;
pub use order_channel::{OrderReplier, OrderRequester, OrderRouter};
pub use signal_channel::{SignalPuller, SignalPusher};
pub use tick_channel::{TickPublisher, TickSubscriber};

/// Topic string stamped on every tick-channel frame.
pub const TICK_TOPIC: &str = "TICK";

fn new_context() -> zmq::Context {
    zmq::Context::new()
}
