#![forbid(unsafe_code)]
#![warn(missing_debug_implementations, rust_2018_idioms)]

//! # DLL/Broker Gateway (DGW)
//!
//! The sole process-wide owner of the broker API handle (spec.md §4.D):
//! serializes every order, position and health operation behind a single
//! handler thread, dedupes replayed `request_id`s, and rejects with `BUSY`
//! once its bounded handler queue is full rather than blocking a caller.
//!
//! Two threads only, exactly as spec.md §5 allows DGW: the reader thread
//! (this crate's [`gateway::DgwGateway::run`] caller) drains channel O and
//! feeds the bounded queue; the handler thread is the only one ever allowed
//! to touch [`pipeline_broker::BrokerHandle`].

mod dedupe;
mod gateway;
mod handler;
mod reconnect;

pub use dedupe::RequestDedupeCache;
pub use gateway::{DgwGateway, DgwStats};
pub use handler::BrokerHandler;
pub use reconnect::ReconnectPolicy;
