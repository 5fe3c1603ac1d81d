#![forbid(unsafe_code)]
#![warn(missing_debug_implementations, rust_2018_idioms)]

//! # Pipeline Broker
//!
//! Abstraction over the vendor broker API: a single, non-reentrant
//! [`BrokerHandle`] that the DLL/Broker Gateway (DGW) owns exclusively.
//! Two broker clients instantiating the same vendor library in the same
//! process is the exact fault this crate's single-owner discipline exists
//! to prevent.
//!
//! The real vendor integration is out of scope; this crate ships the
//! trait plus a [`mock::MockBroker`] so DGW, OEG and the supervisor can all
//! be built and tested against a real implementation of the interface. A
//! production build would add a second `BrokerHandle` implementation
//! behind an FFI feature flag, splitting a mock connector from a
//! platform-specific, feature-gated real backend — but only the mock
//! adapter ships here.

mod credentials;
mod error;
mod handle;
pub mod mock;
mod state;

pub use credentials::Credentials;
pub use error::BrokerError;
pub use handle::{BrokerHandle, BrokerHealth};
pub use mock::MockBroker;
pub use state::BrokerConnectionState;
