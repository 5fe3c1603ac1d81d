#![forbid(unsafe_code)]
#![warn(missing_debug_implementations, rust_2018_idioms)]

//! # Pipeline Core
//!
//! The ambient stack shared by every component binary: logging, the
//! aggregate error type, runtime configuration, the cooperative shutdown
//! flag, PID file bookkeeping, and the session/condition store interfaces
//! spec.md §6 describes as "consumed, not implemented".
//!
//! Nothing here runs a socket or a broker call itself — that is `mdg`,
//! `se`, `oeg`, `dgw` and `supervisor`'s job, each built on top of this
//! crate plus `pipeline-transport` and `pipeline-broker`.

pub mod condition_store;
pub mod config;
pub mod error;
pub mod logging;
pub mod pidfile;
pub mod session;
pub mod shutdown;

pub use condition_store::{ConditionStore, InMemoryConditionStore};
pub use config::Config;
pub use error::PipelineError;
pub use pidfile::PidFile;
pub use session::{InMemorySessionStore, SessionSnapshot, SessionStore};
pub use shutdown::ShutdownFlag;
