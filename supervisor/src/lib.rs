#![forbid(unsafe_code)]
#![warn(missing_debug_implementations, rust_2018_idioms)]

//! # Supervisor
//!
//! The Main process (spec.md §2, §4.E): hosts MDG and DGW in-process,
//! spawns Strategy Engine and Order Execution Gateway as independent
//! worker processes, and is the only component that ever starts or stops
//! another component.
//!
//! Startup is ordered — ports probed, then MDG, then DGW, then SE, then
//! OEG, each confirmed RUNNING before the next begins — and shutdown
//! reverses that order, OEG first and MDG last, each given a grace window
//! to exit on its own before being force-killed.

mod health;
mod ports;
mod process;
mod supervisor;

pub use health::HealthBoard;
pub use ports::{probe_all, probe_bindable, PortProbeError};
pub use process::{ProcessError, WorkerProcess};
pub use supervisor::{tracked_components, Supervisor, SupervisorOptions};
