//! Aggregate error type for components that wire together the ambient
//! stack (config, session, condition store, transport, broker).
//!
//! Individual crates (`pipeline-transport`, `pipeline-broker`) keep their own
//! narrow error enums; this one exists for the binaries (`mdg`, `se`, `oeg`,
//! `dgw`, `supervisor`) that need a single `Result<T, PipelineError>` to
//! return from `main`.

use pipeline_broker::BrokerError;
use pipeline_model::ErrorKind;
use pipeline_transport::TransportError;

/// Top-level error for a component binary's `main`.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("broker error: {0}")]
    Broker(#[from] BrokerError),

    #[error("invalid or missing configuration: {0}")]
    Config(String),

    #[error("component failed to start or stop within its grace window: {0}")]
    Lifecycle(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Maps this error onto the wire-level [`ErrorKind`] taxonomy spec.md §7
    /// defines, for components that need to report one.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Transport(_) => ErrorKind::Transport,
            PipelineError::Broker(e) => e.kind(),
            PipelineError::Config(_) => ErrorKind::Config,
            PipelineError::Lifecycle(_) => ErrorKind::Lifecycle,
            PipelineError::Io(_) => ErrorKind::Transport,
        }
    }
}
