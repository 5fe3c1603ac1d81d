use pipeline_model::ErrorKind;

/// Broker-side failures, generalized down to the three kinds the rest of
/// the pipeline distinguishes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BrokerError {
    /// Retryable broker-side failure (e.g. transient rate limit).
    #[error("broker transient error: {0}")]
    Transient(String),
    /// Logical rejection (bad account, bad symbol, insufficient margin).
    /// Never retried.
    #[error("broker rejected request: {0}")]
    Invalid(String),
    /// No active broker session.
    #[error("broker disconnected")]
    Disconnected,
}

impl BrokerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BrokerError::Transient(_) => ErrorKind::BrokerTransient,
            BrokerError::Invalid(_) => ErrorKind::BrokerInvalid,
            BrokerError::Disconnected => ErrorKind::BrokerDisconnected,
        }
    }
}
