use pipeline_model::wire::CodecError;

/// Every failure mode a tick/signal/order socket wrapper can report.
///
/// Callers translate this into [`pipeline_model::ErrorKind`] at the
/// component boundary (`TRANSPORT`/`CODEC`/`BUSY`).
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("zmq error: {0}")]
    Zmq(#[from] zmq::Error),
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    /// `recv` returned nothing within the configured timeout. Not fatal: the
    /// caller's poll loop simply continues.
    #[error("timed out waiting for a message")]
    Timeout,
    /// Non-blocking `send` would have blocked (HWM exceeded / peer not
    /// ready). Caller drops the message and counts it.
    #[error("send would block")]
    WouldBlock,
}
