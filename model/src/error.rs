/// The error kinds every component maps its failures onto.
///
/// This is the wire-level taxonomy carried on [`crate::OrderResponse`] and
/// used locally to decide whether a failure is recoverable in place or must
/// be surfaced to a caller/supervisor.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, thiserror::Error)]
pub enum ErrorKind {
    /// Failed to send/receive on a channel (timeout, disconnection).
    #[error("TRANSPORT")]
    Transport,
    /// Failed to encode/decode a frame.
    #[error("CODEC")]
    Codec,
    /// Exception inside the vendor data callback.
    #[error("VENDOR_CALLBACK")]
    VendorCallback,
    /// Broker returned a retryable error.
    #[error("BROKER_TRANSIENT")]
    BrokerTransient,
    /// Broker rejected the request logically (not retried).
    #[error("BROKER_INVALID")]
    BrokerInvalid,
    /// No broker session; triggers DGW reconnect loop.
    #[error("BROKER_DISCONNECTED")]
    BrokerDisconnected,
    /// DGW queue full, or SE/OEG queue overflow.
    #[error("BUSY")]
    Busy,
    /// A component failed to start or stop within its grace window.
    #[error("LIFECYCLE")]
    Lifecycle,
    /// Invalid/missing configuration at bootstrap. Fatal.
    #[error("CONFIG")]
    Config,
}

crate::wire_enum!(ErrorKind {
    Transport = 0 => "TRANSPORT",
    Codec = 1 => "CODEC",
    VendorCallback = 2 => "VENDOR_CALLBACK",
    BrokerTransient = 3 => "BROKER_TRANSIENT",
    BrokerInvalid = 4 => "BROKER_INVALID",
    BrokerDisconnected = 5 => "BROKER_DISCONNECTED",
    Busy = 6 => "BUSY",
    Lifecycle = 7 => "LIFECYCLE",
    Config = 8 => "CONFIG",
});

impl ErrorKind {
    /// Whether a failure of this kind is transient rather than immediately
    /// fatal. `TRANSPORT` is retried directly by OEG's resend loop;
    /// `BROKER_TRANSIENT` is a logical reply that shouldn't escalate a
    /// component to `ERROR` on its first occurrence either, only after it
    /// persists. Logical rejections (`BROKER_INVALID`) and every other kind
    /// are not retryable and surface or escalate immediately.
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::Transport | ErrorKind::BrokerTransient)
    }
}
