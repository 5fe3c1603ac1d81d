use crate::{BrokerConnectionState, BrokerError, Credentials};
use pipeline_model::{OrderRequest, Position};

/// Observation of the broker session's health.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BrokerHealth {
    pub ok: bool,
    pub broker_connected: bool,
    pub uptime_secs: u64,
}

/// The broker API handle: authenticated, stateful, **non-reentrant**.
///
/// Exactly one thread in exactly one process may call methods on a given
/// implementation at a time. This crate does not enforce that itself — it
/// only models the interface — the `dgw` crate's single handler thread is
/// the enforcement point.
pub trait BrokerHandle: Send {
    /// Initiates authentication. Only the supervisor calls this; DGW does
    /// not hold credentials.
    fn authenticate(&self, credentials: &Credentials) -> Result<(), BrokerError>;

    /// Submits an order. At-most-once per `request_id` is DGW's
    /// responsibility (the dedupe cache), not this trait's.
    fn send_order(&self, request: &OrderRequest) -> Result<String, BrokerError>;

    /// Read-only position query; no side effects on broker state.
    fn get_positions(&self, account: &str, symbol: Option<&str>) -> Result<Vec<Position>, BrokerError>;

    /// Pure observation of connectivity and uptime.
    fn health_check(&self) -> BrokerHealth;

    fn connection_state(&self) -> BrokerConnectionState;
}
