use crate::{OrderRequest, OrderResponse, Position};
use serde::{Deserialize, Serialize};

/// The order channel's request envelope: one of the three DGW operations,
/// tagged by name so the wire form matches
/// `{"operation": "...", "parameters": {...}}` literally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", content = "parameters", rename_all = "snake_case")]
pub enum ORequest {
    SendOrder(OrderRequest),
    GetPositions(GetPositionsParams),
    HealthCheck,
}

/// Parameters for the `get_positions` operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetPositionsParams {
    pub account: String,
    pub symbol: Option<String>,
}

/// The order channel's reply envelope, mirroring [`ORequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", content = "result", rename_all = "snake_case")]
pub enum OResponse {
    SendOrder(OrderResponse),
    GetPositions(Vec<Position>),
    HealthCheck(HealthCheckResult),
}

/// Result of the `health_check` operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub ok: bool,
    pub broker_connected: bool,
    pub uptime_secs: u64,
}
