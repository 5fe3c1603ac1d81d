//! Typed runtime configuration, recognized options per spec.md §6.
//!
//! Loading an actual env file is an external collaborator's job (out of
//! scope, see spec.md §1 Non-goals); this module only defines the shape and
//! the defaults, plus a constructor from an already-loaded string map so
//! tests and callers can build a [`Config`] without touching `std::env`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Every bind/connect address and tunable spec.md §6 names, with the
/// defaults it states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub market_bind: String,
    pub market_connect: String,
    pub signal_bind: String,
    pub signal_connect: String,
    pub order_bind: String,
    pub order_connect: String,
    pub order_request_timeout_ms: u32,
    pub order_retry_count: u32,
    pub tick_hwm: i32,
    pub signal_hwm: i32,
    pub dgw_queue_capacity: usize,
    pub shutdown_grace_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            market_bind: "tcp://*:5555".to_string(),
            market_connect: "tcp://127.0.0.1:5555".to_string(),
            signal_bind: "tcp://*:5556".to_string(),
            signal_connect: "tcp://127.0.0.1:5556".to_string(),
            order_bind: "tcp://*:5557".to_string(),
            order_connect: "tcp://127.0.0.1:5557".to_string(),
            order_request_timeout_ms: 5_000,
            order_retry_count: 3,
            tick_hwm: 100_000,
            signal_hwm: 1_024,
            dgw_queue_capacity: 256,
            shutdown_grace_ms: 2_000,
        }
    }
}

/// A raw value in the env map could not be parsed into its target field type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value for {field}: {value:?}")]
pub struct ConfigParseError {
    field: &'static str,
    value: String,
}

impl Config {
    /// Builds a [`Config`] starting from [`Config::default`] and overriding
    /// any field present in `vars`, keyed by its `SCREAMING_SNAKE_CASE` name
    /// (e.g. `ORDER_RETRY_COUNT`). Unknown keys are ignored; a present key
    /// with an unparseable value is a [`ConfigParseError`].
    pub fn from_env_map(vars: &HashMap<String, String>) -> Result<Self, ConfigParseError> {
        let mut config = Self::default();

        macro_rules! str_field {
            ($key:literal, $field:ident) => {
                if let Some(v) = vars.get($key) {
                    config.$field = v.clone();
                }
            };
        }
        macro_rules! num_field {
            ($key:literal, $field:ident) => {
                if let Some(v) = vars.get($key) {
                    config.$field = v.parse().map_err(|_| ConfigParseError {
                        field: $key,
                        value: v.clone(),
                    })?;
                }
            };
        }

        str_field!("MARKET_BIND", market_bind);
        str_field!("MARKET_CONNECT", market_connect);
        str_field!("SIGNAL_BIND", signal_bind);
        str_field!("SIGNAL_CONNECT", signal_connect);
        str_field!("ORDER_BIND", order_bind);
        str_field!("ORDER_CONNECT", order_connect);
        num_field!("ORDER_REQUEST_TIMEOUT_MS", order_request_timeout_ms);
        num_field!("ORDER_RETRY_COUNT", order_retry_count);
        num_field!("TICK_HWM", tick_hwm);
        num_field!("SIGNAL_HWM", signal_hwm);
        num_field!("DGW_QUEUE_CAPACITY", dgw_queue_capacity);
        num_field!("SHUTDOWN_GRACE_MS", shutdown_grace_ms);

        Ok(config)
    }
}
