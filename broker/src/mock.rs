//! In-memory broker simulation standing in for the vendor DLL. A handful
//! of atomics and a mutex-guarded position book, no real network or FFI
//! calls.

use crate::{BrokerConnectionState, BrokerError, BrokerHandle, BrokerHealth, Credentials};
use parking_lot::Mutex;
use pipeline_model::{Action, OrderRequest, Position};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// A deterministic, in-process broker stand-in.
///
/// Test code can script failures via [`MockBroker::inject_failure`] and
/// observe submitted orders via [`MockBroker::submitted_orders`] — this is
/// what DGW's and OEG's tests run against.
#[derive(Debug)]
pub struct MockBroker {
    started_at: Instant,
    state: Mutex<BrokerConnectionState>,
    positions: Mutex<HashMap<String, Vec<Position>>>,
    submitted: Mutex<Vec<OrderRequest>>,
    next_order_id: AtomicU64,
    next_failure: Mutex<Option<BrokerError>>,
}

impl Default for MockBroker {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBroker {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            state: Mutex::new(BrokerConnectionState::Disconnected),
            positions: Mutex::new(HashMap::new()),
            submitted: Mutex::new(Vec::new()),
            next_order_id: AtomicU64::new(1),
            next_failure: Mutex::new(None),
        }
    }

    /// Schedules the next [`BrokerHandle::send_order`] call to fail with
    /// `error` instead of succeeding. Consumed on use.
    pub fn inject_failure(&self, error: BrokerError) {
        *self.next_failure.lock() = Some(error);
    }

    /// Forces the connection state, simulating disconnects/degradation for
    /// reconnect-backoff tests.
    pub fn set_connection_state(&self, state: BrokerConnectionState) {
        *self.state.lock() = state;
    }

    pub fn seed_position(&self, position: Position) {
        self.positions
            .lock()
            .entry(position.account.clone())
            .or_default()
            .push(position);
    }

    pub fn submitted_orders(&self) -> Vec<OrderRequest> {
        self.submitted.lock().clone()
    }
}

impl BrokerHandle for MockBroker {
    fn authenticate(&self, _credentials: &Credentials) -> Result<(), BrokerError> {
        *self.state.lock() = BrokerConnectionState::Authenticating;
        *self.state.lock() = BrokerConnectionState::Connected;
        Ok(())
    }

    fn send_order(&self, request: &OrderRequest) -> Result<String, BrokerError> {
        if let Some(err) = self.next_failure.lock().take() {
            return Err(err);
        }
        if !self.connection_state().is_connected() {
            return Err(BrokerError::Disconnected);
        }
        if request.account.is_empty() || request.symbol.is_empty() {
            return Err(BrokerError::Invalid(
                "account and symbol must be non-empty".into(),
            ));
        }

        let order_id = self.next_order_id.fetch_add(1, Ordering::Relaxed);
        let mut positions = self.positions.lock();
        let book = positions.entry(request.account.clone()).or_default();
        match book.iter_mut().find(|p| p.symbol == request.symbol) {
            Some(existing) if existing.side == request.side => {
                existing.quantity += request.quantity;
            }
            Some(existing) => {
                if existing.quantity > request.quantity {
                    existing.quantity -= request.quantity;
                } else {
                    let remainder = request.quantity - existing.quantity;
                    existing.quantity = remainder;
                    existing.side = request.side;
                }
            }
            None => book.push(Position {
                account: request.account.clone(),
                symbol: request.symbol.clone(),
                side: request.side,
                quantity: request.quantity,
                avg_price: request.price,
            }),
        }
        drop(positions);

        self.submitted.lock().push(request.clone());
        Ok(format!("ORD-{order_id}"))
    }

    fn get_positions(&self, account: &str, symbol: Option<&str>) -> Result<Vec<Position>, BrokerError> {
        if !self.connection_state().is_connected() {
            return Err(BrokerError::Disconnected);
        }
        let positions = self.positions.lock();
        let Some(book) = positions.get(account) else {
            return Ok(Vec::new());
        };
        Ok(book
            .iter()
            .filter(|p| symbol.map_or(true, |s| p.symbol == s))
            .cloned()
            .collect())
    }

    fn health_check(&self) -> BrokerHealth {
        let state = self.connection_state();
        BrokerHealth {
            ok: true,
            broker_connected: state.is_connected(),
            uptime_secs: self.started_at.elapsed().as_secs(),
        }
    }

    fn connection_state(&self) -> BrokerConnectionState {
        *self.state.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn order(account: &str, symbol: &str, side: Action, qty: u32) -> OrderRequest {
        OrderRequest {
            account: account.into(),
            symbol: symbol.into(),
            side,
            order_type: pipeline_model::OrderType::Market,
            price: dec!(0),
            quantity: qty,
            open_close: pipeline_model::OpenClose::Auto,
            time_in_force: pipeline_model::TimeInForce::Ioc,
            day_trade: pipeline_model::DayTrade::No,
            note: String::new(),
            request_id: pipeline_model::RequestId::generate(),
        }
    }

    #[test]
    fn rejects_orders_while_disconnected() {
        let broker = MockBroker::new();
        let result = broker.send_order(&order("ACC1", "MXFF5", Action::Buy, 1));
        assert_eq!(result, Err(BrokerError::Disconnected));
    }

    #[test]
    fn authenticated_broker_accepts_and_tracks_orders() {
        let broker = MockBroker::new();
        broker
            .authenticate(&Credentials {
                activation_key: String::new(),
                user: "u".into(),
                password: "p".into(),
            })
            .unwrap();

        let order_id = broker
            .send_order(&order("ACC1", "MXFF5", Action::Buy, 1))
            .unwrap();
        assert!(order_id.starts_with("ORD-"));

        let positions = broker.get_positions("ACC1", None).unwrap();
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].quantity, 1);
    }

    #[test]
    fn injected_failure_is_returned_once() {
        let broker = MockBroker::new();
        broker
            .authenticate(&Credentials {
                activation_key: String::new(),
                user: "u".into(),
                password: "p".into(),
            })
            .unwrap();
        broker.inject_failure(BrokerError::Transient("timeout".into()));

        let first = broker.send_order(&order("ACC1", "MXFF5", Action::Buy, 1));
        assert!(matches!(first, Err(BrokerError::Transient(_))));

        let second = broker.send_order(&order("ACC1", "MXFF5", Action::Buy, 1));
        assert!(second.is_ok());
    }
}
