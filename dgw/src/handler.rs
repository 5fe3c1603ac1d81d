use crate::dedupe::RequestDedupeCache;
use pipeline_broker::{BrokerConnectionState, BrokerHandle, Credentials};
use pipeline_model::{GetPositionsParams, HealthCheckResult, ORequest, OResponse, OrderRequest, OrderResponse, Position};
use tracing::{info, warn};

/// The exclusive caller of `broker`'s methods (spec.md §4.D, §5): every
/// [`Self::handle`] call runs on DGW's single handler thread, never
/// concurrently with another.
#[derive(Debug)]
pub struct BrokerHandler<B> {
    broker: B,
    dedupe: RequestDedupeCache,
}

impl<B: BrokerHandle> BrokerHandler<B> {
    pub fn new(broker: B, dedupe_capacity: usize) -> Self {
        Self {
            broker,
            dedupe: RequestDedupeCache::new(dedupe_capacity),
        }
    }

    pub fn connection_state(&self) -> BrokerConnectionState {
        self.broker.connection_state()
    }

    /// Attempts authentication; called by the handler loop's reconnect
    /// check, never by the reader thread.
    pub fn reconnect(&self, credentials: &Credentials) -> Result<(), pipeline_broker::BrokerError> {
        self.broker.authenticate(credentials)
    }

    pub fn handle(&mut self, request: ORequest) -> OResponse {
        match request {
            ORequest::SendOrder(order) => OResponse::SendOrder(self.handle_send_order(order)),
            ORequest::GetPositions(params) => OResponse::GetPositions(self.handle_get_positions(params)),
            ORequest::HealthCheck => OResponse::HealthCheck(self.handle_health_check()),
        }
    }

    fn handle_send_order(&mut self, order: OrderRequest) -> OrderResponse {
        if let Some(cached) = self.dedupe.get(order.request_id) {
            info!(event = "order.deduped", request_id = %order.request_id, "replaying cached response for known request_id");
            return cached;
        }

        let response = match self.broker.send_order(&order) {
            Ok(order_id) => OrderResponse::accepted(order_id, order.request_id),
            Err(err) => OrderResponse::rejected(err.kind(), err.to_string(), order.request_id),
        };
        self.dedupe.insert(order.request_id, response.clone());
        response
    }

    fn handle_get_positions(&self, params: GetPositionsParams) -> Vec<Position> {
        match self.broker.get_positions(&params.account, params.symbol.as_deref()) {
            Ok(positions) => positions,
            Err(err) => {
                warn!(event = "dgw.get_positions_failed", error = %err, "returning an empty position list");
                Vec::new()
            }
        }
    }

    fn handle_health_check(&self) -> HealthCheckResult {
        let health = self.broker.health_check();
        HealthCheckResult {
            ok: health.ok,
            broker_connected: health.broker_connected,
            uptime_secs: health.uptime_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeline_broker::MockBroker;
    use pipeline_model::{Action, DayTrade, ErrorKind, OpenClose, OrderType, RequestId, TimeInForce};
    use rust_decimal_macros::dec;

    fn order(request_id: RequestId) -> OrderRequest {
        OrderRequest {
            account: "ACC1".into(),
            symbol: "MXFF5".into(),
            side: Action::Buy,
            order_type: OrderType::Market,
            price: dec!(0),
            quantity: 1,
            open_close: OpenClose::Auto,
            time_in_force: TimeInForce::Ioc,
            day_trade: DayTrade::No,
            note: String::new(),
            request_id,
        }
    }

    fn connected_broker() -> MockBroker {
        let broker = MockBroker::new();
        broker
            .authenticate(&Credentials {
                activation_key: String::new(),
                user: "u".into(),
                password: "p".into(),
            })
            .unwrap();
        broker
    }

    #[test]
    fn accepted_send_order_is_cached_and_replayed() {
        let mut handler = BrokerHandler::new(connected_broker(), 16);
        let request_id = RequestId::generate();

        let first = handler.handle_send_order(order(request_id));
        assert!(first.ok);

        let second = handler.handle_send_order(order(request_id));
        assert_eq!(first, second);
    }

    #[test]
    fn disconnected_broker_yields_disconnected_error_kind() {
        let mut handler = BrokerHandler::new(MockBroker::new(), 16);
        let response = handler.handle_send_order(order(RequestId::generate()));
        assert!(!response.ok);
        assert_eq!(response.error_kind, Some(ErrorKind::BrokerDisconnected));
    }

    #[test]
    fn get_positions_surfaces_broker_state() {
        let broker = connected_broker();
        broker.seed_position(Position {
            account: "ACC1".into(),
            symbol: "MXFF5".into(),
            side: Action::Buy,
            quantity: 2,
            avg_price: dec!(22000),
        });
        let mut handler = BrokerHandler::new(broker, 16);

        let response = handler.handle(ORequest::GetPositions(GetPositionsParams {
            account: "ACC1".into(),
            symbol: None,
        }));
        match response {
            OResponse::GetPositions(positions) => assert_eq!(positions.len(), 1),
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[test]
    fn health_check_reports_connectivity() {
        let mut handler = BrokerHandler::new(connected_broker(), 16);
        match handler.handle(ORequest::HealthCheck) {
            OResponse::HealthCheck(result) => assert!(result.broker_connected),
            other => panic!("unexpected response: {other:?}"),
        }
    }
}
