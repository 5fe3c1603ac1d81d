use crate::retry::backoff_after;
use pipeline_core::{SessionStore, ShutdownFlag};
use pipeline_model::{
    ComponentStatus, DayTrade, ErrorKind, ORequest, OResponse, OpenClose, OrderRequest, OrderType,
    RequestId, TimeInForce, TradingSignal,
};
use pipeline_transport::{OrderRequester, SignalPuller, TransportError};
use rust_decimal::Decimal;
use tracing::{info, warn};

/// Counters exposed for health reporting (spec.md §8).
#[derive(Debug, Default)]
pub struct OegStats {
    pub signals_consumed: u64,
    pub orders_accepted: u64,
    pub orders_rejected: u64,
    pub transport_failures: u64,
}

/// Number of consecutive transport failures (all retry attempts for one
/// order exhausted) that moves the gateway into `ERROR`. Not named
/// explicitly in spec.md; reusing the per-request retry count keeps a
/// single operator-facing knob instead of inventing a second one.
const DEFAULT_CONSECUTIVE_FAILURE_THRESHOLD: u32 = 5;

/// Order Execution Gateway: pulls [`TradingSignal`]s off channel S, turns
/// each into an [`OrderRequest`] scoped to the current session, and submits
/// it to DGW over channel O with bounded retry (spec.md §4.C).
#[derive(Debug)]
pub struct OrderExecutionGateway<S> {
    puller: SignalPuller,
    requester: OrderRequester,
    session: S,
    shutdown: ShutdownFlag,
    retry_count: u32,
    consecutive_failures: u32,
    consecutive_broker_transient_failures: u32,
    status: ComponentStatus,
    stats: OegStats,
}

impl<S: SessionStore> OrderExecutionGateway<S> {
    pub fn new(
        puller: SignalPuller,
        requester: OrderRequester,
        session: S,
        shutdown: ShutdownFlag,
        retry_count: u32,
    ) -> Self {
        Self {
            puller,
            requester,
            session,
            shutdown,
            retry_count: retry_count.max(1),
            consecutive_failures: 0,
            consecutive_broker_transient_failures: 0,
            status: ComponentStatus::Running,
            stats: OegStats::default(),
        }
    }

    pub fn stats(&self) -> &OegStats {
        &self.stats
    }

    pub fn status(&self) -> ComponentStatus {
        self.status
    }

    /// Runs the poll loop until [`ShutdownFlag::is_requested`].
    pub fn run(&mut self) {
        while !self.shutdown.is_requested() {
            self.tick_once();
        }
    }

    /// Runs exactly one poll iteration; exposed separately so tests can
    /// drive the loop deterministically.
    pub fn tick_once(&mut self) {
        let signal = match self.puller.recv() {
            Ok(signal) => signal,
            Err(TransportError::Timeout) => return,
            Err(e) => {
                warn!(event = "oeg.transport_error", error = %e, "signal puller error");
                return;
            }
        };
        self.stats.signals_consumed += 1;

        let request = self.build_order_request(&signal);
        self.submit(request);
    }

    fn build_order_request(&self, signal: &TradingSignal) -> OrderRequest {
        OrderRequest {
            account: self.session.account(),
            symbol: signal.commodity_id.to_string(),
            side: signal.operation,
            order_type: OrderType::Market,
            price: Decimal::ZERO,
            quantity: signal.quantity,
            open_close: OpenClose::Auto,
            time_in_force: TimeInForce::Ioc,
            day_trade: DayTrade::No,
            note: String::new(),
            request_id: RequestId::generate(),
        }
    }

    /// Submits `request`, retrying up to `retry_count` attempts only while
    /// the failure class is transport. The same `request_id` rides every
    /// attempt, so DGW's dedupe cache collapses any attempt that actually
    /// reached the broker before a later attempt's reply was lost.
    ///
    /// A logical response is never resubmitted. `BROKER_INVALID` (the
    /// broker rejected the order) and `BUSY` (DGW's queue is full) are
    /// expected operational outcomes and leave the gateway's status
    /// untouched. `BROKER_TRANSIENT` ([`ErrorKind::is_retryable`]) is
    /// tracked as a consecutive streak, the same way exhausted transport
    /// retries are, and only escalates past
    /// [`DEFAULT_CONSECUTIVE_FAILURE_THRESHOLD`]; it is not a "fatal
    /// response" on its own. Any other error kind on a reply is treated as
    /// fatal immediately.
    fn submit(&mut self, request: OrderRequest) {
        let envelope = ORequest::SendOrder(request.clone());
        let mut attempt = 0;
        loop {
            match self.requester.request(&envelope) {
                Ok(OResponse::SendOrder(response)) => {
                    self.consecutive_failures = 0;
                    if response.ok {
                        self.consecutive_broker_transient_failures = 0;
                        self.stats.orders_accepted += 1;
                        info!(
                            event = "order.accepted",
                            request_id = %request.request_id,
                            order_id = ?response.order_id,
                            "order accepted"
                        );
                    } else {
                        self.stats.orders_rejected += 1;
                        warn!(
                            event = "order.rejected",
                            request_id = %request.request_id,
                            error_kind = ?response.error_kind,
                            detail = ?response.error_detail,
                            "order rejected"
                        );
                        let retryable = response.error_kind.map(ErrorKind::is_retryable).unwrap_or(false);
                        let expected =
                            matches!(response.error_kind, Some(ErrorKind::BrokerInvalid) | Some(ErrorKind::Busy));
                        if retryable {
                            self.consecutive_broker_transient_failures += 1;
                            if self.consecutive_broker_transient_failures >= DEFAULT_CONSECUTIVE_FAILURE_THRESHOLD {
                                self.enter_error();
                            }
                        } else {
                            self.consecutive_broker_transient_failures = 0;
                            if !expected {
                                self.enter_error();
                            }
                        }
                    }
                    return;
                }
                Ok(other) => {
                    warn!(event = "oeg.protocol_error", response = ?other, "unexpected reply shape for send_order");
                    self.enter_error();
                    return;
                }
                Err(e) => {
                    attempt += 1;
                    if attempt >= self.retry_count {
                        self.stats.transport_failures += 1;
                        self.consecutive_failures += 1;
                        warn!(
                            event = "order.transport_exhausted",
                            request_id = %request.request_id,
                            error = %e,
                            attempts = attempt,
                            "order submission exhausted retries"
                        );
                        if self.consecutive_failures >= DEFAULT_CONSECUTIVE_FAILURE_THRESHOLD {
                            self.enter_error();
                        }
                        return;
                    }
                    warn!(
                        event = "order.transport_retry",
                        request_id = %request.request_id,
                        error = %e,
                        attempt,
                        "retrying order submission after transport failure"
                    );
                    std::thread::sleep(backoff_after(attempt - 1));
                }
            }
        }
    }

    fn enter_error(&mut self) {
        if self.status != ComponentStatus::Error {
            self.status = ComponentStatus::Error;
            warn!(event = "component.status_changed", component = "OEG", status = "ERROR");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeline_core::{InMemorySessionStore, SessionSnapshot};
    use pipeline_model::{Action, ConditionId, OrderResponse};
    use pipeline_transport::{OrderReplier, SignalPusher};
    use std::thread::sleep;
    use std::time::Duration;

    fn logged_in_session(account: &str) -> InMemorySessionStore {
        let store = InMemorySessionStore::default();
        store.publish(SessionSnapshot {
            logged_in: true,
            account: account.to_string(),
            token: "tok".to_string(),
        });
        store
    }

    fn settle() {
        sleep(Duration::from_millis(150));
    }

    fn sample_signal() -> TradingSignal {
        TradingSignal {
            when: chrono::Utc::now(),
            operation: Action::Buy,
            commodity_id: "MXFF5".into(),
            condition_id: ConditionId::new("c1"),
            quantity: 1,
        }
    }

    #[test]
    fn accepted_order_round_trips_through_a_mock_replier() {
        let signal_bind = "tcp://127.0.0.1:19555";
        let order_bind = "tcp://127.0.0.1:19556";

        let puller = SignalPuller::bind(signal_bind, 50).unwrap();
        let pusher = SignalPusher::connect(signal_bind, 100).unwrap();
        let replier = OrderReplier::bind(order_bind, 200).unwrap();
        let requester = OrderRequester::new(order_bind, 1_000);
        settle();

        let responder = std::thread::spawn(move || {
            let request = loop {
                match replier.recv() {
                    Ok(r) => break r,
                    Err(TransportError::Timeout) => continue,
                    Err(e) => panic!("unexpected error: {e}"),
                }
            };
            let ORequest::SendOrder(order) = request else {
                panic!("expected send_order");
            };
            replier
                .reply(&OResponse::SendOrder(OrderResponse::accepted(
                    "ORD-1",
                    order.request_id,
                )))
                .unwrap();
        });

        let mut gateway = OrderExecutionGateway::new(
            puller,
            requester,
            logged_in_session("ACC1"),
            ShutdownFlag::new(),
            3,
        );

        pusher.push(&sample_signal()).unwrap();
        gateway.tick_once();
        responder.join().unwrap();

        assert_eq!(gateway.stats().orders_accepted, 1);
        assert_eq!(gateway.stats().orders_rejected, 0);
        assert_eq!(gateway.status(), ComponentStatus::Running);
    }

    #[test]
    fn broker_rejection_is_not_retried_and_does_not_trip_error_status() {
        let signal_bind = "tcp://127.0.0.1:19557";
        let order_bind = "tcp://127.0.0.1:19558";

        let puller = SignalPuller::bind(signal_bind, 50).unwrap();
        let pusher = SignalPusher::connect(signal_bind, 100).unwrap();
        let replier = OrderReplier::bind(order_bind, 200).unwrap();
        let requester = OrderRequester::new(order_bind, 1_000);
        settle();

        let responder = std::thread::spawn(move || {
            let request = loop {
                match replier.recv() {
                    Ok(r) => break r,
                    Err(TransportError::Timeout) => continue,
                    Err(e) => panic!("unexpected error: {e}"),
                }
            };
            let ORequest::SendOrder(order) = request else {
                panic!("expected send_order");
            };
            replier
                .reply(&OResponse::SendOrder(OrderResponse::rejected(
                    ErrorKind::BrokerInvalid,
                    "insufficient margin",
                    order.request_id,
                )))
                .unwrap();
        });

        let mut gateway = OrderExecutionGateway::new(
            puller,
            requester,
            logged_in_session("ACC1"),
            ShutdownFlag::new(),
            3,
        );

        pusher.push(&sample_signal()).unwrap();
        gateway.tick_once();
        responder.join().unwrap();

        assert_eq!(gateway.stats().orders_rejected, 1);
        assert_eq!(gateway.status(), ComponentStatus::Running);
    }

    #[test]
    fn consecutive_broker_transient_rejections_escalate_only_past_threshold() {
        let signal_bind = "tcp://127.0.0.1:19561";
        let order_bind = "tcp://127.0.0.1:19562";

        let puller = SignalPuller::bind(signal_bind, 50).unwrap();
        let pusher = SignalPusher::connect(signal_bind, 100).unwrap();
        let replier = OrderReplier::bind(order_bind, 200).unwrap();
        let requester = OrderRequester::new(order_bind, 1_000);
        settle();

        let responder = std::thread::spawn(move || {
            for _ in 0..5 {
                let request = loop {
                    match replier.recv() {
                        Ok(r) => break r,
                        Err(TransportError::Timeout) => continue,
                        Err(e) => panic!("unexpected error: {e}"),
                    }
                };
                let ORequest::SendOrder(order) = request else {
                    panic!("expected send_order");
                };
                replier
                    .reply(&OResponse::SendOrder(OrderResponse::rejected(
                        ErrorKind::BrokerTransient,
                        "rate limited",
                        order.request_id,
                    )))
                    .unwrap();
            }
        });

        let mut gateway = OrderExecutionGateway::new(
            puller,
            requester,
            logged_in_session("ACC1"),
            ShutdownFlag::new(),
            3,
        );

        for attempt in 0..5 {
            pusher.push(&sample_signal()).unwrap();
            gateway.tick_once();
            if attempt + 1 < DEFAULT_CONSECUTIVE_FAILURE_THRESHOLD as i32 {
                assert_eq!(
                    gateway.status(),
                    ComponentStatus::Running,
                    "escalated before reaching the consecutive-failure threshold"
                );
            }
        }
        responder.join().unwrap();

        assert_eq!(gateway.stats().orders_rejected, 5);
        assert_eq!(gateway.status(), ComponentStatus::Error);
    }

    #[test]
    fn exhausted_transport_retries_are_counted_without_a_live_replier() {
        let signal_bind = "tcp://127.0.0.1:19559";
        let order_bind = "tcp://127.0.0.1:19560"; // nothing bound here

        let puller = SignalPuller::bind(signal_bind, 50).unwrap();
        let pusher = SignalPusher::connect(signal_bind, 100).unwrap();
        let requester = OrderRequester::new(order_bind, 80);
        settle();

        let mut gateway = OrderExecutionGateway::new(
            puller,
            requester,
            logged_in_session("ACC1"),
            ShutdownFlag::new(),
            2,
        );

        pusher.push(&sample_signal()).unwrap();
        gateway.tick_once();

        assert_eq!(gateway.stats().transport_failures, 1);
        assert_eq!(gateway.stats().orders_accepted, 0);
    }
}
