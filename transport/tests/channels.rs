use chrono::Utc;
use pipeline_model::{Action, ConditionId, ORequest, OResponse, Tick, TickEvent, TradingSignal};
use pipeline_transport::{OrderReplier, OrderRequester, SignalPuller, SignalPusher, TickPublisher, TickSubscriber};
use rust_decimal_macros::dec;
use std::thread;
use std::time::Duration;

#[test]
fn tick_channel_delivers_published_event() {
    let publisher = TickPublisher::bind("inproc://test-tick-1", 1000).unwrap();
    let subscriber = TickSubscriber::connect("inproc://test-tick-1", 200).unwrap();
    // inproc subscribers must be connected before the publisher sends.
    thread::sleep(Duration::from_millis(50));

    let event = TickEvent::new(Utc::now(), Tick::new("MXFF5", dec!(22035)).unwrap());
    publisher.publish(&event).unwrap();

    let received = subscriber.recv().unwrap();
    assert_eq!(received, event);
}

#[test]
fn tick_subscriber_times_out_when_idle() {
    let _publisher = TickPublisher::bind("inproc://test-tick-2", 1000).unwrap();
    let subscriber = TickSubscriber::connect("inproc://test-tick-2", 50).unwrap();
    let result = subscriber.recv();
    assert!(result.is_err());
}

#[test]
fn signal_channel_is_fifo() {
    let puller = SignalPuller::bind("inproc://test-signal-1", 500).unwrap();
    let pusher = SignalPusher::connect("inproc://test-signal-1", 1000).unwrap();
    thread::sleep(Duration::from_millis(50));

    let make = |qty| TradingSignal {
        when: Utc::now(),
        operation: Action::Buy,
        commodity_id: "MXFF5".into(),
        condition_id: ConditionId::new("c1"),
        quantity: qty,
    };

    pusher.push(&make(1)).unwrap();
    pusher.push(&make(2)).unwrap();

    assert_eq!(puller.recv().unwrap().quantity, 1);
    assert_eq!(puller.recv().unwrap().quantity, 2);
}

#[test]
fn order_channel_round_trips_health_check() {
    let replier = OrderReplier::bind("inproc://test-order-1", 2000).unwrap();
    let handle = thread::spawn(move || {
        let request = replier.recv().unwrap();
        assert_eq!(request, ORequest::HealthCheck);
        replier
            .reply(&OResponse::HealthCheck(pipeline_model::HealthCheckResult {
                ok: true,
                broker_connected: true,
                uptime_secs: 42,
            }))
            .unwrap();
    });

    thread::sleep(Duration::from_millis(50));
    let requester = OrderRequester::new("inproc://test-order-1", 2000);
    let response = requester.request(&ORequest::HealthCheck).unwrap();
    match response {
        OResponse::HealthCheck(result) => {
            assert!(result.ok);
            assert_eq!(result.uptime_secs, 42);
        }
        other => panic!("unexpected response: {other:?}"),
    }
    handle.join().unwrap();
}
