//! Drives [`StrategyEngine`] over real loopback ZeroMQ sockets, the way the
//! supervisor wires MDG's publisher to SE's subscriber and SE's pusher to
//! OEG's puller in production (spec.md §8 end-to-end scenarios).

use pipeline_core::{InMemoryConditionStore, ShutdownFlag};
use pipeline_model::{Action, Condition, ConditionId, Tick, TickEvent};
use pipeline_se::StrategyEngine;
use pipeline_transport::{SignalPuller, SignalPusher, TickPublisher, TickSubscriber};
use rust_decimal_macros::dec;
use std::thread::sleep;
use std::time::Duration;

fn settle() {
    sleep(Duration::from_millis(150));
}

fn buy_condition() -> Condition {
    Condition::new(
        ConditionId::new("c1"),
        "MXFF5",
        Action::Buy,
        dec!(22000),
        dec!(30),
        1,
        dec!(120),
        dec!(30),
        false,
    )
    .unwrap()
}

fn harness(
    tick_port: u16,
    signal_port: u16,
    conditions: Vec<Condition>,
) -> (TickPublisher, SignalPuller, StrategyEngine<InMemoryConditionStore>) {
    let tick_bind = format!("tcp://127.0.0.1:{tick_port}");
    let signal_bind = format!("tcp://127.0.0.1:{signal_port}");

    let publisher = TickPublisher::bind(&tick_bind, 1_000).unwrap();
    let subscriber = TickSubscriber::connect(&tick_bind, 50).unwrap();
    let puller = SignalPuller::bind(&signal_bind, 50).unwrap();
    let pusher = SignalPusher::connect(&signal_bind, 1_000).unwrap();
    settle();

    let store = InMemoryConditionStore::new(conditions);
    let engine = StrategyEngine::new(subscriber, pusher, store, ShutdownFlag::new());
    (publisher, puller, engine)
}

fn send(publisher: &TickPublisher, commodity_id: &str, price: rust_decimal::Decimal) -> TickEvent {
    let event = TickEvent::new(chrono::Utc::now(), Tick::new(commodity_id, price).unwrap());
    publisher.publish(&event).unwrap();
    event
}

#[test]
fn scenario_4_duplicate_tick_yields_exactly_one_signal() {
    let (publisher, puller, mut engine) = harness(18_555, 18_556, vec![buy_condition()]);

    send(&publisher, "MXFF5", dec!(21995));
    engine.tick_once(); // Armed -> Triggered

    let entry = TickEvent::new(chrono::Utc::now(), Tick::new("MXFF5", dec!(22035)).unwrap());
    publisher.publish(&entry).unwrap();
    engine.tick_once(); // entry: emits BUY

    publisher.publish(&entry).unwrap(); // identical replay: same commodity_id and when
    engine.tick_once(); // deduplicated, no second transition

    let signal = puller.recv().unwrap();
    assert_eq!(signal.operation, Action::Buy);
    assert_eq!(signal.when, entry.when);
    assert!(puller.recv().is_err(), "no second BUY signal should exist");
    assert_eq!(engine.stats().ticks_duplicate, 1);
}

#[test]
fn clean_buy_cycle_emits_buy_then_sell() {
    let (publisher, puller, mut engine) = harness(18_557, 18_558, vec![buy_condition()]);

    for price in [dec!(22010), dec!(21995), dec!(21980), dec!(22035), dec!(22160)] {
        send(&publisher, "MXFF5", price);
        engine.tick_once();
    }

    let buy = puller.recv().unwrap();
    assert_eq!(buy.operation, Action::Buy);
    let sell = puller.recv().unwrap();
    assert_eq!(sell.operation, Action::Sell);
    assert_eq!(engine.stats().signals_emitted, 2);
}

#[test]
fn unrelated_commodity_ticks_do_not_drive_the_condition() {
    let (publisher, puller, mut engine) = harness(18_559, 18_560, vec![buy_condition()]);

    send(&publisher, "WINFG", dec!(1));
    engine.tick_once();
    assert!(puller.recv().is_err());
    assert_eq!(engine.stats().ticks_consumed, 1);
}
