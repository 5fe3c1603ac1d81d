//! Strategy Engine binary (Worker-1). Spawned by the supervisor as a child
//! process; connects to channel T and channel S, then runs
//! [`pipeline_se::StrategyEngine`]'s poll loop until shutdown.

use pipeline_core::{Config, InMemoryConditionStore, PipelineError, ShutdownFlag};
use pipeline_model::Condition;
use pipeline_se::StrategyEngine;
use pipeline_transport::{SignalPusher, TickSubscriber};
use std::collections::HashMap;
use std::io::Write;
use tracing::info;

const TICK_POLL_TIMEOUT_MS: i32 = 10;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> Result<(), PipelineError> {
    pipeline_core::logging::init_logging();
    let vars: HashMap<String, String> = std::env::vars().collect();
    let config = Config::from_env_map(&vars).map_err(|e| PipelineError::Config(e.to_string()))?;

    let subscriber = TickSubscriber::connect(&config.market_connect, TICK_POLL_TIMEOUT_MS)?;
    let pusher = SignalPusher::connect(&config.signal_connect, config.signal_hwm)?;
    let store = InMemoryConditionStore::new(load_conditions(&vars)?);
    let shutdown = ShutdownFlag::new();
    spawn_shutdown_listener(shutdown.clone());

    info!(event = "component.status_changed", component = "SE", status = "RUNNING");
    println!("READY");
    std::io::stdout().flush().ok();

    let mut engine = StrategyEngine::new(subscriber, pusher, store, shutdown);
    tokio::task::spawn_blocking(move || engine.run())
        .await
        .map_err(|e| PipelineError::Lifecycle(e.to_string()))?;

    info!(event = "component.status_changed", component = "SE", status = "STOPPED");
    Ok(())
}

/// Conditions are an external repository's job (spec.md §1 Non-goals); this
/// bin only knows how to seed an in-memory snapshot from an optional JSON
/// file path, so the worker is runnable standalone.
fn load_conditions(vars: &HashMap<String, String>) -> Result<Vec<Condition>, PipelineError> {
    let Some(path) = vars.get("CONDITIONS_PATH") else {
        return Ok(Vec::new());
    };
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| PipelineError::Config(e.to_string()))
}

fn spawn_shutdown_listener(flag: ShutdownFlag) {
    tokio::spawn(async move {
        wait_for_termination().await;
        flag.request();
    });
}

#[cfg(unix)]
async fn wait_for_termination() {
    let mut term = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        .expect("failed to install SIGTERM handler");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = term.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_termination() {
    let _ = tokio::signal::ctrl_c().await;
}
