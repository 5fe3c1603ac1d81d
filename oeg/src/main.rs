//! Order Execution Gateway binary (Worker-2). Spawned by the supervisor as a
//! child process; connects to channel S and channel O, then runs
//! [`pipeline_oeg::OrderExecutionGateway`]'s poll loop until shutdown.

use pipeline_core::{Config, InMemorySessionStore, PipelineError, SessionSnapshot, ShutdownFlag};
use pipeline_oeg::OrderExecutionGateway;
use pipeline_transport::{OrderRequester, SignalPuller};
use std::collections::HashMap;
use std::io::Write;
use tracing::info;

const SIGNAL_POLL_TIMEOUT_MS: i32 = 100;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> Result<(), PipelineError> {
    pipeline_core::logging::init_logging();
    let vars: HashMap<String, String> = std::env::vars().collect();
    let config = Config::from_env_map(&vars).map_err(|e| PipelineError::Config(e.to_string()))?;

    let puller = SignalPuller::bind(&config.signal_bind, SIGNAL_POLL_TIMEOUT_MS)?;
    let requester = OrderRequester::new(&config.order_connect, config.order_request_timeout_ms as i32);
    let session = load_session(&vars);
    let shutdown = ShutdownFlag::new();
    spawn_shutdown_listener(shutdown.clone());

    info!(event = "component.status_changed", component = "OEG", status = "RUNNING");
    println!("READY");
    std::io::stdout().flush().ok();

    let mut gateway = OrderExecutionGateway::new(
        puller,
        requester,
        session,
        shutdown,
        config.order_retry_count,
    );
    tokio::task::spawn_blocking(move || gateway.run())
        .await
        .map_err(|e| PipelineError::Lifecycle(e.to_string()))?;

    info!(event = "component.status_changed", component = "OEG", status = "STOPPED");
    Ok(())
}

/// Login is an external use case's job (spec.md §1 Non-goals); this bin
/// only seeds a session snapshot from the environment so the worker is
/// runnable standalone.
fn load_session(vars: &HashMap<String, String>) -> InMemorySessionStore {
    let store = InMemorySessionStore::default();
    if let Some(account) = vars.get("SESSION_ACCOUNT") {
        store.publish(SessionSnapshot {
            logged_in: true,
            account: account.clone(),
            token: vars.get("SESSION_TOKEN").cloned().unwrap_or_default(),
        });
    }
    store
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
