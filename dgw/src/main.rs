//! Standalone DGW binary, useful for exercising the DLL/Broker Gateway on
//! its own (without the Supervisor driving MDG and SE/OEG alongside it) —
//! e.g. local integration testing against a CLI-equivalent order client.
//!
//! In production, `supervisor` hosts DGW in-process rather than spawning
//! this binary (spec.md §2: DGW lives in the Main process, not a worker).

use pipeline_broker::{Credentials, MockBroker};
use pipeline_core::{Config, PipelineError, ShutdownFlag};
use pipeline_dgw::DgwGateway;
use pipeline_transport::OrderRouter;
use std::collections::HashMap;
use tracing::info;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> Result<(), PipelineError> {
    pipeline_core::logging::init_logging();
    let vars: HashMap<String, String> = std::env::vars().collect();
    let config = Config::from_env_map(&vars).map_err(|e| PipelineError::Config(e.to_string()))?;
    let credentials = Credentials::from_env_map(&vars).map_err(|e| PipelineError::Config(e.to_string()))?;

    let router = OrderRouter::bind(&config.order_bind, 100)?;
    let shutdown = ShutdownFlag::new();
    spawn_shutdown_listener(shutdown.clone());

    info!(event = "component.status_changed", component = "DGW", status = "RUNNING");

    // Only a mock backend ships in this workspace (spec.md §1 Non-goals:
    // no multi-broker portability, and the real vendor DLL is out of
    // scope); a production build would select a real `BrokerHandle` here
    // behind a feature flag instead.
    let broker = MockBroker::new();
    let gateway = DgwGateway::new(router, config.dgw_queue_capacity, shutdown);
    tokio::task::spawn_blocking(move || gateway.run(broker, credentials, 4_096))
        .await
        .map_err(|e| PipelineError::Lifecycle(e.to_string()))?;

    info!(event = "component.status_changed", component = "DGW", status = "STOPPED");
    Ok(())
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
