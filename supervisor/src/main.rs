//! Supervisor binary: the Main process entry point (spec.md §2, §4.E, §6).
//!
//! Loads [`Config`] and [`Credentials`] from the environment, starts the
//! trading system in order, waits for a termination signal or a forced
//! shutdown, then tears the system down in reverse order.
//!
//! Exit codes follow spec.md §6: `0` on a clean shutdown, `1` if startup
//! fails, `2` if shutdown had to force-kill a worker past its grace window.

use pipeline_broker::Credentials;
use pipeline_core::Config;
use pipeline_supervisor::{Supervisor, SupervisorOptions};
use std::collections::HashMap;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() -> ExitCode {
    pipeline_core::logging::init_logging();
    let vars: HashMap<String, String> = std::env::vars().collect();

    let config = match Config::from_env_map(&vars) {
        Ok(c) => c,
        Err(e) => {
            error!(event = "supervisor.startup_failed", error = %e, "invalid configuration");
            return ExitCode::from(1);
        }
    };
    let credentials = match Credentials::from_env_map(&vars) {
        Ok(c) => c,
        Err(e) => {
            error!(event = "supervisor.startup_failed", error = %e, "invalid credentials");
            return ExitCode::from(1);
        }
    };
    let options = options_from_env(&vars);

    let mut supervisor = Supervisor::new(config, credentials, options);

    info!(event = "component.status_changed", component = "SUPERVISOR", status = "STARTING");
    if let Err(e) = supervisor.start_trading_system().await {
        error!(event = "supervisor.startup_failed", error = %e, "trading system failed to start");
        let _ = supervisor.stop_trading_system().await;
        return ExitCode::from(1);
    }
    info!(event = "component.status_changed", component = "SUPERVISOR", status = "RUNNING");

    wait_for_termination().await;

    info!(event = "component.status_changed", component = "SUPERVISOR", status = "STOPPING");
    let forced = !matches!(
        tokio::time::timeout(Duration::from_secs(60), supervisor.stop_trading_system()).await,
        Ok(Ok(())),
    );

    if forced {
        error!(event = "supervisor.shutdown_forced", "shutdown did not complete cleanly within its overall window");
        return ExitCode::from(2);
    }

    ExitCode::from(0)
}

fn options_from_env(vars: &HashMap<String, String>) -> SupervisorOptions {
    let mut options = SupervisorOptions::default();
    if let Some(path) = vars.get("SE_BINARY_PATH") {
        options.se_binary_path = path.clone();
    }
    if let Some(path) = vars.get("OEG_BINARY_PATH") {
        options.oeg_binary_path = path.clone();
    }
    if let Some(dir) = vars.get("PID_DIR") {
        options.pid_dir = dir.clone();
    }
    if let Some(ms) = vars.get("READY_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
        options.ready_timeout = Duration::from_millis(ms);
    }
    options.conditions_path = vars.get("CONDITIONS_PATH").cloned();
    options.session_account = vars.get("SESSION_ACCOUNT").cloned();
    options.session_token = vars.get("SESSION_TOKEN").cloned();
    options
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
