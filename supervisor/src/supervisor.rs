//! The Supervisor itself (spec.md §4.E): the Main process orchestrator that
//! binds MDG and DGW in-process, spawns SE and OEG as child processes in
//! the documented order, and tears them down in the reverse order.

use crate::health::{HealthBoard, COMPONENTS};
use crate::ports;
use crate::process::{ProcessError, WorkerProcess};
use pipeline_broker::{Credentials, MockBroker};
use pipeline_core::{Config, PipelineError, ShutdownFlag};
use pipeline_dgw::DgwGateway;
use pipeline_mdg::MarketDataGateway;
use pipeline_model::{ComponentStatus, GetPositionsParams, OResponse, OrderRequest, OrderResponse, Position, SystemHealth};
use pipeline_transport::OrderRequester;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

impl From<ports::PortProbeError> for PipelineError {
    fn from(e: ports::PortProbeError) -> Self {
        PipelineError::Lifecycle(e.to_string())
    }
}

impl From<ProcessError> for PipelineError {
    fn from(e: ProcessError) -> Self {
        PipelineError::Lifecycle(e.to_string())
    }
}

/// Paths and environment the Supervisor needs beyond [`Config`] itself to
/// spawn SE and OEG: where their binaries live, and the handful of
/// environment-sourced inputs (conditions, session) spec.md §1 treats as an
/// external collaborator's responsibility.
#[derive(Debug, Clone)]
pub struct SupervisorOptions {
    pub se_binary_path: String,
    pub oeg_binary_path: String,
    pub pid_dir: String,
    pub ready_timeout: Duration,
    pub conditions_path: Option<String>,
    pub session_account: Option<String>,
    pub session_token: Option<String>,
}

impl Default for SupervisorOptions {
    fn default() -> Self {
        Self {
            se_binary_path: "se".to_string(),
            oeg_binary_path: "oeg".to_string(),
            pid_dir: pipeline_core::pidfile::DEFAULT_PID_DIR.to_string(),
            ready_timeout: Duration::from_secs(10),
            conditions_path: None,
            session_account: None,
            session_token: None,
        }
    }
}

struct DgwHandle {
    shutdown: ShutdownFlag,
    join: JoinHandle<()>,
}

/// Main-process orchestrator. Owns MDG's bound socket, runs DGW on a
/// background task, and holds the two [`WorkerProcess`] handles for SE and
/// OEG once they're spawned.
#[derive(Debug)]
pub struct Supervisor {
    config: Config,
    credentials: Credentials,
    options: SupervisorOptions,
    health: Arc<HealthBoard>,
    mdg: Option<MarketDataGateway>,
    dgw: Option<DgwHandle>,
    se: Option<WorkerProcess>,
    oeg: Option<WorkerProcess>,
    order_requester: Option<OrderRequester>,
}

impl std::fmt::Debug for DgwHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DgwHandle").finish_non_exhaustive()
    }
}

impl Supervisor {
    pub fn new(config: Config, credentials: Credentials, options: SupervisorOptions) -> Self {
        Self {
            config,
            credentials,
            options,
            health: Arc::new(HealthBoard::new()),
            mdg: None,
            dgw: None,
            se: None,
            oeg: None,
            order_requester: None,
        }
    }

    /// Runs spec.md §4.E's startup sequence: probe ports, bring up MDG and
    /// DGW in-process, then spawn SE and OEG as child workers, in that
    /// order, each one observably RUNNING before the next starts.
    pub async fn start_trading_system(&mut self) -> Result<(), PipelineError> {
        ports::probe_all(&self.config)?;

        let mdg = MarketDataGateway::bind(&self.config.market_bind, self.config.tick_hwm)?;
        self.health.set_status("MDG", ComponentStatus::Running);
        info!(event = "component.status_changed", component = "MDG", status = "RUNNING");
        self.mdg = Some(mdg);

        self.start_dgw().await?;

        self.se = Some(
            WorkerProcess::spawn(
                "SE",
                &self.options.se_binary_path,
                &self.se_env(),
                &self.options.pid_dir,
                self.options.ready_timeout,
            )
            .await?,
        );
        self.health.set_status("SE", ComponentStatus::Running);

        self.oeg = Some(
            WorkerProcess::spawn(
                "OEG",
                &self.options.oeg_binary_path,
                &self.oeg_env(),
                &self.options.pid_dir,
                self.options.ready_timeout,
            )
            .await?,
        );
        self.health.set_status("OEG", ComponentStatus::Running);

        self.order_requester = Some(OrderRequester::new(
            &self.config.order_connect,
            self.config.order_request_timeout_ms as i32,
        ));

        Ok(())
    }

    async fn start_dgw(&mut self) -> Result<(), PipelineError> {
        let router = pipeline_transport::OrderRouter::bind(&self.config.order_bind, 100)?;
        let shutdown = ShutdownFlag::new();
        let gateway = DgwGateway::new(router, self.config.dgw_queue_capacity, shutdown.clone());
        let broker = MockBroker::new();
        let credentials = self.credentials.clone();

        let join = tokio::task::spawn_blocking(move || {
            let stats = gateway.run(broker, credentials, 4_096);
            info!(
                event = "dgw.stopped",
                requests_served = stats.requests_served,
                requests_busy = stats.requests_busy,
                "DGW handler/reader threads joined"
            );
        });

        self.health.set_status("DGW", ComponentStatus::Running);
        info!(event = "component.status_changed", component = "DGW", status = "RUNNING");
        self.dgw = Some(DgwHandle { shutdown, join });
        Ok(())
    }

    /// Reverse-order shutdown (spec.md §4.E): OEG, then SE, then DGW, then
    /// MDG, each given `shutdown_grace_ms` to exit cleanly before the next
    /// stage proceeds.
    pub async fn stop_trading_system(&mut self) -> Result<(), PipelineError> {
        let grace = Duration::from_millis(self.config.shutdown_grace_ms);

        if let Some(oeg) = self.oeg.take() {
            oeg.stop(grace).await?;
            self.health.set_status("OEG", ComponentStatus::Stopped);
        }
        if let Some(se) = self.se.take() {
            se.stop(grace).await?;
            self.health.set_status("SE", ComponentStatus::Stopped);
        }
        if let Some(dgw) = self.dgw.take() {
            dgw.shutdown.request();
            match tokio::time::timeout(grace, dgw.join).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(event = "dgw.join_panicked", error = %e),
                Err(_) => warn!(event = "lifecycle.grace_exceeded", component = "DGW", "handler thread did not stop within grace window"),
            }
            self.health.set_status("DGW", ComponentStatus::Stopped);
        }
        if self.mdg.take().is_some() {
            self.health.set_status("MDG", ComponentStatus::Stopped);
        }

        info!(event = "component.status_changed", component = "SUPERVISOR", status = "STOPPED");
        Ok(())
    }

    /// `get_system_health()` (spec.md §4.E / §6): a snapshot of every
    /// tracked component's status, independent of whether it has ever run.
    pub fn get_system_health(&self) -> SystemHealth {
        self.health.snapshot()
    }

    /// Submits an order over channel O via DGW, as the CLI-equivalent
    /// `send_order()` surface spec.md §6 names.
    pub fn send_order(&self, request: OrderRequest) -> Result<OrderResponse, PipelineError> {
        let requester = self
            .order_requester
            .as_ref()
            .ok_or_else(|| PipelineError::Lifecycle("send_order called before startup".into()))?;
        match requester.request(&pipeline_model::ORequest::SendOrder(request))? {
            OResponse::SendOrder(response) => Ok(response),
            other => Err(PipelineError::Lifecycle(format!("unexpected reply to send_order: {other:?}"))),
        }
    }

    /// `get_positions()` (spec.md §6): queries DGW over channel O.
    pub fn get_positions(&self, account: String, symbol: Option<String>) -> Result<Vec<Position>, PipelineError> {
        let requester = self
            .order_requester
            .as_ref()
            .ok_or_else(|| PipelineError::Lifecycle("get_positions called before startup".into()))?;
        let params = GetPositionsParams { account, symbol };
        match requester.request(&pipeline_model::ORequest::GetPositions(params))? {
            OResponse::GetPositions(positions) => Ok(positions),
            other => Err(PipelineError::Lifecycle(format!("unexpected reply to get_positions: {other:?}"))),
        }
    }

    fn se_env(&self) -> HashMap<String, String> {
        let mut env = HashMap::new();
        env.insert("MARKET_CONNECT".to_string(), self.config.market_connect.clone());
        env.insert("SIGNAL_CONNECT".to_string(), self.config.signal_connect.clone());
        env.insert("SIGNAL_HWM".to_string(), self.config.signal_hwm.to_string());
        if let Some(path) = &self.options.conditions_path {
            env.insert("CONDITIONS_PATH".to_string(), path.clone());
        }
        env
    }

    fn oeg_env(&self) -> HashMap<String, String> {
        let mut env = HashMap::new();
        env.insert("SIGNAL_BIND".to_string(), self.config.signal_bind.clone());
        env.insert("ORDER_CONNECT".to_string(), self.config.order_connect.clone());
        env.insert(
            "ORDER_REQUEST_TIMEOUT_MS".to_string(),
            self.config.order_request_timeout_ms.to_string(),
        );
        env.insert("ORDER_RETRY_COUNT".to_string(), self.config.order_retry_count.to_string());
        if let Some(account) = &self.options.session_account {
            env.insert("SESSION_ACCOUNT".to_string(), account.clone());
        }
        if let Some(token) = &self.options.session_token {
            env.insert("SESSION_TOKEN".to_string(), token.clone());
        }
        env
    }
}

/// The set of components a fresh [`HealthBoard`] tracks, re-exported for
/// callers that want to assert health coverage without depending on
/// [`crate::health`] directly.
pub fn tracked_components() -> &'static [&'static str] {
    &COMPONENTS
}
