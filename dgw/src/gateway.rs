use crate::handler::BrokerHandler;
use crate::reconnect::ReconnectPolicy;
use pipeline_broker::{BrokerConnectionState, BrokerHandle, Credentials};
use pipeline_core::ShutdownFlag;
use pipeline_model::{ErrorKind, OResponse, OrderResponse, RequestId};
use pipeline_transport::{OrderRouter, TransportError};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, SyncSender, TrySendError};
use std::time::Duration;
use tracing::{info, warn};

/// Counters exposed for health reporting (spec.md §8).
#[derive(Debug, Default)]
pub struct DgwStats {
    pub requests_served: u64,
    pub requests_busy: u64,
    pub requests_deduped: u64,
}

type WorkItem = (Vec<u8>, pipeline_model::ORequest);
type CompletedItem = (Vec<u8>, OResponse);

/// DLL/Broker Gateway: the single process-wide owner of the broker handle
/// (spec.md §4.D). [`Self::run`] spawns the handler thread and then runs
/// the socket-reader loop itself on the calling thread — exactly the two
/// threads spec.md §5 allows DGW.
#[derive(Debug)]
pub struct DgwGateway {
    router: OrderRouter,
    queue_capacity: usize,
    shutdown: ShutdownFlag,
}

impl DgwGateway {
    pub fn new(router: OrderRouter, queue_capacity: usize, shutdown: ShutdownFlag) -> Self {
        Self {
            router,
            queue_capacity: queue_capacity.max(1),
            shutdown,
        }
    }

    /// Runs until shutdown, spawning the handler thread internally.
    /// `broker` is moved onto that thread; nothing else may touch it.
    pub fn run<B: BrokerHandle + 'static>(self, broker: B, credentials: Credentials, dedupe_capacity: usize) -> DgwStats {
        let (work_tx, work_rx): (SyncSender<WorkItem>, Receiver<WorkItem>) =
            mpsc::sync_channel(self.queue_capacity);
        let (completed_tx, completed_rx): (Sender<CompletedItem>, Receiver<CompletedItem>) = mpsc::channel();

        let handler_shutdown = self.shutdown.clone();
        let handler_thread = std::thread::spawn(move || {
            run_handler_loop(
                BrokerHandler::new(broker, dedupe_capacity),
                work_rx,
                completed_tx,
                handler_shutdown,
                credentials,
            );
        });

        let stats = self.run_reader_loop(work_tx, completed_rx);
        handler_thread.join().ok();
        stats
    }

    fn run_reader_loop(&self, work_tx: SyncSender<WorkItem>, completed_rx: Receiver<CompletedItem>) -> DgwStats {
        let mut stats = DgwStats::default();
        while !self.shutdown.is_requested() {
            self.drain_completed(&completed_rx, &mut stats);

            match self.router.recv() {
                Ok((identity, request)) => match work_tx.try_send((identity.clone(), request)) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        stats.requests_busy += 1;
                        warn!(event = "dgw.queue_full", "rejecting request with BUSY");
                        let busy = OResponse::SendOrder(OrderResponse::rejected(
                            ErrorKind::Busy,
                            "handler queue full",
                            RequestId::generate(),
                        ));
                        if let Err(e) = self.router.reply(&identity, &busy) {
                            warn!(event = "dgw.reply_failed", error = %e, "failed to send BUSY reply");
                        }
                    }
                    Err(TrySendError::Disconnected(_)) => break,
                },
                Err(TransportError::Timeout) => continue,
                Err(e) => {
                    warn!(event = "dgw.transport_error", error = %e, "order router error");
                }
            }
        }
        // Drain any replies the handler produced between the shutdown check
        // and loop exit.
        self.drain_completed(&completed_rx, &mut stats);
        stats
    }

    fn drain_completed(&self, completed_rx: &Receiver<CompletedItem>, stats: &mut DgwStats) {
        while let Ok((identity, response)) = completed_rx.try_recv() {
            stats.requests_served += 1;
            if let Err(e) = self.router.reply(&identity, &response) {
                warn!(event = "dgw.reply_failed", error = %e, "failed to send reply");
            }
        }
    }
}

fn run_handler_loop<B: BrokerHandle>(
    mut handler: BrokerHandler<B>,
    work_rx: Receiver<WorkItem>,
    completed_tx: Sender<CompletedItem>,
    shutdown: ShutdownFlag,
    credentials: Credentials,
) {
    let mut reconnect = ReconnectPolicy::new();
    while !shutdown.is_requested() {
        if handler.connection_state() == BrokerConnectionState::Disconnected && reconnect.due() {
            match handler.reconnect(&credentials) {
                Ok(()) => {
                    reconnect.reset();
                    info!(event = "component.status_changed", component = "DGW", status = "CONNECTED");
                }
                Err(e) => {
                    warn!(event = "dgw.reconnect_failed", error = %e, "broker reconnect attempt failed");
                    reconnect.advance();
                }
            }
        }

        match work_rx.recv_timeout(Duration::from_millis(100)) {
            Ok((identity, request)) => {
                let response = handler.handle(request);
                if completed_tx.send((identity, response)).is_err() {
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}
