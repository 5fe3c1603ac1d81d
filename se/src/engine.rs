use crate::condition_state::ConditionState;
use crate::dedupe::TickDedupe;
use indexmap::IndexMap;
use pipeline_core::{ConditionStore, ShutdownFlag};
use pipeline_model::{ConditionId, TradingSignal};
use pipeline_transport::{SignalPusher, TickSubscriber, TransportError};
use tracing::{debug, warn};

/// Counters exposed for health reporting and the `signals_received ≤
/// ticks_delivered` invariant (spec.md §8).
#[derive(Debug, Default)]
pub struct SeStats {
    pub ticks_consumed: u64,
    pub ticks_duplicate: u64,
    pub decode_errors: u64,
    pub signals_emitted: u64,
    pub signals_dropped: u64,
}

/// The Strategy Engine's single-threaded cooperative loop (spec.md §4.B).
///
/// Every suspension point is the bounded [`TickSubscriber::recv`] poll; the
/// loop exits at the next poll boundary once `shutdown` is requested.
#[derive(Debug)]
pub struct StrategyEngine<C> {
    subscriber: TickSubscriber,
    pusher: SignalPusher,
    condition_store: C,
    shutdown: ShutdownFlag,
    dedupe: TickDedupe,
    states: IndexMap<ConditionId, ConditionState>,
    stats: SeStats,
}

impl<C: ConditionStore> StrategyEngine<C> {
    pub fn new(
        subscriber: TickSubscriber,
        pusher: SignalPusher,
        condition_store: C,
        shutdown: ShutdownFlag,
    ) -> Self {
        Self {
            subscriber,
            pusher,
            condition_store,
            shutdown,
            dedupe: TickDedupe::new(),
            states: IndexMap::new(),
            stats: SeStats::default(),
        }
    }

    pub fn stats(&self) -> &SeStats {
        &self.stats
    }

    /// Runs the poll loop until [`ShutdownFlag::is_requested`]. Each
    /// iteration is one bounded poll plus, at most, one pass over the
    /// conditions matching the received tick's commodity.
    pub fn run(&mut self) {
        while !self.shutdown.is_requested() {
            self.tick_once();
        }
    }

    /// Runs exactly one poll iteration; exposed separately so tests can
    /// drive the loop deterministically instead of racing a background
    /// thread against `shutdown`.
    pub fn tick_once(&mut self) {
        self.sync_condition_store();

        let event = match self.subscriber.recv() {
            Ok(event) => event,
            Err(TransportError::Timeout) => return,
            Err(TransportError::Codec(_)) => {
                self.stats.decode_errors += 1;
                return;
            }
            Err(e) => {
                warn!(event = "se.transport_error", error = %e, "tick subscriber error");
                return;
            }
        };

        if self.dedupe.observe(event.commodity_id(), event.when) {
            self.stats.ticks_duplicate += 1;
            return;
        }
        self.stats.ticks_consumed += 1;

        for state in self.states.values_mut() {
            if state.commodity_id() != event.commodity_id() || state.is_closed() {
                continue;
            }
            if let Some(operation) = state.on_price(event.tick.match_price) {
                let signal = TradingSignal {
                    when: event.when,
                    operation,
                    commodity_id: event.tick.commodity_id().into(),
                    condition_id: state.condition_id().clone(),
                    quantity: state.quantity(),
                };
                self.emit(signal);
            }
        }
    }

    /// Pulls the condition repository's current contents. New conditions
    /// gain fresh [`ConditionState`]s; conditions no longer listed keep
    /// their in-memory state but stop being driven further once the
    /// repository-level entry is gone from a future re-sync (spec.md §5:
    /// condition store writes are "observed eventually").
    fn sync_condition_store(&mut self) {
        for condition in self.condition_store.list() {
            self.states
                .entry(condition.id.clone())
                .or_insert_with(|| ConditionState::new(condition));
        }
    }

    fn emit(&mut self, signal: TradingSignal) {
        match self.pusher.push(&signal) {
            Ok(()) => {
                self.stats.signals_emitted += 1;
                debug!(event = "signal.emitted", operation = %signal.operation, commodity_id = %signal.commodity_id, "signal emitted");
            }
            Err(TransportError::WouldBlock) => {
                self.stats.signals_dropped += 1;
                warn!(event = "signal.dropped", commodity_id = %signal.commodity_id, "signal queue overflow, dropping newest");
            }
            Err(e) => {
                warn!(event = "se.transport_error", error = %e, "failed to push signal");
            }
        }
    }
}
