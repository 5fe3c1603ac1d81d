use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use pipeline_model::{Tick, TickEvent};
use pipeline_transport::{TickPublisher, TransportError};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

/// A raw vendor tick payload: commodity id in whatever case the vendor
/// delivers it, plus the last-match price already coerced to [`Decimal`]
/// (the float-to-decimal cast spec.md §4.A describes is the vendor
/// callback's own responsibility; by the time it reaches [`MarketDataGateway`]
/// it is already a fixed-scale decimal).
#[derive(Debug, Clone, Copy)]
pub struct VendorTick<'a> {
    pub commodity_id: &'a str,
    pub match_price: Decimal,
}

/// Counters MDG exposes for health reporting and the `dropped_ticks ≤
/// ticks_delivered` invariant (spec.md §8).
#[derive(Debug, Default)]
pub struct MdgStats {
    dropped_ticks: AtomicU64,
    published_ticks: AtomicU64,
    callback_errors: AtomicU64,
}

impl MdgStats {
    pub fn dropped_ticks(&self) -> u64 {
        self.dropped_ticks.load(Ordering::Relaxed)
    }

    pub fn published_ticks(&self) -> u64 {
        self.published_ticks.load(Ordering::Relaxed)
    }

    pub fn callback_errors(&self) -> u64 {
        self.callback_errors.load(Ordering::Relaxed)
    }
}

#[derive(Debug, thiserror::Error)]
enum MdgError {
    #[error("invalid tick: {0}")]
    Tick(#[from] pipeline_model::tick::TickError),
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Market Data Gateway: owns the PUB socket on channel T and the
/// per-commodity monotonic clock that guarantees spec.md §4.A's ordering
/// guarantee ("Per commodity_id, when values are non-decreasing").
#[derive(Debug)]
pub struct MarketDataGateway {
    publisher: TickPublisher,
    stats: MdgStats,
    last_when: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl MarketDataGateway {
    /// Binds the PUB socket at `bind_addr` with the configured tick HWM.
    pub fn bind(bind_addr: &str, hwm: i32) -> Result<Self, TransportError> {
        Ok(Self {
            publisher: TickPublisher::bind(bind_addr, hwm)?,
            stats: MdgStats::default(),
            last_when: Mutex::new(HashMap::new()),
        })
    }

    pub fn stats(&self) -> &MdgStats {
        &self.stats
    }

    /// MDG's one operation (spec.md §4.A): normalize, stamp, encode,
    /// publish. Vendor callback exceptions never propagate past this call —
    /// every failure is caught, logged and counted here.
    pub fn on_vendor_tick(&self, raw: VendorTick<'_>) {
        if let Err(err) = self.try_publish(raw) {
            self.stats.callback_errors.fetch_add(1, Ordering::Relaxed);
            warn!(
                event = "mdg.vendor_callback_error",
                error = %err,
                "dropping malformed vendor tick"
            );
        }
    }

    fn try_publish(&self, raw: VendorTick<'_>) -> Result<(), MdgError> {
        let commodity_id = crate::normalize_commodity_id(raw.commodity_id);
        let tick = Tick::new(&commodity_id, raw.match_price)?;
        let when = self.stamp_monotonic(tick.commodity_id());
        let event = TickEvent::new(when, tick);

        match self.publisher.publish(&event) {
            Ok(()) => {
                self.stats.published_ticks.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(TransportError::WouldBlock) => {
                self.stats.dropped_ticks.fetch_add(1, Ordering::Relaxed);
                warn!(
                    event = "tick.dropped",
                    commodity_id = %event.commodity_id(),
                    "publisher HWM exceeded, dropping tick"
                );
                Ok(())
            }
            Err(e) => Err(MdgError::Transport(e)),
        }
    }

    /// Stamps `when` using wall-clock `Utc::now`, bumped by a microsecond
    /// whenever that would otherwise regress relative to the previous tick
    /// on the same commodity (clock jitter, coalesced vendor callbacks).
    fn stamp_monotonic(&self, commodity_id: &str) -> DateTime<Utc> {
        let now = Utc::now();
        let mut last = self.last_when.lock();
        let stamped = match last.get(commodity_id) {
            Some(prev) if *prev >= now => *prev + chrono::Duration::microseconds(1),
            _ => now,
        };
        last.insert(commodity_id.to_string(), stamped);
        stamped
    }
}
