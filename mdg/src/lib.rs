#![forbid(unsafe_code)]
#![warn(missing_debug_implementations, rust_2018_idioms)]

//! # Market Data Gateway (MDG)
//!
//! Converts vendor tick callbacks into [`pipeline_model::TickEvent`]s and
//! publishes each exactly once on channel T (spec.md §4.A).
//!
//! MDG performs only bounded work on the vendor's callback thread: uppercase
//! the commodity id, stamp a monotonic `when`, encode, and a non-blocking
//! send. Anything slower belongs downstream, in SE.

mod gateway;
mod normalize;

pub use gateway::{MarketDataGateway, MdgStats, VendorTick};
pub use normalize::normalize_commodity_id;
