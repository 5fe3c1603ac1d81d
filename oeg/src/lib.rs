#![forbid(unsafe_code)]
#![warn(missing_debug_implementations, rust_2018_idioms)]

//! # Order Execution Gateway (OEG)
//!
//! Pulls [`pipeline_model::TradingSignal`]s off channel S and turns each
//! into a broker-bound [`pipeline_model::OrderRequest`] submitted to DGW
//! over channel O, retrying transport failures with bounded exponential
//! backoff and leaving broker rejections untouched (spec.md §4.C).

mod gateway;
mod retry;

pub use gateway::{OegStats, OrderExecutionGateway};
