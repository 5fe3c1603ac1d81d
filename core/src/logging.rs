//! Logging configuration for every pipeline component.
//!
//! ## Usage
//! ```rust,ignore
//! use pipeline_core::logging::init_logging;
//!
//! fn main() {
//!     init_logging();
//!     tracing::info!(event = "component.status_changed", "mdg starting");
//! }
//! ```
//!
//! ### Environment
//! ```bash
//! export RUST_LOG=info
//! export RUST_LOG=pipeline_core=debug,pipeline_transport=warn
//! ```

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initializes human-readable logging, honoring `RUST_LOG` with an `INFO`
/// default.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::filter::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Initializes JSON logging for log aggregators.
pub fn init_json_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::filter::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with(tracing_subscriber::fmt::layer().json().flatten_event(true))
        .init();
}
