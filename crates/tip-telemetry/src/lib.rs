//! # Tip Telemetry
//!
//! Logging and metrics for the confidential tip ledger.
//!
//! ## Components
//!
//! - **Logs**: `tracing-subscriber` with an `EnvFilter`, pretty or JSON output
//! - **Metrics**: Prometheus counters and histograms (`ctip_*`)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tip_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let _guard = init_telemetry(TelemetryConfig::from_env()).expect("telemetry");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `TIP_SERVICE_NAME` | `confidential-tip` | Service name in logs |
//! | `TIP_LOG_LEVEL` | `info` | Log level filter (`RUST_LOG` also honoured) |
//! | `TIP_JSON_LOGS` | `false` | JSON output |
//! | `TIP_METRICS_PORT` | `9100` | Scrape port the host serves `encode_metrics()` on |
//! | `TIP_NETWORK` | `devnet` | Network label |

#![warn(missing_docs)]

mod config;
pub mod metrics;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use metrics::{encode_metrics, record_call, register_metrics, CallTimer};
pub use tracing_setup::init_tracing;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The global subscriber could not be installed.
    #[error("Failed to initialize tracing: {0}")]
    TracingInit(String),

    /// Prometheus collector registration or encoding failed.
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging and metrics.
///
/// No HTTP listener is started: the host process serves
/// [`encode_metrics`] on `config.metrics_port`, which is only announced here.
///
/// Returns a guard that should be held for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    register_metrics()?;
    init_tracing(&config)?;
    announce_metrics(&config);

    Ok(TelemetryGuard { config })
}

fn announce_metrics(config: &TelemetryConfig) {
    tracing::info!(
        service = %config.qualified_service_name(),
        metrics_port = config.metrics_port,
        "Metrics registered; scrape endpoint is served by the host"
    );
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    config: TelemetryConfig,
}

impl TelemetryGuard {
    /// The configuration telemetry was started with.
    #[must_use]
    pub fn config(&self) -> &TelemetryConfig {
        &self.config
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.config.service_name, "Shutting down telemetry");
    }
}
