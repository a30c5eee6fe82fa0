//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for logging and metrics.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error)
    pub log_level: String,

    /// Whether to enable console output
    pub console_output: bool,

    /// Whether to emit JSON formatted logs
    pub json_logs: bool,

    /// Port the host process serves `encode_metrics()` on
    pub metrics_port: u16,

    /// Network identifier (devnet, testnet, mainnet)
    pub network: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "confidential-tip".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
            metrics_port: 9100,
            network: "devnet".to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `TIP_SERVICE_NAME`: Service name (default: confidential-tip)
    /// - `TIP_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `TIP_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `TIP_JSON_LOGS`: Enable JSON logs (default: false, true in containers)
    /// - `TIP_METRICS_PORT`: Scrape port served by the host (default: 9100)
    /// - `TIP_NETWORK`: Network name (default: devnet)
    #[must_use]
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        Self {
            service_name: env::var("TIP_SERVICE_NAME")
                .unwrap_or_else(|_| "confidential-tip".to_string()),

            log_level: env::var("TIP_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            console_output: env::var("TIP_CONSOLE_OUTPUT")
                .map(|v| parse_flag(&v, true))
                .unwrap_or(true),

            json_logs: env::var("TIP_JSON_LOGS")
                .map(|v| parse_flag(&v, false))
                .unwrap_or(is_container),

            metrics_port: env::var("TIP_METRICS_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(9100),

            network: env::var("TIP_NETWORK").unwrap_or_else(|_| "devnet".to_string()),
        }
    }

    /// Service name qualified by network, e.g. `confidential-tip@devnet`.
    #[must_use]
    pub fn qualified_service_name(&self) -> String {
        format!("{}@{}", self.service_name, self.network)
    }
}

/// Interprets `true`/`1`/`false`/`0` (any case); anything else yields `default`.
fn parse_flag(value: &str, default: bool) -> bool {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => true,
        "false" | "0" | "no" => false,
        _ => default,
    }
}
