//! Prometheus metrics for the confidential tip ledger.
//!
//! All metrics follow the naming convention: `ctip_<component>_<metric>_<unit>`.
//! Amount-bearing values are never recorded; only counts of operations.

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, linear_buckets, Counter, CounterVec, Encoder, Histogram, HistogramOpts,
    HistogramVec, Opts, Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // CALL METRICS
    // =========================================================================

    /// State-changing calls by operation and outcome (committed/reverted)
    pub static ref LEDGER_CALLS: CounterVec = CounterVec::new(
        Opts::new("ctip_ledger_calls_total", "State-changing calls by operation and outcome"),
        &["operation", "outcome"]
    ).expect("metric creation failed");

    /// Reverted calls by error kind
    pub static ref LEDGER_REVERTS: CounterVec = CounterVec::new(
        Opts::new("ctip_ledger_reverts_total", "Reverted calls by operation and error kind"),
        &["operation", "error_kind"]
    ).expect("metric creation failed");

    /// Time spent inside a state-changing call, lock wait included
    pub static ref CALL_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "ctip_ledger_call_duration_seconds",
            "Time spent executing a state-changing call"
        ).buckets(exponential_buckets(0.000_01, 2.0, 16).expect("valid bucket layout")),
        &["operation"]
    ).expect("metric creation failed");

    // =========================================================================
    // LEDGER METRICS
    // =========================================================================

    /// Successful mints
    pub static ref MINTS: Counter = Counter::new(
        "ctip_ledger_mints_total",
        "Total number of committed mints"
    ).expect("metric creation failed");

    /// Successful confidential transfers (direct and delegated)
    pub static ref TRANSFERS: CounterVec = CounterVec::new(
        Opts::new("ctip_ledger_transfers_total", "Committed transfers by kind"),
        &["kind"]  // kind: direct/delegated
    ).expect("metric creation failed");

    /// Allowance approvals
    pub static ref APPROVALS: Counter = Counter::new(
        "ctip_ledger_approvals_total",
        "Total number of committed allowance approvals"
    ).expect("metric creation failed");

    // =========================================================================
    // TIP METRICS
    // =========================================================================

    /// Identity registrations
    pub static ref REGISTRATIONS: Counter = Counter::new(
        "ctip_registry_registrations_total",
        "Total number of GitHub usernames registered"
    ).expect("metric creation failed");

    /// Tips dispatched (each batch entry counts once)
    pub static ref TIPS_SENT: Counter = Counter::new(
        "ctip_tips_sent_total",
        "Total number of committed tips"
    ).expect("metric creation failed");

    /// Number of tips per committed batch
    pub static ref BATCH_SIZE: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "ctip_tips_batch_size",
            "Number of tips per committed batch"
        ).buckets(linear_buckets(1.0, 1.0, 10).expect("valid bucket layout"))
    ).expect("metric creation failed");

    // =========================================================================
    // DECRYPTION METRICS
    // =========================================================================

    /// User decryption requests by outcome
    pub static ref DECRYPTIONS: CounterVec = CounterVec::new(
        Opts::new("ctip_relayer_decryptions_total", "User decryption requests by outcome"),
        &["outcome"]  // outcome: granted/rejected
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
///
/// Calling this twice fails with [`TelemetryError::MetricsInit`] because the
/// collectors are already registered.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Calls
        Box::new(LEDGER_CALLS.clone()),
        Box::new(LEDGER_REVERTS.clone()),
        Box::new(CALL_DURATION.clone()),
        // Ledger
        Box::new(MINTS.clone()),
        Box::new(TRANSFERS.clone()),
        Box::new(APPROVALS.clone()),
        // Tips
        Box::new(REGISTRATIONS.clone()),
        Box::new(TIPS_SENT.clone()),
        Box::new(BATCH_SIZE.clone()),
        // Decryption
        Box::new(DECRYPTIONS.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }

    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Record the outcome of a state-changing call.
///
/// `error_kind` is `None` for committed calls.
pub fn record_call(operation: &str, error_kind: Option<&str>) {
    match error_kind {
        None => LEDGER_CALLS.with_label_values(&[operation, "committed"]).inc(),
        Some(kind) => {
            LEDGER_CALLS.with_label_values(&[operation, "reverted"]).inc();
            LEDGER_REVERTS.with_label_values(&[operation, kind]).inc();
        }
    }
}

/// Timer guard for automatic histogram observation.
pub struct CallTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl CallTimer {
    /// Start a new timer for the given operation.
    #[must_use]
    pub fn start(operation: &str) -> Self {
        Self {
            histogram: CALL_DURATION.with_label_values(&[operation]),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for CallTimer {
    fn drop(&mut self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}
