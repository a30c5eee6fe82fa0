//! # Observability
//!
//! Service calls surface in the Prometheus registry exported by
//! `tip-telemetry`. Counters are process-global, so assertions are lower
//! bounds.

#[cfg(test)]
mod tests {
    use crate::integration::harness::{Harness, Party};
    use confidential_tip::prelude::*;
    use tip_telemetry::metrics::{LEDGER_CALLS, LEDGER_REVERTS, TIPS_SENT};

    #[tokio::test]
    async fn test_calls_recorded_by_outcome() {
        let h = Harness::new();
        let alice = Party::random();
        h.mint(&alice, 10).await;
        let _ = h.service.mint(alice.address, alice.address, 10).await;

        assert!(LEDGER_CALLS.with_label_values(&["mint", "committed"]).get() >= 1.0);
        assert!(LEDGER_CALLS.with_label_values(&["mint", "reverted"]).get() >= 1.0);
        assert!(
            LEDGER_REVERTS
                .with_label_values(&["mint", "unauthorized"])
                .get()
                >= 1.0
        );
    }

    #[tokio::test]
    async fn test_tips_counted_and_exported() {
        let _ = tip_telemetry::register_metrics();
        let h = Harness::new();
        let alice = Party::random();
        let bob = Party::random();
        h.service.register_github_user(alice.address, "alice").await.unwrap();
        h.service.register_github_user(bob.address, "bob").await.unwrap();

        let before = TIPS_SENT.get();
        let (amount, proof) = h.encrypt(&alice, 1);
        h.service.send_tip(alice.address, "bob", amount, proof).await.unwrap();
        assert!(TIPS_SENT.get() >= before + 1.0);

        let text = tip_telemetry::encode_metrics().unwrap();
        assert!(text.contains("ctip_ledger_calls_total"));
    }

    #[test]
    fn test_second_subscriber_rejected() {
        // Only test in this binary that installs a global subscriber.
        let config = tip_telemetry::TelemetryConfig {
            console_output: false,
            ..tip_telemetry::TelemetryConfig::default()
        };

        assert!(tip_telemetry::init_tracing(&config).is_ok());
        assert!(matches!(
            tip_telemetry::init_tracing(&config),
            Err(tip_telemetry::TelemetryError::TracingInit(_))
        ));
        assert!(tip_telemetry::init_telemetry(config).is_err());
    }
}
