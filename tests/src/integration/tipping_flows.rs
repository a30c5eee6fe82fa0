//! # Tipping Flows
//!
//! Username registration, single tips and bounded batches through
//! `IdentityApi` and `TipApi`.

#[cfg(test)]
mod tests {
    use crate::integration::harness::{Harness, Party};
    use confidential_tip::prelude::*;

    async fn registered(h: &Harness, username: &str) -> Party {
        let party = Party::random();
        h.service
            .register_github_user(party.address, username)
            .await
            .unwrap();
        party
    }

    /// Observable state a rejected batch must leave untouched.
    #[derive(Debug, PartialEq)]
    struct Snapshot {
        events: usize,
        committed: u64,
        balance: Euint64,
        tips_sent: Euint64,
    }

    impl Snapshot {
        async fn take(h: &Harness, sender: &Party) -> Self {
            Self {
                events: h.service.event_publisher().len(),
                committed: h.service.stats().await.calls_committed,
                balance: h.service.get_balance(sender.address).await,
                tips_sent: h.service.get_total_tips_sent(sender.address).await.unwrap(),
            }
        }
    }

    // =============================================================================
    // REGISTRATION
    // =============================================================================

    #[tokio::test]
    async fn test_register_and_lookup() {
        let h = Harness::new();
        let alice = registered(&h, "alice").await;

        assert!(h.service.is_registered(alice.address).await);
        assert_eq!(h.service.get_github_username(alice.address).await, "alice");
        assert_eq!(h.service.get_wallet_address("alice").await, alice.address);
        assert!(h.service.github_username_exists("alice").await);
        assert!(h.service.is_github_username_taken("alice").await);
    }

    #[tokio::test]
    async fn test_unknown_lookups_return_sentinels() {
        let h = Harness::new();
        let nobody = Party::random();

        assert_eq!(h.service.get_github_username(nobody.address).await, "");
        assert_eq!(h.service.get_wallet_address("nobody").await, Address::ZERO);
        assert!(!h.service.github_username_exists("nobody").await);
    }

    #[tokio::test]
    async fn test_username_taken_by_another_address() {
        let h = Harness::new();
        registered(&h, "alice").await;
        let bob = Party::random();

        let err = h
            .service
            .register_github_user(bob.address, "alice")
            .await
            .unwrap_err();

        assert_eq!(err, LedgerError::GitHubUsernameTaken("alice".into()));
        assert!(!h.service.is_registered(bob.address).await);
    }

    #[tokio::test]
    async fn test_address_registers_once() {
        let h = Harness::new();
        let alice = registered(&h, "alice").await;

        let err = h
            .service
            .register_github_user(alice.address, "alice2")
            .await
            .unwrap_err();

        assert_eq!(err, LedgerError::AlreadyRegistered(alice.address));
        assert!(!h.service.github_username_exists("alice2").await);
    }

    #[tokio::test]
    async fn test_username_length_bounds() {
        let h = Harness::new();
        let a = Party::random();

        let empty = h.service.register_github_user(a.address, "").await;
        assert_eq!(
            empty,
            Err(LedgerError::InvalidArgument(ArgumentError::EmptyUsername))
        );

        let long = "x".repeat(40);
        assert!(h.service.register_github_user(a.address, &long).await.is_err());

        let max = "x".repeat(39);
        h.service.register_github_user(a.address, &max).await.unwrap();
        assert_eq!(h.service.get_wallet_address(&max).await, a.address);
    }

    #[tokio::test]
    async fn test_usernames_are_case_sensitive() {
        let h = Harness::new();
        let lower = registered(&h, "alice").await;
        let upper = registered(&h, "Alice").await;

        assert_ne!(lower.address, upper.address);
        assert_eq!(h.service.get_wallet_address("Alice").await, upper.address);
    }

    // =============================================================================
    // SINGLE TIPS
    // =============================================================================

    #[tokio::test]
    async fn test_tip_by_username() {
        let h = Harness::new();
        let alice = registered(&h, "alice").await;
        let bob = registered(&h, "bob").await;
        h.mint(&alice, 1_000_000).await;

        let (amount, proof) = h.encrypt(&alice, 100_000);
        let moved = h
            .service
            .send_tip(alice.address, "bob", amount, proof)
            .await
            .unwrap();

        assert_eq!(h.decrypt(&bob, moved).await, 100_000);
        assert_eq!(h.balance(&alice).await, 900_000);
        assert_eq!(h.balance(&bob).await, 100_000);

        let sent = h.service.get_total_tips_sent(alice.address).await.unwrap();
        let received = h.service.get_total_tips_received(bob.address).await.unwrap();
        assert_eq!(h.decrypt(&alice, sent).await, 100_000);
        assert_eq!(h.decrypt(&bob, received).await, 100_000);

        let tips = h.service.event_publisher().by_topic(topics::TIP_SENT);
        assert_eq!(
            tips,
            vec![LedgerEvent::TipSent {
                from: alice.address,
                to: bob.address,
                to_username: "bob".into(),
                transferred: moved,
            }]
        );
    }

    #[tokio::test]
    async fn test_unregistered_sender_cannot_tip() {
        let h = Harness::new();
        registered(&h, "bob").await;
        let carol = Party::random();
        h.mint(&carol, 500).await;

        let (amount, proof) = h.encrypt(&carol, 100);
        let err = h
            .service
            .send_tip(carol.address, "bob", amount, proof)
            .await
            .unwrap_err();

        assert_eq!(err, LedgerError::NotRegistered(carol.address));
        assert_eq!(h.balance(&carol).await, 500);
    }

    #[tokio::test]
    async fn test_tip_to_unknown_username() {
        let h = Harness::new();
        let alice = registered(&h, "alice").await;
        h.mint(&alice, 500).await;

        let (amount, proof) = h.encrypt(&alice, 100);
        let err = h
            .service
            .send_tip(alice.address, "ghost", amount, proof)
            .await
            .unwrap_err();

        assert_eq!(err, LedgerError::UserNotFound("ghost".into()));
    }

    #[tokio::test]
    async fn test_overdrawn_tip_records_clamped_amount() {
        let h = Harness::new();
        let alice = registered(&h, "alice").await;
        let bob = registered(&h, "bob").await;
        h.mint(&alice, 30).await;

        let (amount, proof) = h.encrypt(&alice, 1_000);
        h.service
            .send_tip(alice.address, "bob", amount, proof)
            .await
            .unwrap();

        let received = h.service.get_total_tips_received(bob.address).await.unwrap();
        assert_eq!(h.decrypt(&bob, received).await, 30);
    }

    #[tokio::test]
    async fn test_tip_totals_require_registration() {
        let h = Harness::new();
        let nobody = Party::random();

        assert_eq!(
            h.service.get_total_tips_sent(nobody.address).await,
            Err(LedgerError::NotRegistered(nobody.address))
        );
        assert!(h.service.get_total_tips_received(nobody.address).await.is_err());
    }

    // =============================================================================
    // BATCHES
    // =============================================================================

    #[tokio::test]
    async fn test_batch_tips_in_order() {
        let h = Harness::new();
        let alice = registered(&h, "alice").await;
        let bob = registered(&h, "bob").await;
        let carol = registered(&h, "carol").await;
        h.mint(&alice, 1_000).await;

        let (a1, p1) = h.encrypt(&alice, 100);
        let (a2, p2) = h.encrypt(&alice, 200);
        let (a3, p3) = h.encrypt(&alice, 300);
        let moved = h
            .service
            .batch_send_tips(
                alice.address,
                vec!["bob".into(), "carol".into(), "bob".into()],
                vec![a1, a2, a3],
                vec![p1, p2, p3],
            )
            .await
            .unwrap();

        assert_eq!(moved.len(), 3);
        assert_eq!(h.balance(&alice).await, 400);
        assert_eq!(h.balance(&bob).await, 400);
        assert_eq!(h.balance(&carol).await, 200);

        let sent = h.service.get_total_tips_sent(alice.address).await.unwrap();
        assert_eq!(h.decrypt(&alice, sent).await, 600);
        assert_eq!(
            h.service.event_publisher().by_topic(topics::TIP_SENT).len(),
            3
        );
    }

    #[tokio::test]
    async fn test_empty_batch_succeeds() {
        let h = Harness::new();
        let alice = registered(&h, "alice").await;

        let moved = h
            .service
            .batch_send_tips(alice.address, vec![], vec![], vec![])
            .await
            .unwrap();
        assert!(moved.is_empty());
    }

    #[tokio::test]
    async fn test_batch_of_eleven_rejected() {
        let h = Harness::new();
        let alice = registered(&h, "alice").await;
        registered(&h, "bob").await;
        h.mint(&alice, 1_000).await;

        let before = Snapshot::take(&h, &alice).await;

        let (amounts, proofs): (Vec<_>, Vec<_>) = (0..11).map(|_| h.encrypt(&alice, 1)).unzip();
        let err = h
            .service
            .batch_send_tips(alice.address, vec!["bob".to_string(); 11], amounts, proofs)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            LedgerError::InvalidArgument(ArgumentError::BatchTooLarge { len: 11, max: 10 })
        );
        assert_eq!(Snapshot::take(&h, &alice).await, before);
        assert_eq!(h.balance(&alice).await, 1_000);
    }

    #[tokio::test]
    async fn test_batch_length_mismatch() {
        let h = Harness::new();
        let alice = registered(&h, "alice").await;
        registered(&h, "bob").await;
        registered(&h, "carol").await;
        h.mint(&alice, 500).await;
        let before = Snapshot::take(&h, &alice).await;

        let (a1, p1) = h.encrypt(&alice, 1);
        let err = h
            .service
            .batch_send_tips(alice.address, vec!["bob".into(), "carol".into()], vec![a1], vec![p1])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LedgerError::InvalidArgument(ArgumentError::ArrayLengthMismatch { .. })
        ));
        assert_eq!(Snapshot::take(&h, &alice).await, before);
        assert_eq!(h.balance(&alice).await, 500);
    }
}
