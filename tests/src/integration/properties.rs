//! # Ledger Properties
//!
//! Checks that must hold after any sequence of calls: supply conservation,
//! identity bijection, rollback of failed calls, and grant coverage.

#[cfg(test)]
mod tests {
    use crate::integration::harness::{Harness, Party};
    use confidential_tip::prelude::*;
    use rand::{Rng, SeedableRng};

    /// Total supply equals the sum of every decrypted balance.
    async fn assert_conserved(h: &Harness, parties: &[&Party]) {
        let mut sum = 0u64;
        for party in parties {
            sum += h.balance(party).await;
        }
        assert_eq!(sum, h.supply().await);
    }

    #[tokio::test]
    async fn test_supply_conserved_under_random_activity() {
        let h = Harness::new();
        let parties: Vec<Party> = (0..4).map(|_| Party::random()).collect();
        for (i, party) in parties.iter().enumerate() {
            h.service
                .register_github_user(party.address, &format!("user{i}"))
                .await
                .unwrap();
            h.mint(party, 1_000).await;
        }

        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        for _ in 0..30 {
            let from = &parties[rng.gen_range(0..parties.len())];
            let to = rng.gen_range(0..parties.len());
            let amount = rng.gen_range(0..1_500);
            let (input, proof) = h.encrypt(from, amount);

            if rng.gen_bool(0.5) {
                h.service
                    .confidential_transfer(from.address, parties[to].address, input, proof)
                    .await
                    .unwrap();
            } else {
                h.service
                    .send_tip(from.address, &format!("user{to}"), input, proof)
                    .await
                    .unwrap();
            }
        }

        let refs: Vec<&Party> = parties.iter().collect();
        assert_conserved(&h, &refs).await;
        assert_eq!(h.supply().await, 4_000);
        assert!(h.service.check_invariants().await.is_valid());
    }

    #[tokio::test]
    async fn test_identity_mapping_is_bijective() {
        let h = Harness::new();
        let parties: Vec<Party> = (0..5).map(|_| Party::random()).collect();
        for (i, party) in parties.iter().enumerate() {
            h.service
                .register_github_user(party.address, &format!("dev-{i}"))
                .await
                .unwrap();
        }
        // Colliding attempts must not disturb the mapping.
        let _ = h
            .service
            .register_github_user(parties[1].address, "dev-0")
            .await;
        let _ = h
            .service
            .register_github_user(Party::random().address, "dev-2")
            .await;

        for party in &parties {
            let name = h.service.get_github_username(party.address).await;
            assert_eq!(h.service.get_wallet_address(&name).await, party.address);
        }
        assert!(h.service.check_invariants().await.is_valid());
    }

    #[tokio::test]
    async fn test_failed_batch_changes_nothing() {
        let h = Harness::new();
        let alice = Party::random();
        let bob = Party::random();
        h.service.register_github_user(alice.address, "alice").await.unwrap();
        h.service.register_github_user(bob.address, "bob").await.unwrap();
        h.mint(&alice, 1_000).await;

        let log = h.service.event_publisher();
        let events_before = log.len();
        let stats_before = h.service.stats().await;

        // Second entry fails after the first has already moved funds.
        let (a1, p1) = h.encrypt(&alice, 100);
        let (a2, p2) = h.encrypt(&alice, 100);
        let (a3, p3) = h.encrypt(&alice, 100);
        let err = h
            .service
            .batch_send_tips(
                alice.address,
                vec!["bob".into(), "nobody".into(), "bob".into()],
                vec![a1, a2, a3],
                vec![p1, p2, p3],
            )
            .await
            .unwrap_err();

        assert_eq!(err, LedgerError::UserNotFound("nobody".into()));
        assert_eq!(log.len(), events_before);
        assert_eq!(h.balance(&alice).await, 1_000);
        assert_eq!(h.balance(&bob).await, 0);

        let sent = h.service.get_total_tips_sent(alice.address).await.unwrap();
        assert_eq!(h.decrypt(&alice, sent).await, 0);

        let stats = h.service.stats().await;
        assert_eq!(stats.calls_committed, stats_before.calls_committed);
        assert_eq!(stats.calls_reverted, stats_before.calls_reverted + 1);
    }

    #[tokio::test]
    async fn test_failed_batch_with_bad_proof_rolls_back() {
        let h = Harness::new();
        let alice = Party::random();
        let bob = Party::random();
        h.service.register_github_user(alice.address, "alice").await.unwrap();
        h.service.register_github_user(bob.address, "bob").await.unwrap();
        h.mint(&alice, 500).await;

        let (a1, p1) = h.encrypt(&alice, 100);
        // Input encrypted for Bob cannot be spent by Alice.
        let (a2, p2) = h.encrypt(&bob, 100);
        let err = h
            .service
            .batch_send_tips(
                alice.address,
                vec!["bob".into(), "bob".into()],
                vec![a1, a2],
                vec![p1, p2],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, LedgerError::InvalidProof(_)));
        assert_eq!(h.balance(&alice).await, 500);
        assert_eq!(h.balance(&bob).await, 0);
    }

    #[tokio::test]
    async fn test_holders_can_decrypt_their_handles() {
        let h = Harness::new();
        let alice = Party::random();
        let bob = Party::random();
        h.mint(&alice, 300).await;

        let (amount, proof) = h.encrypt(&alice, 120);
        let allowance = h
            .service
            .approve(alice.address, bob.address, amount, proof)
            .await
            .unwrap();

        let alice_balance = h.service.get_balance(alice.address).await;
        assert_eq!(
            h.try_decrypt(&alice, &[alice_balance, allowance]).await.unwrap(),
            vec![300, 120]
        );
        assert_eq!(h.decrypt(&bob, allowance).await, 120);
        assert!(h.service.check_invariants().await.is_valid());
    }
}
