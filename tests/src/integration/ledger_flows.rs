//! # Ledger Flows
//!
//! Mint, direct transfer and delegated transfer through `ConfidentialTokenApi`,
//! with every amount read back through the decryption relayer.

#[cfg(test)]
mod tests {
    use crate::integration::harness::{Harness, Party};
    use confidential_tip::prelude::*;

    // =============================================================================
    // MINT
    // =============================================================================

    #[tokio::test]
    async fn test_mint_and_decrypt_balance() {
        let h = Harness::new();
        let alice = Party::random();

        h.mint(&alice, 1_000_000).await;

        assert_eq!(h.balance(&alice).await, 1_000_000);
        assert_eq!(h.supply().await, 1_000_000);
    }

    #[tokio::test]
    async fn test_non_owner_cannot_mint() {
        let h = Harness::new();
        let mallory = Party::random();

        let err = h
            .service
            .mint(mallory.address, mallory.address, 1)
            .await
            .unwrap_err();

        assert!(err.is_authorization_failure());
        assert_eq!(h.balance(&mallory).await, 0);
    }

    #[tokio::test]
    async fn test_owner_can_view_any_balance() {
        let h = Harness::new();
        let alice = Party::random();
        let bob = Party::random();
        h.mint(&alice, 250).await;

        let seen = h
            .service
            .get_balance_of(h.owner.address, alice.address)
            .await
            .unwrap();
        assert_eq!(h.decrypt(&h.owner, seen).await, 250);

        let err = h
            .service
            .get_balance_of(bob.address, alice.address)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_total_supply_is_owner_only() {
        let h = Harness::new();
        let alice = Party::random();

        assert!(h.service.get_total_supply(alice.address).await.is_err());
    }

    // =============================================================================
    // DIRECT TRANSFER
    // =============================================================================

    #[tokio::test]
    async fn test_transfer_within_balance() {
        let h = Harness::new();
        let alice = Party::random();
        let bob = Party::random();
        h.mint(&alice, 1_000).await;

        let (amount, proof) = h.encrypt(&alice, 300);
        let moved = h
            .service
            .confidential_transfer(alice.address, bob.address, amount, proof)
            .await
            .unwrap();

        assert_eq!(h.decrypt(&alice, moved).await, 300);
        assert_eq!(h.decrypt(&bob, moved).await, 300);
        assert_eq!(h.balance(&alice).await, 700);
        assert_eq!(h.balance(&bob).await, 300);
    }

    #[tokio::test]
    async fn test_overdraft_moves_whole_balance() {
        let h = Harness::new();
        let alice = Party::random();
        let bob = Party::random();
        h.mint(&alice, 40).await;

        let (amount, proof) = h.encrypt(&alice, 100);
        let moved = h
            .service
            .confidential_transfer(alice.address, bob.address, amount, proof)
            .await
            .unwrap();

        assert_eq!(h.decrypt(&bob, moved).await, 40);
        assert_eq!(h.balance(&alice).await, 0);
        assert_eq!(h.balance(&bob).await, 40);
    }

    #[tokio::test]
    async fn test_transfer_from_empty_account_moves_nothing() {
        let h = Harness::new();
        let alice = Party::random();
        let bob = Party::random();

        let (amount, proof) = h.encrypt(&alice, 5);
        let moved = h
            .service
            .confidential_transfer(alice.address, bob.address, amount, proof)
            .await
            .unwrap();

        assert_eq!(h.decrypt(&alice, moved).await, 0);
        assert_eq!(h.balance(&bob).await, 0);
    }

    #[tokio::test]
    async fn test_proof_bound_to_sender() {
        let h = Harness::new();
        let alice = Party::random();
        let bob = Party::random();
        h.mint(&alice, 100).await;

        // Bob replays an input Alice encrypted for herself.
        let (amount, proof) = h.encrypt(&alice, 50);
        let err = h
            .service
            .confidential_transfer(bob.address, bob.address, amount, proof)
            .await
            .unwrap_err();

        assert!(matches!(err, LedgerError::InvalidProof(_)));
        assert_eq!(h.balance(&alice).await, 100);
    }

    #[tokio::test]
    async fn test_self_transfer_keeps_balance() {
        let h = Harness::new();
        let alice = Party::random();
        h.mint(&alice, 80).await;

        let (amount, proof) = h.encrypt(&alice, 30);
        h.service
            .confidential_transfer(alice.address, alice.address, amount, proof)
            .await
            .unwrap();

        assert_eq!(h.balance(&alice).await, 80);
    }

    // =============================================================================
    // ALLOWANCES
    // =============================================================================

    #[tokio::test]
    async fn test_approve_then_transfer_from() {
        let h = Harness::new();
        let alice = Party::random();
        let bob = Party::random();
        let carol = Party::random();
        h.mint(&alice, 1_000).await;

        let (amount, proof) = h.encrypt(&alice, 200);
        let allowance = h
            .service
            .approve(alice.address, bob.address, amount, proof)
            .await
            .unwrap();
        assert_eq!(
            h.service.get_allowance(alice.address, bob.address).await,
            allowance
        );
        assert_eq!(h.decrypt(&bob, allowance).await, 200);

        let moved = h
            .service
            .transfer_from(bob.address, alice.address, carol.address, allowance)
            .await
            .unwrap();

        assert_eq!(h.decrypt(&carol, moved).await, 200);
        assert_eq!(h.balance(&alice).await, 800);
        assert_eq!(h.balance(&carol).await, 200);

        let remaining = h.service.get_allowance(alice.address, bob.address).await;
        assert_eq!(h.decrypt(&bob, remaining).await, 0);
    }

    #[tokio::test]
    async fn test_transfer_from_clamped_by_balance() {
        let h = Harness::new();
        let alice = Party::random();
        let bob = Party::random();
        h.mint(&alice, 50).await;

        let (amount, proof) = h.encrypt(&alice, 500);
        let allowance = h
            .service
            .approve(alice.address, bob.address, amount, proof)
            .await
            .unwrap();

        let moved = h
            .service
            .transfer_from(bob.address, alice.address, bob.address, allowance)
            .await
            .unwrap();

        assert_eq!(h.decrypt(&bob, moved).await, 50);
        assert_eq!(h.balance(&alice).await, 0);
        let remaining = h.service.get_allowance(alice.address, bob.address).await;
        assert_eq!(h.decrypt(&bob, remaining).await, 450);
    }

    #[tokio::test]
    async fn test_transfer_from_rejects_foreign_handle() {
        let h = Harness::new();
        let alice = Party::random();
        let bob = Party::random();
        let mallory = Party::random();
        h.mint(&alice, 100).await;

        let (amount, proof) = h.encrypt(&alice, 100);
        let allowance = h
            .service
            .approve(alice.address, bob.address, amount, proof)
            .await
            .unwrap();

        // Mallory has no grant on Bob's allowance handle.
        let err = h
            .service
            .transfer_from(mallory.address, alice.address, mallory.address, allowance)
            .await
            .unwrap_err();

        assert!(err.is_authorization_failure());
        assert_eq!(h.balance(&alice).await, 100);
    }

    #[tokio::test]
    async fn test_decryption_refused_without_grant() {
        let h = Harness::new();
        let alice = Party::random();
        let bob = Party::random();
        let balance = h.mint(&alice, 10).await;

        let err = h.try_decrypt(&bob, &[balance]).await.unwrap_err();
        assert!(matches!(err, DecryptionError::NotGranted { .. }));
    }
}
