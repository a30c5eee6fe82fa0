//! # Test Harness
//!
//! A service whose owner holds a real signing key, so that owner-only
//! handles such as the total supply can be decrypted through the relayer.

use confidential_tip::prelude::*;
use k256::ecdsa::SigningKey;
use std::sync::Arc;

/// Service type used by every flow.
pub type Service = TipService<InMemoryCoprocessor, InMemoryEventLog>;

/// A keyed participant.
pub struct Party {
    /// Signing key for decryption requests.
    pub key: SigningKey,
    /// Address derived from the key.
    pub address: Address,
}

impl Party {
    /// Fresh random participant.
    pub fn random() -> Self {
        let key = SigningKey::random(&mut rand::thread_rng());
        let address = address_of(key.verifying_key());
        Self { key, address }
    }
}

/// Test environment: service plus its owner.
pub struct Harness {
    /// The service under test.
    pub service: Service,
    /// Owner of the ledger.
    pub owner: Party,
}

impl Harness {
    /// New service owned by a freshly keyed party.
    pub fn new() -> Self {
        let owner = Party::random();
        let config = ServiceConfig {
            owner: owner.address,
            ..ServiceConfig::default()
        };
        let service = TipService::new(
            Arc::new(InMemoryCoprocessor::new()),
            Arc::new(InMemoryEventLog::new()),
            config,
        );
        Self { service, owner }
    }

    /// Ledger address.
    pub fn contract(&self) -> Address {
        self.service.config().contract
    }

    /// Encrypts `amount` as an input from `sender`.
    pub fn encrypt(&self, sender: &Party, amount: u64) -> (ExternalEuint64, InputProof) {
        self.service
            .coprocessor()
            .encrypt_input(amount, self.contract(), sender.address)
    }

    /// Mints `amount` to `to` as the owner.
    pub async fn mint(&self, to: &Party, amount: u64) -> Euint64 {
        self.service
            .mint(self.owner.address, to.address, amount)
            .await
            .expect("owner mint")
    }

    /// Decrypts `values` on behalf of `who`.
    pub async fn try_decrypt(
        &self,
        who: &Party,
        values: &[Euint64],
    ) -> Result<Vec<u64>, DecryptionError> {
        let now = unix_now();
        let authorization = DecryptionAuthorization {
            handles: values.iter().map(|v| v.handle()).collect(),
            requester: who.address,
            contract: self.contract(),
            start_timestamp: now,
            duration_secs: 3_600,
        };
        let signed = sign_authorization(authorization, &who.key)?;
        let grants = self.service.grants().await;
        self.service.relayer().user_decrypt(&signed, &*grants, now)
    }

    /// Decrypts a single value on behalf of `who`.
    pub async fn decrypt(&self, who: &Party, value: Euint64) -> u64 {
        self.try_decrypt(who, &[value]).await.expect("decryption")[0]
    }

    /// Plaintext balance of `who`, decrypted by `who`.
    pub async fn balance(&self, who: &Party) -> u64 {
        let handle = self.service.get_balance(who.address).await;
        self.decrypt(who, handle).await
    }

    /// Plaintext total supply, decrypted by the owner.
    pub async fn supply(&self) -> u64 {
        let handle = self
            .service
            .get_total_supply(self.owner.address)
            .await
            .expect("owner reads supply");
        self.decrypt(&self.owner, handle).await
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
