//! # Tip Service
//!
//! Async facade over the domain. Owns the world state and serialises every
//! state-changing call behind a single write lock.
//!
//! ## Atomicity
//!
//! Each call runs against the live state after taking a checkpoint of the
//! account tables. On success the checkpoint is dropped, pending grants are
//! committed and buffered events are published in order; on failure the
//! checkpoint is restored, pending grants are removed and the events are
//! dropped. Ciphertexts the coprocessor issued for an aborted call remain in
//! the coprocessor but no state or grant refers to them.

use crate::adapters::{DecryptionRelayer, InMemoryCoprocessor, InMemoryEventLog};
use crate::domain::acl::AclTable;
use crate::domain::batch::batch_send_tips;
use crate::domain::invariants::{check_all_invariants, InvariantCheckResult};
use crate::domain::services::keccak256;
use crate::domain::state::{CallContext, WorldState};
use crate::domain::tips::{send_tip, total_tips_received, total_tips_sent};
use crate::domain::value_objects::{
    Address, Euint64, ExternalEuint64, InputProof, TokenMetadata,
};
use crate::errors::{ConfigError, LedgerError};
use crate::ports::inbound::{ConfidentialTokenApi, IdentityApi, TipApi};
use crate::ports::outbound::{EventPublisher, FheCoprocessor, InputVerifier};

use async_trait::async_trait;
use std::env;
use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Tip service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address of the ledger itself; receives a grant on every stored handle.
    pub contract: Address,
    /// Administrative principal (mint, total supply, any balance).
    pub owner: Address,
    /// Token descriptors.
    pub token: TokenMetadata,
    /// Log per-call detail at debug level.
    pub enable_tracing: bool,
}

/// Last 20 bytes of `keccak256(label)`.
fn label_address(label: &[u8]) -> Address {
    let hash = keccak256(label);
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&hash[12..]);
    Address::new(bytes)
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            contract: label_address(b"confidential-tip/contract"),
            owner: label_address(b"confidential-tip/owner"),
            token: TokenMetadata::default(),
            enable_tracing: false,
        }
    }
}

impl ServiceConfig {
    /// Defaults overridden by environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `TIP_CONTRACT_ADDRESS`: ledger address (hex)
    /// - `TIP_OWNER_ADDRESS`: owner address (hex)
    /// - `TIP_TOKEN_NAME`: token name (default: Confidential USDT)
    /// - `TIP_TOKEN_SYMBOL`: token symbol (default: CUSDT)
    /// - `TIP_ENABLE_TRACING`: per-call debug logs (default: false)
    ///
    /// # Errors
    ///
    /// [`ConfigError`] on malformed addresses or owner equal to contract.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let address_var = |var: &'static str, default: Address| match env::var(var) {
            Ok(value) => Address::from_hex(value.trim())
                .ok_or(ConfigError::InvalidAddress { var, value }),
            Err(_) => Ok(default),
        };

        let config = Self {
            contract: address_var("TIP_CONTRACT_ADDRESS", defaults.contract)?,
            owner: address_var("TIP_OWNER_ADDRESS", defaults.owner)?,
            token: TokenMetadata {
                name: env::var("TIP_TOKEN_NAME").unwrap_or(defaults.token.name),
                symbol: env::var("TIP_TOKEN_SYMBOL").unwrap_or(defaults.token.symbol),
                decimals: defaults.token.decimals,
            },
            enable_tracing: env::var("TIP_ENABLE_TRACING")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(false),
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field constraints.
    ///
    /// # Errors
    ///
    /// [`ConfigError::OwnerIsContract`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.owner == self.contract {
            return Err(ConfigError::OwnerIsContract);
        }
        Ok(())
    }
}

/// Statistics for the tip service.
#[derive(Debug, Default, Clone)]
pub struct ServiceStats {
    /// State-changing calls that committed.
    pub calls_committed: u64,
    /// State-changing calls that reverted.
    pub calls_reverted: u64,
    /// Reverts caused by the caller's identity (unauthorized, not registered).
    pub rejected_requests: u64,
    /// Committed mints.
    pub mints: u64,
    /// Committed transfers, direct and delegated.
    pub transfers: u64,
    /// Committed approvals.
    pub approvals: u64,
    /// Committed registrations.
    pub registrations: u64,
    /// Committed tips, batch entries included.
    pub tips_sent: u64,
    /// Committed batches.
    pub batches: u64,
}

/// What a committed call did, for stats and metrics.
#[derive(Clone, Copy, Debug)]
enum CallKind {
    Mint,
    Transfer,
    TransferFrom,
    Approve,
    Register,
    Tip,
    Batch(usize),
}

impl CallKind {
    const fn operation(self) -> &'static str {
        match self {
            Self::Mint => "mint",
            Self::Transfer => "confidential_transfer",
            Self::TransferFrom => "transfer_from",
            Self::Approve => "approve",
            Self::Register => "register_github_user",
            Self::Tip => "send_tip",
            Self::Batch(_) => "batch_send_tips",
        }
    }

    fn record_commit(self, stats: &mut ServiceStats) {
        stats.calls_committed += 1;
        match self {
            Self::Mint => stats.mints += 1,
            Self::Transfer | Self::TransferFrom => stats.transfers += 1,
            Self::Approve => stats.approvals += 1,
            Self::Register => stats.registrations += 1,
            Self::Tip => stats.tips_sent += 1,
            Self::Batch(n) => {
                stats.batches += 1;
                stats.tips_sent += n as u64;
            }
        }

        #[cfg(feature = "metrics")]
        {
            use tip_telemetry::metrics;
            match self {
                Self::Mint => metrics::MINTS.inc(),
                Self::Transfer => metrics::TRANSFERS.with_label_values(&["direct"]).inc(),
                Self::TransferFrom => metrics::TRANSFERS.with_label_values(&["delegated"]).inc(),
                Self::Approve => metrics::APPROVALS.inc(),
                Self::Register => metrics::REGISTRATIONS.inc(),
                Self::Tip => metrics::TIPS_SENT.inc(),
                Self::Batch(n) => {
                    metrics::TIPS_SENT.inc_by(n as f64);
                    if n > 0 {
                        metrics::BATCH_SIZE.observe(n as f64);
                    }
                }
            }
            tip_telemetry::record_call(self.operation(), None);
        }
    }
}

/// The confidential ledger with its identity and tipping layers.
pub struct TipService<C, E>
where
    C: FheCoprocessor + InputVerifier + 'static,
    E: EventPublisher + 'static,
{
    /// Service configuration.
    config: ServiceConfig,
    /// Encrypted algebra and input verification.
    coprocessor: Arc<C>,
    /// Sink for committed events.
    events: Arc<E>,
    /// Live state; replaced wholesale on commit.
    state: Arc<RwLock<WorldState>>,
    /// Service statistics.
    stats: Arc<RwLock<ServiceStats>>,
}

impl<C, E> TipService<C, E>
where
    C: FheCoprocessor + InputVerifier + 'static,
    E: EventPublisher + 'static,
{
    /// Create a new service with empty state.
    pub fn new(coprocessor: Arc<C>, events: Arc<E>, config: ServiceConfig) -> Self {
        let state = WorldState::new(config.owner, config.token.clone());
        Self {
            config,
            coprocessor,
            events,
            state: Arc::new(RwLock::new(state)),
            stats: Arc::new(RwLock::new(ServiceStats::default())),
        }
    }

    /// Service configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Shared handle to the coprocessor.
    pub fn coprocessor(&self) -> Arc<C> {
        Arc::clone(&self.coprocessor)
    }

    /// Shared handle to the event sink.
    pub fn event_publisher(&self) -> Arc<E> {
        Arc::clone(&self.events)
    }

    /// Get current service statistics.
    pub async fn stats(&self) -> ServiceStats {
        self.stats.read().await.clone()
    }

    /// Read access to the grant table, as served to the decryption relayer.
    ///
    /// State-changing calls wait while the guard is held.
    pub async fn grants(&self) -> RwLockReadGuard<'_, AclTable> {
        RwLockReadGuard::map(self.state.read().await, |state| &state.acl)
    }

    /// Runs every runtime invariant check against the committed state.
    pub async fn check_invariants(&self) -> InvariantCheckResult {
        check_all_invariants(&*self.state.read().await, self.config.contract)
    }

    /// Runs `f` against the live state, rolling it back to a checkpoint on
    /// failure.
    async fn execute<T, F>(&self, kind: CallKind, caller: Address, f: F) -> Result<T, LedgerError>
    where
        T: Send,
        F: FnOnce(&mut WorldState, &mut CallContext<'_>) -> Result<T, LedgerError> + Send,
    {
        #[cfg(feature = "metrics")]
        let _timer = tip_telemetry::CallTimer::start(kind.operation());
        let call_id = Uuid::new_v4();

        let mut state = self.state.write().await;
        let checkpoint = state.checkpoint();

        let fhe: &dyn FheCoprocessor = self.coprocessor.as_ref();
        let verifier: &dyn InputVerifier = self.coprocessor.as_ref();
        let mut ctx = CallContext::new(caller, self.config.contract, fhe, verifier);

        match f(&mut *state, &mut ctx) {
            Ok(value) => {
                let events = ctx.into_events();
                state.commit(checkpoint);
                let event_count = events.len();
                if self.config.enable_tracing {
                    debug!(%call_id, ?events, "Publishing events");
                }
                for event in events {
                    self.events.publish(event).await;
                }
                drop(state);

                kind.record_commit(&mut *self.stats.write().await);
                info!(
                    %call_id,
                    operation = kind.operation(),
                    caller = %caller,
                    events = event_count,
                    "Call committed"
                );
                Ok(value)
            }
            Err(error) => {
                state.rollback(checkpoint);
                drop(state);
                {
                    let mut stats = self.stats.write().await;
                    stats.calls_reverted += 1;
                    if error.is_authorization_failure() {
                        stats.rejected_requests += 1;
                    }
                }
                #[cfg(feature = "metrics")]
                tip_telemetry::record_call(kind.operation(), Some(error.kind()));
                warn!(
                    %call_id,
                    operation = kind.operation(),
                    caller = %caller,
                    error = %error,
                    "Call reverted"
                );
                Err(error)
            }
        }
    }
}

impl<E> TipService<InMemoryCoprocessor, E>
where
    E: EventPublisher + 'static,
{
    /// Decryption relayer sharing this service's coprocessor.
    pub fn relayer(&self) -> DecryptionRelayer {
        DecryptionRelayer::new(Arc::clone(&self.coprocessor), self.config.contract)
    }
}

#[async_trait]
impl<C, E> ConfidentialTokenApi for TipService<C, E>
where
    C: FheCoprocessor + InputVerifier + 'static,
    E: EventPublisher + 'static,
{
    async fn token_metadata(&self) -> TokenMetadata {
        self.config.token.clone()
    }

    async fn owner(&self) -> Address {
        self.config.owner
    }

    #[instrument(skip(self), fields(caller = %caller, to = %to))]
    async fn mint(&self, caller: Address, to: Address, amount: u64) -> Result<Euint64, LedgerError> {
        self.execute(CallKind::Mint, caller, |state, ctx| {
            state.ledger.mint(&mut state.acl, ctx, to, amount)
        })
        .await
    }

    #[instrument(skip(self, amount, proof), fields(caller = %caller, to = %to))]
    async fn confidential_transfer(
        &self,
        caller: Address,
        to: Address,
        amount: ExternalEuint64,
        proof: InputProof,
    ) -> Result<Euint64, LedgerError> {
        self.execute(CallKind::Transfer, caller, |state, ctx| {
            state
                .ledger
                .confidential_transfer(&mut state.acl, ctx, to, amount, proof)
        })
        .await
    }

    #[instrument(skip(self, amount, proof), fields(caller = %caller, spender = %spender))]
    async fn approve(
        &self,
        caller: Address,
        spender: Address,
        amount: ExternalEuint64,
        proof: InputProof,
    ) -> Result<Euint64, LedgerError> {
        self.execute(CallKind::Approve, caller, |state, ctx| {
            state.ledger.approve(&mut state.acl, ctx, spender, amount, proof)
        })
        .await
    }

    #[instrument(skip(self, requested), fields(caller = %caller, from = %from, to = %to))]
    async fn transfer_from(
        &self,
        caller: Address,
        from: Address,
        to: Address,
        requested: Euint64,
    ) -> Result<Euint64, LedgerError> {
        self.execute(CallKind::TransferFrom, caller, |state, ctx| {
            state
                .ledger
                .transfer_from(&mut state.acl, ctx, from, to, requested)
        })
        .await
    }

    async fn get_balance(&self, caller: Address) -> Euint64 {
        self.state.read().await.ledger.balance(caller)
    }

    async fn get_balance_of(
        &self,
        caller: Address,
        account: Address,
    ) -> Result<Euint64, LedgerError> {
        let result = self.state.read().await.ledger.balance_of(caller, account);
        if let Err(e) = &result {
            debug!(caller = %caller, account = %account, error = %e, "Balance query refused");
        }
        result
    }

    async fn get_allowance(&self, caller: Address, spender: Address) -> Euint64 {
        self.state.read().await.ledger.allowance(caller, spender)
    }

    async fn get_total_supply(&self, caller: Address) -> Result<Euint64, LedgerError> {
        self.state.read().await.ledger.total_supply(caller)
    }
}

#[async_trait]
impl<C, E> IdentityApi for TipService<C, E>
where
    C: FheCoprocessor + InputVerifier + 'static,
    E: EventPublisher + 'static,
{
    #[instrument(skip(self), fields(caller = %caller))]
    async fn register_github_user(
        &self,
        caller: Address,
        username: &str,
    ) -> Result<(), LedgerError> {
        self.execute(CallKind::Register, caller, |state, ctx| {
            state.registry.register(ctx.caller, username)
        })
        .await
    }

    async fn get_github_username(&self, address: Address) -> String {
        self.state
            .read()
            .await
            .registry
            .github_username(address)
            .to_string()
    }

    async fn get_wallet_address(&self, username: &str) -> Address {
        self.state.read().await.registry.wallet_address(username)
    }

    async fn is_registered(&self, address: Address) -> bool {
        self.state.read().await.registry.is_registered(address)
    }

    async fn github_username_exists(&self, username: &str) -> bool {
        self.state.read().await.registry.username_exists(username)
    }
}

#[async_trait]
impl<C, E> TipApi for TipService<C, E>
where
    C: FheCoprocessor + InputVerifier + 'static,
    E: EventPublisher + 'static,
{
    #[instrument(skip(self, amount, proof), fields(caller = %caller))]
    async fn send_tip(
        &self,
        caller: Address,
        to_username: &str,
        amount: ExternalEuint64,
        proof: InputProof,
    ) -> Result<Euint64, LedgerError> {
        self.execute(CallKind::Tip, caller, |state, ctx| {
            send_tip(state, ctx, to_username, amount, proof)
        })
        .await
    }

    #[instrument(skip(self, amounts, proofs), fields(caller = %caller, count = to_usernames.len()))]
    async fn batch_send_tips(
        &self,
        caller: Address,
        to_usernames: Vec<String>,
        amounts: Vec<ExternalEuint64>,
        proofs: Vec<InputProof>,
    ) -> Result<Vec<Euint64>, LedgerError> {
        let kind = CallKind::Batch(to_usernames.len());
        self.execute(kind, caller, |state, ctx| {
            batch_send_tips(state, ctx, &to_usernames, amounts, proofs)
        })
        .await
    }

    async fn get_total_tips_sent(&self, caller: Address) -> Result<Euint64, LedgerError> {
        total_tips_sent(&*self.state.read().await, caller)
    }

    async fn get_total_tips_received(&self, caller: Address) -> Result<Euint64, LedgerError> {
        total_tips_received(&*self.state.read().await, caller)
    }
}

/// Service over in-memory adapters with the default configuration.
#[must_use]
pub fn create_test_service() -> TipService<InMemoryCoprocessor, InMemoryEventLog> {
    TipService::new(
        Arc::new(InMemoryCoprocessor::new()),
        Arc::new(InMemoryEventLog::new()),
        ServiceConfig::default(),
    )
}
