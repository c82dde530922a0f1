//! Settlement engine
//!
//! `SettlementEngine` owns the registry, ledger, gateway and evaluator behind a single
//! writer lock. Each state-changing operation runs against a snapshot of the
//! components and either commits fully or restores the snapshot, so a failure in the
//! ledger after a registry write never leaves a partial effect. Claim settlement is
//! the exception: it is atomic per policy, since a payout that reached the transfer
//! port cannot be taken back.
//!
//! The engine holds two internal identities: a policy issuer, used for premium credit
//! and liability updates, and a claim settler, used by the evaluator. Administrative
//! operations take the caller's identity and are checked by the owning component.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{info, instrument, warn};

use core_kernel::{
    AccessControl, AccountId, Amount, Clock, ConfigurationChange, FundsTransfer,
    InMemoryTransfer, Percent, PolicyId, Role,
};
use domain_claims::{ClaimError, ClaimEvaluator, ClaimRecord, EvaluationReport};
use domain_liquidity::{LiquidityLedger, LiquidityPosition, PoolStats};
use domain_oracle::{GatewayStats, IssuerKey, ObservationGateway, WeatherObservation};
use domain_policy::{Policy, PolicyLimits, PolicyRegistry, PolicyRequest, PolicyStatus, RiskRateTable};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::journal::{JournalEntry, SettlementEvent};

/// State restored wholesale when an operation fails
#[derive(Debug, Clone)]
struct Components {
    registry: PolicyRegistry,
    ledger: LiquidityLedger,
    gateway: ObservationGateway,
    evaluator: ClaimEvaluator,
    paused: bool,
    engine_events: Vec<ConfigurationChange>,
}

struct EngineState<T> {
    components: Components,
    access: AccessControl,
    issuer: AccountId,
    transfer: T,
    journal: Vec<JournalEntry>,
    next_sequence: u64,
}

impl<T> EngineState<T> {
    /// Recomputes outstanding liability from the registry and pushes it to the ledger
    fn sync_liability(&mut self, now: DateTime<Utc>) -> EngineResult<()> {
        let liability = self.components.registry.outstanding_liability()?;
        self.components
            .ledger
            .set_liability(&self.issuer, liability, now)?;
        Ok(())
    }

    /// Moves pending component events into the journal
    fn record_events(&mut self, now: DateTime<Utc>) {
        let c = &mut self.components;
        let events = c
            .engine_events
            .drain(..)
            .map(SettlementEvent::Engine)
            .chain(c.gateway.take_events().into_iter().map(SettlementEvent::Oracle))
            .chain(c.registry.take_events().into_iter().map(SettlementEvent::Policy))
            .chain(c.ledger.take_events().into_iter().map(SettlementEvent::Ledger))
            .chain(c.evaluator.take_events().into_iter().map(SettlementEvent::Claim))
            .collect::<Vec<_>>();

        for event in events {
            self.journal.push(JournalEntry {
                sequence: self.next_sequence,
                recorded_at: now,
                event,
            });
            self.next_sequence += 1;
        }
    }
}

/// Errors whose side effects are kept instead of rolled back
///
/// A refused observation only touches the gateway's counters and rejection event.
/// A partial settlement has already moved funds for the claims it reports.
fn retains_effects(error: &EngineError) -> bool {
    matches!(
        error,
        EngineError::Claim(
            ClaimError::UnauthenticatedObservation { .. } | ClaimError::PartialSettlement { .. }
        )
    )
}

/// Serialized, all-or-nothing facade over the settlement components
pub struct SettlementEngine<T: FundsTransfer = InMemoryTransfer> {
    state: Mutex<EngineState<T>>,
    clock: Arc<dyn Clock>,
}

impl<T: FundsTransfer> SettlementEngine<T> {
    /// Builds an engine from configuration
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the configuration is rejected.
    pub fn new(config: &EngineConfig, transfer: T, clock: Arc<dyn Clock>) -> EngineResult<Self> {
        config.validate()?;
        let yield_fraction = Percent::new(config.yield_fraction)?;

        let issuer = AccountId::new();
        let settler = AccountId::new();
        let access = AccessControl::new(config.admin)
            .grant(Role::PolicyIssuer, issuer)
            .grant(Role::ClaimSettler, settler);

        let registry = PolicyRegistry::new(
            access.clone(),
            config.limits.clone(),
            config.risk_rates.clone(),
        )?;

        let components = Components {
            registry,
            ledger: LiquidityLedger::new(access.clone(), yield_fraction),
            gateway: ObservationGateway::new(access.clone(), config.issuer_key),
            evaluator: ClaimEvaluator::new(settler),
            paused: config.paused,
            engine_events: Vec::new(),
        };

        info!(admin = %config.admin, issuer_key = %config.issuer_key, paused = config.paused, "settlement engine initialised");

        Ok(Self {
            state: Mutex::new(EngineState {
                components,
                access,
                issuer,
                transfer,
                journal: Vec::new(),
                next_sequence: 0,
            }),
            clock,
        })
    }

    /// Runs `op` under the lock, restoring the component snapshot on failure
    fn transact<R>(
        &self,
        name: &'static str,
        op: impl FnOnce(&mut EngineState<T>, DateTime<Utc>) -> EngineResult<R>,
    ) -> EngineResult<R> {
        let now = self.clock.now();
        let mut state = self.state.lock();
        let snapshot = state.components.clone();

        match op(&mut *state, now) {
            Ok(value) => {
                state.record_events(now);
                Ok(value)
            }
            Err(e) if retains_effects(&e) => {
                state.record_events(now);
                Err(e)
            }
            Err(e) => {
                state.components = snapshot;
                warn!(operation = name, error = %e, "operation rejected, state restored");
                Err(e)
            }
        }
    }

    fn read<R>(&self, op: impl FnOnce(&Components) -> R) -> R {
        op(&self.state.lock().components)
    }

    // ------------------------------------------------------------------
    // Policies
    // ------------------------------------------------------------------

    /// Issues a policy owned by `holder` and credits its premium to the pool
    ///
    /// `request.holder` is replaced by `holder`.
    ///
    /// # Errors
    ///
    /// - `SystemPaused` while intake is paused
    /// - `Policy` if validation fails
    #[instrument(skip_all, fields(holder = %holder))]
    pub fn create_policy(&self, holder: &AccountId, mut request: PolicyRequest) -> EngineResult<PolicyId> {
        self.transact("create_policy", |state, now| {
            if state.components.paused {
                return Err(EngineError::SystemPaused);
            }
            request.holder = *holder;
            let premium = request.premium_paid;

            let id = state
                .components
                .registry
                .create_policy(&state.issuer, request, now)?;
            state
                .components
                .ledger
                .credit_premium(&state.issuer, premium, now)?;
            state.sync_liability(now)?;
            Ok(id)
        })
    }

    /// Premium required for `request` under the current rate table
    pub fn quote_premium(&self, request: &PolicyRequest) -> EngineResult<Amount> {
        Ok(self.read(|c| c.registry.quote_premium(request))?)
    }

    pub fn get_policy(&self, id: PolicyId) -> EngineResult<Policy> {
        Ok(self.read(|c| c.registry.get_policy(id).cloned())?)
    }

    pub fn policies_by_holder(&self, holder: &AccountId) -> Vec<PolicyId> {
        self.read(|c| c.registry.policies_by_holder(holder))
    }

    /// Policies in `status` as of now; lapsed Active policies count as Expired
    pub fn policies_by_status(&self, status: PolicyStatus) -> Vec<PolicyId> {
        let now = self.clock.now();
        self.read(|c| c.registry.policies_by_status(status, now))
    }

    /// Expires every lapsed Active policy
    #[instrument(skip_all, fields(caller = %caller))]
    pub fn sweep_expired(&self, caller: &AccountId) -> EngineResult<Vec<PolicyId>> {
        self.transact("sweep_expired", |state, now| {
            let expired = state.components.registry.sweep_expired(caller, now)?;
            state.sync_liability(now)?;
            Ok(expired)
        })
    }

    /// Expires one lapsed policy
    pub fn expire_policy(&self, caller: &AccountId, id: PolicyId) -> EngineResult<()> {
        self.transact("expire_policy", |state, now| {
            state.components.registry.mark_expired(caller, id, now)?;
            state.sync_liability(now)
        })
    }

    #[instrument(skip_all, fields(caller = %caller, policy_id = %id))]
    pub fn cancel_policy(&self, caller: &AccountId, id: PolicyId, reason: &str) -> EngineResult<()> {
        self.transact("cancel_policy", |state, now| {
            state
                .components
                .registry
                .cancel_policy(caller, id, reason, now)?;
            state.sync_liability(now)
        })
    }

    // ------------------------------------------------------------------
    // Liquidity
    // ------------------------------------------------------------------

    #[instrument(skip_all, fields(provider = %provider, amount = %amount))]
    pub fn deposit(&self, provider: &AccountId, amount: Amount) -> EngineResult<u128> {
        self.transact("deposit", |state, now| {
            Ok(state.components.ledger.deposit(provider, amount, now)?)
        })
    }

    #[instrument(skip_all, fields(provider = %provider, shares = shares))]
    pub fn withdraw(&self, provider: &AccountId, shares: u128) -> EngineResult<Amount> {
        self.transact("withdraw", |state, now| {
            let EngineState {
                components,
                transfer,
                ..
            } = &mut *state;
            Ok(components.ledger.withdraw(provider, shares, transfer, now)?)
        })
    }

    pub fn calculate_yield(&self, provider: &AccountId) -> EngineResult<Amount> {
        Ok(self.read(|c| c.ledger.calculate_yield(provider))?)
    }

    pub fn pool_stats(&self) -> EngineResult<PoolStats> {
        Ok(self.read(|c| c.ledger.pool_stats())?)
    }

    pub fn available_liquidity(&self) -> Amount {
        self.read(|c| c.ledger.available_liquidity())
    }

    pub fn position(&self, provider: &AccountId) -> Option<LiquidityPosition> {
        self.read(|c| c.ledger.position(provider).cloned())
    }

    // ------------------------------------------------------------------
    // Claims
    // ------------------------------------------------------------------

    /// Settles every policy `observation` triggers
    ///
    /// Runs while paused. A refused observation is still counted and journaled by the
    /// gateway. If a payout fails after others in the batch were transferred, the
    /// completed claims are kept and journaled and `PartialSettlement` is returned.
    /// Any other failure restores all state.
    #[instrument(skip_all, fields(observation = %observation.payload))]
    pub fn evaluate(&self, observation: &WeatherObservation) -> EngineResult<EvaluationReport> {
        self.transact("evaluate", |state, now| {
            let EngineState {
                components: c,
                transfer,
                ..
            } = &mut *state;
            let outcome = c.evaluator.evaluate(
                observation,
                &mut c.gateway,
                &mut c.registry,
                &mut c.ledger,
                transfer,
                now,
            );
            match outcome {
                Ok(report) => {
                    if !report.is_noop() {
                        state.sync_liability(now)?;
                    }
                    Ok(report)
                }
                Err(e @ ClaimError::PartialSettlement { .. }) => {
                    // Completed payouts are kept, so liability must follow them
                    if let Err(sync) = state.sync_liability(now) {
                        warn!(error = %sync, "liability sync failed after partial settlement");
                    }
                    Err(e.into())
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    pub fn claims(&self) -> Vec<ClaimRecord> {
        self.read(|c| c.evaluator.claims().to_vec())
    }

    pub fn claim_for(&self, policy_id: PolicyId) -> Option<ClaimRecord> {
        self.read(|c| c.evaluator.claims_for(policy_id).cloned())
    }

    pub fn gateway_stats(&self) -> GatewayStats {
        self.read(|c| c.gateway.stats())
    }

    // ------------------------------------------------------------------
    // Administration
    // ------------------------------------------------------------------

    pub fn issuer_key(&self) -> IssuerKey {
        self.read(|c| *c.gateway.issuer())
    }

    #[instrument(skip_all, fields(caller = %caller))]
    pub fn set_issuer(&self, caller: &AccountId, key: [u8; 32]) -> EngineResult<()> {
        self.transact("set_issuer", |state, now| {
            Ok(state.components.gateway.set_issuer(caller, key, now)?)
        })
    }

    #[instrument(skip_all, fields(caller = %caller))]
    pub fn set_yield_fraction(&self, caller: &AccountId, percent: u32) -> EngineResult<()> {
        self.transact("set_yield_fraction", |state, now| {
            Ok(state
                .components
                .ledger
                .set_yield_fraction(caller, percent, now)?)
        })
    }

    pub fn set_limits(&self, caller: &AccountId, limits: PolicyLimits) -> EngineResult<()> {
        self.transact("set_limits", |state, now| {
            Ok(state.components.registry.set_limits(caller, limits, now)?)
        })
    }

    pub fn set_risk_rates(&self, caller: &AccountId, rates: RiskRateTable) -> EngineResult<()> {
        self.transact("set_risk_rates", |state, now| {
            Ok(state
                .components
                .registry
                .set_risk_rates(caller, rates, now)?)
        })
    }

    /// Pauses or resumes policy intake (admin only)
    #[instrument(skip_all, fields(caller = %caller))]
    pub fn set_paused(&self, caller: &AccountId, paused: bool) -> EngineResult<()> {
        self.transact("set_paused", |state, now| {
            state.access.ensure(caller, Role::Admin)?;
            let before = state.components.paused;
            if before != paused {
                state.components.paused = paused;
                state
                    .components
                    .engine_events
                    .push(ConfigurationChange::new("paused", before, paused, now));
                info!(paused, "policy intake pause toggled");
            }
            Ok(())
        })
    }

    pub fn is_paused(&self) -> bool {
        self.read(|c| c.paused)
    }

    // ------------------------------------------------------------------
    // Journal
    // ------------------------------------------------------------------

    pub fn journal(&self) -> Vec<JournalEntry> {
        self.state.lock().journal.clone()
    }

    /// Returns and clears the journal; sequence numbers keep increasing
    pub fn drain_journal(&self) -> Vec<JournalEntry> {
        std::mem::take(&mut self.state.lock().journal)
    }

    /// Read access to the transfer adapter
    pub fn with_transfer<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.state.lock().transfer)
    }

    /// Mutable access to the transfer adapter, under the engine lock
    pub fn with_transfer_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.state.lock().transfer)
    }
}
