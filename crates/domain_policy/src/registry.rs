//! Policy registry
//!
//! Owns every policy record and its status transitions. Records are keyed by a
//! monotonically increasing `PolicyId` and are never deleted.
//!
//! The registry performs no partial writes: every operation validates fully before the
//! first mutation, so a failed call leaves the registry exactly as it was.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

use core_kernel::{
    AccessControl, AccountId, Amount, ConfigurationChange, LocationId, ParameterKind, PolicyId,
    Role,
};
use crate::error::PolicyError;
use crate::events::PolicyEvent;
use crate::limits::PolicyLimits;
use crate::policy::{Policy, PolicyRequest, PolicyStatus};
use crate::premium::{PremiumCalculator, PremiumInputs, RiskRateTable};

/// Registry of all policies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyRegistry {
    policies: BTreeMap<PolicyId, Policy>,
    by_holder: HashMap<AccountId, Vec<PolicyId>>,
    /// `None` once the id sequence is exhausted
    next_id: Option<PolicyId>,
    limits: PolicyLimits,
    calculator: PremiumCalculator,
    access: AccessControl,
    #[serde(skip)]
    events: Vec<PolicyEvent>,
}

impl PolicyRegistry {
    /// Creates an empty registry
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the limits or rate table are inconsistent.
    pub fn new(
        access: AccessControl,
        limits: PolicyLimits,
        rates: RiskRateTable,
    ) -> Result<Self, PolicyError> {
        limits.validate()?;
        rates.validate()?;

        Ok(Self {
            policies: BTreeMap::new(),
            by_holder: HashMap::new(),
            next_id: Some(PolicyId::FIRST),
            limits,
            calculator: PremiumCalculator::new(rates),
            access,
            events: Vec::new(),
        })
    }

    /// Creates an empty registry with default limits and rates
    pub fn with_defaults(access: AccessControl) -> Self {
        Self {
            policies: BTreeMap::new(),
            by_holder: HashMap::new(),
            next_id: Some(PolicyId::FIRST),
            limits: PolicyLimits::default(),
            calculator: PremiumCalculator::default(),
            access,
            events: Vec::new(),
        }
    }

    pub fn limits(&self) -> &PolicyLimits {
        &self.limits
    }

    pub fn risk_rates(&self) -> &RiskRateTable {
        self.calculator.rates()
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Events recorded since the last `take_events`
    pub fn events(&self) -> &[PolicyEvent] {
        &self.events
    }

    /// Returns accumulated domain events and clears them
    pub fn take_events(&mut self) -> Vec<PolicyEvent> {
        std::mem::take(&mut self.events)
    }

    // ------------------------------------------------------------------
    // Creation
    // ------------------------------------------------------------------

    /// Creates a new Active policy
    ///
    /// The caller must hold `PolicyIssuer`. The premium credit to the pool is the
    /// caller's responsibility and must be applied in the same transaction.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` if the caller is not a policy issuer
    /// - `InvalidPolicyParameters` if any validation rule fails
    /// - `IdSpaceExhausted` if no further ids can be allocated
    pub fn create_policy(
        &mut self,
        caller: &AccountId,
        request: PolicyRequest,
        now: DateTime<Utc>,
    ) -> Result<PolicyId, PolicyError> {
        self.access.ensure(caller, Role::PolicyIssuer)?;
        self.validate(&request, now)?;

        let id = self.next_id.ok_or(PolicyError::IdSpaceExhausted)?;
        let policy = Policy::issue(id, request, now);

        self.events.push(PolicyEvent::PolicyCreated {
            policy_id: id,
            holder: policy.holder(),
            location: policy.location().clone(),
            parameter: policy.parameter(),
            premium_paid: policy.premium_paid(),
            payout_amount: policy.payout_amount(),
            coverage_start: policy.window().start(),
            coverage_end: policy.window().end(),
            timestamp: now,
        });
        info!(
            policy_id = %id,
            holder = %policy.holder(),
            location = %policy.location(),
            parameter = %policy.parameter(),
            trigger = %policy.trigger(),
            premium = %policy.premium_paid(),
            payout = %policy.payout_amount(),
            "policy created"
        );

        self.by_holder.entry(policy.holder()).or_default().push(id);
        self.policies.insert(id, policy);
        self.next_id = id.next();

        Ok(id)
    }

    /// Runs every `create_policy` validation rule without writing anything
    ///
    /// # Errors
    ///
    /// Returns `InvalidPolicyParameters` describing the first rule that failed.
    pub fn validate(&self, request: &PolicyRequest, now: DateTime<Utc>) -> Result<(), PolicyError> {
        if request.location.is_empty() {
            return Err(PolicyError::invalid("location must not be empty"));
        }

        let window = &request.window;
        if !window.starts_after(now) {
            return Err(PolicyError::invalid(format!(
                "coverage start {} is not after {}",
                window.start(),
                now
            )));
        }

        let duration = window.duration();
        if duration < self.limits.min_duration() || duration > self.limits.max_duration() {
            return Err(PolicyError::invalid(format!(
                "coverage of {}s outside [{}s, {}s]",
                duration.num_seconds(),
                self.limits.min_duration_secs,
                self.limits.max_duration_secs
            )));
        }

        let range = self
            .limits
            .threshold_range(request.parameter)
            .ok_or_else(|| {
                PolicyError::invalid(format!("{} is not underwritten", request.parameter))
            })?;
        if !range.contains(request.trigger.threshold) {
            return Err(PolicyError::invalid(format!(
                "threshold {} outside [{}, {}] for {}",
                request.trigger.threshold, range.min, range.max, request.parameter
            )));
        }

        if request.payout_amount < self.limits.min_payout
            || request.payout_amount > self.limits.max_payout
        {
            return Err(PolicyError::invalid(format!(
                "payout {} outside [{}, {}]",
                request.payout_amount, self.limits.min_payout, self.limits.max_payout
            )));
        }

        let required = self.quote_premium(request)?;
        if request.premium_paid < required {
            return Err(PolicyError::invalid(format!(
                "premium {} below required {}",
                request.premium_paid, required
            )));
        }

        Ok(())
    }

    /// Premium the current rate table requires for `request`
    pub fn quote_premium(&self, request: &PolicyRequest) -> Result<Amount, PolicyError> {
        let inputs = PremiumInputs {
            duration: request.window.duration(),
            payout: request.payout_amount,
            parameter: request.parameter,
            trigger: request.trigger,
        };
        self.calculator
            .required_premium(&inputs, self.limits.threshold_range(request.parameter))
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn get_policy(&self, id: PolicyId) -> Result<&Policy, PolicyError> {
        self.policies.get(&id).ok_or(PolicyError::NotFound(id))
    }

    /// Ids held by `holder`, in creation order
    pub fn policies_by_holder(&self, holder: &AccountId) -> Vec<PolicyId> {
        self.by_holder.get(holder).cloned().unwrap_or_default()
    }

    /// Ids whose status is `status` as of `as_of`
    ///
    /// Active additionally requires `as_of` inside the coverage window. Expired also
    /// includes records still tagged Active whose window ended before `as_of`.
    pub fn policies_by_status(&self, status: PolicyStatus, as_of: DateTime<Utc>) -> Vec<PolicyId> {
        let ids: Vec<PolicyId> = self
            .policies
            .values()
            .filter(|policy| match status {
                PolicyStatus::Active => policy.is_in_force_at(as_of),
                PolicyStatus::Expired => policy.is_expired_at(as_of),
                other => policy.status() == other,
            })
            .map(Policy::id)
            .collect();
        debug!(%status, %as_of, count = ids.len(), "policies by status");
        ids
    }

    /// Policies covering `parameter` at `location` whose window contains `at`
    ///
    /// Stored status is not filtered; resolved policies are returned so the caller can
    /// report them as already resolved.
    pub fn candidates(
        &self,
        location: &LocationId,
        parameter: ParameterKind,
        at: DateTime<Utc>,
    ) -> Vec<&Policy> {
        self.policies
            .values()
            .filter(|policy| policy.covers(location, parameter) && policy.window().contains(at))
            .collect()
    }

    /// Sum of payout amounts over stored-Active policies
    pub fn outstanding_liability(&self) -> Result<Amount, PolicyError> {
        self.policies
            .values()
            .filter(|policy| policy.is_active())
            .try_fold(Amount::ZERO, |total, policy| {
                total.checked_add(policy.payout_amount())
            })
            .map_err(PolicyError::from)
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    /// Active -> Claimed
    ///
    /// # Errors
    ///
    /// - `Unauthorized` unless the caller holds `ClaimSettler`
    /// - `NotFound` for an unknown id
    /// - `AlreadyResolved` if the policy is no longer Active
    pub fn mark_claimed(
        &mut self,
        caller: &AccountId,
        id: PolicyId,
        at: DateTime<Utc>,
    ) -> Result<(), PolicyError> {
        self.access.ensure(caller, Role::ClaimSettler)?;
        let policy = self.policies.get_mut(&id).ok_or(PolicyError::NotFound(id))?;
        let from = policy.resolve(PolicyStatus::Claimed, at)?;

        self.events.push(PolicyEvent::PolicyClaimed {
            policy_id: id,
            from,
            to: PolicyStatus::Claimed,
            timestamp: at,
        });
        info!(policy_id = %id, "policy claimed");
        Ok(())
    }

    /// Undoes `mark_claimed` for a policy whose payout failed
    ///
    /// The pending `PolicyClaimed` event is withdrawn, so the policy reads as if it
    /// had never been claimed.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` unless the caller holds `ClaimSettler`
    /// - `NotFound` for an unknown id
    /// - `AlreadyResolved` if the policy is not Claimed
    pub fn release_claim(&mut self, caller: &AccountId, id: PolicyId) -> Result<(), PolicyError> {
        self.access.ensure(caller, Role::ClaimSettler)?;
        let policy = self.policies.get_mut(&id).ok_or(PolicyError::NotFound(id))?;
        policy.reopen_claim()?;

        if let Some(pos) = self.events.iter().rposition(
            |e| matches!(e, PolicyEvent::PolicyClaimed { policy_id, .. } if *policy_id == id),
        ) {
            self.events.remove(pos);
        }
        warn!(policy_id = %id, "claim released, policy back to active");
        Ok(())
    }

    /// Active -> Expired, once the coverage window has lapsed
    pub fn mark_expired(
        &mut self,
        caller: &AccountId,
        id: PolicyId,
        now: DateTime<Utc>,
    ) -> Result<(), PolicyError> {
        self.access
            .ensure_any(caller, &[Role::Admin, Role::ClaimSettler])?;
        self.expire(id, now)
    }

    /// Expires every Active policy whose window has lapsed, returning their ids
    pub fn sweep_expired(
        &mut self,
        caller: &AccountId,
        now: DateTime<Utc>,
    ) -> Result<Vec<PolicyId>, PolicyError> {
        self.access
            .ensure_any(caller, &[Role::Admin, Role::ClaimSettler])?;

        let lapsed: Vec<PolicyId> = self
            .policies
            .values()
            .filter(|policy| policy.is_active() && policy.window().has_lapsed(now))
            .map(Policy::id)
            .collect();

        for id in &lapsed {
            self.expire(*id, now)?;
        }
        if !lapsed.is_empty() {
            info!(count = lapsed.len(), "expired lapsed policies");
        }
        Ok(lapsed)
    }

    fn expire(&mut self, id: PolicyId, now: DateTime<Utc>) -> Result<(), PolicyError> {
        let policy = self.policies.get_mut(&id).ok_or(PolicyError::NotFound(id))?;
        if policy.is_active() && !policy.window().has_lapsed(now) {
            return Err(PolicyError::CoverageNotLapsed(id));
        }
        let from = policy.resolve(PolicyStatus::Expired, now)?;
        let coverage_end = policy.window().end();

        self.events.push(PolicyEvent::PolicyExpired {
            policy_id: id,
            from,
            to: PolicyStatus::Expired,
            coverage_end,
            timestamp: now,
        });
        info!(policy_id = %id, %coverage_end, "policy expired");
        Ok(())
    }

    /// Active -> Cancelled (admin only)
    pub fn cancel_policy(
        &mut self,
        caller: &AccountId,
        id: PolicyId,
        reason: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), PolicyError> {
        self.access.ensure(caller, Role::Admin)?;
        let policy = self.policies.get_mut(&id).ok_or(PolicyError::NotFound(id))?;
        let from = policy.resolve(PolicyStatus::Cancelled, now)?;
        let reason = reason.into();

        info!(policy_id = %id, %reason, "policy cancelled");
        self.events.push(PolicyEvent::PolicyCancelled {
            policy_id: id,
            from,
            to: PolicyStatus::Cancelled,
            reason,
            timestamp: now,
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    /// Replaces the creation limits (admin only)
    pub fn set_limits(
        &mut self,
        caller: &AccountId,
        limits: PolicyLimits,
        now: DateTime<Utc>,
    ) -> Result<(), PolicyError> {
        self.access.ensure(caller, Role::Admin)?;
        limits.validate()?;

        let change = ConfigurationChange::json("policy_limits", &self.limits, &limits, now);
        self.limits = limits;
        self.events.push(PolicyEvent::ConfigurationChanged(change));
        Ok(())
    }

    /// Replaces the risk-rate table (admin only)
    pub fn set_risk_rates(
        &mut self,
        caller: &AccountId,
        rates: RiskRateTable,
        now: DateTime<Utc>,
    ) -> Result<(), PolicyError> {
        self.access.ensure(caller, Role::Admin)?;
        rates.validate()?;

        let change = ConfigurationChange::json("risk_rates", self.calculator.rates(), &rates, now);
        self.calculator.replace_rates(rates);
        self.events.push(PolicyEvent::ConfigurationChanged(change));
        Ok(())
    }
}
