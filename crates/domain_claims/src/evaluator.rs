//! Claim evaluator
//!
//! Turns an authenticated observation into payouts. For each matching policy the
//! registry transition to Claimed happens before the ledger debit; the transition is
//! the idempotency gate, so a policy can be paid at most once no matter how many
//! observations satisfy its trigger.
//!
//! Settlement is atomic per policy. A payout that fails releases its own claim and
//! stops the batch, but payouts already transferred are kept.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use core_kernel::{AccountId, Amount, ClaimId, FundsTransfer, PolicyId};
use domain_liquidity::LiquidityLedger;
use domain_oracle::{ObservationGateway, ObservationPayload, WeatherObservation};
use domain_policy::{PolicyError, PolicyRegistry};

use crate::claim::{ClaimRecord, EvaluationReport};
use crate::error::ClaimError;
use crate::events::ClaimEvent;

/// A policy whose trigger was met, captured before any mutation
struct Triggered {
    policy_id: PolicyId,
    holder: AccountId,
    payout: Amount,
}

#[derive(Debug, Clone)]
pub struct ClaimEvaluator {
    /// Identity holding the claim settler role in the registry and ledger
    settler: AccountId,
    claims: Vec<ClaimRecord>,
    events: Vec<ClaimEvent>,
}

impl ClaimEvaluator {
    pub fn new(settler: AccountId) -> Self {
        Self {
            settler,
            claims: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn settler(&self) -> AccountId {
        self.settler
    }

    /// Every claim settled so far
    pub fn claims(&self) -> &[ClaimRecord] {
        &self.claims
    }

    pub fn claims_for(&self, policy_id: PolicyId) -> Option<&ClaimRecord> {
        self.claims.iter().find(|c| c.policy_id == policy_id)
    }

    pub fn take_events(&mut self) -> Vec<ClaimEvent> {
        std::mem::take(&mut self.events)
    }

    /// Evaluates `observation` against every policy it could trigger
    ///
    /// # Errors
    ///
    /// - `UnauthenticatedObservation` if the gateway does not verify the proof; no
    ///   policy or ledger state is touched
    /// - `InsufficientLiquidity` if the triggered payouts exceed the pool value; no
    ///   policy is claimed
    /// - `Ledger` if the first payout fails; nothing was settled
    /// - `PartialSettlement` if a later payout fails; the claims already paid stay
    ///   paid and the rest of the batch stays Active
    pub fn evaluate(
        &mut self,
        observation: &WeatherObservation,
        gateway: &mut ObservationGateway,
        registry: &mut PolicyRegistry,
        ledger: &mut LiquidityLedger,
        transfer: &mut dyn FundsTransfer,
        now: DateTime<Utc>,
    ) -> Result<EvaluationReport, ClaimError> {
        let payload = &observation.payload;
        if !gateway.submit(payload, &observation.proof, now) {
            warn!(observation = %payload, "refusing unauthenticated observation");
            return Err(ClaimError::UnauthenticatedObservation {
                location: payload.location.clone(),
                parameter: payload.parameter,
            });
        }

        let mut report = EvaluationReport::new(payload.clone());
        let mut triggered = Vec::new();

        for policy in registry.candidates(&payload.location, payload.parameter, payload.observed_at) {
            let met = policy.trigger().is_met_by(payload.value);
            match (met, policy.is_active()) {
                (true, true) => triggered.push(Triggered {
                    policy_id: policy.id(),
                    holder: policy.holder(),
                    payout: policy.payout_amount(),
                }),
                (true, false) => report.already_resolved.push(policy.id()),
                (false, true) => report.not_triggered.push(policy.id()),
                (false, false) => {}
            }
        }

        let required = triggered
            .iter()
            .try_fold(Amount::ZERO, |sum, t| sum.checked_add(t.payout))?;
        let available = ledger.pool().total_value;
        if required > available {
            warn!(%required, %available, "triggered payouts exceed pool value");
            return Err(ClaimError::InsufficientLiquidity { required, available });
        }

        for claim in triggered {
            match self.settle(&claim, payload, registry, ledger, transfer, now) {
                Ok(Some(record)) => report.paid.push(record),
                Ok(None) => report.already_resolved.push(claim.policy_id),
                Err(e) if report.paid.is_empty() => return Err(e),
                Err(e) => {
                    warn!(
                        failed = %claim.policy_id,
                        paid = report.paid.len(),
                        error = %e,
                        "settlement stopped, keeping completed payouts"
                    );
                    return Err(ClaimError::PartialSettlement {
                        report: Box::new(report),
                        failed: claim.policy_id,
                        source: Box::new(e),
                    });
                }
            }
        }

        debug!(
            paid = report.paid.len(),
            already_resolved = report.already_resolved.len(),
            not_triggered = report.not_triggered.len(),
            "observation evaluated"
        );
        Ok(report)
    }

    /// Claims and pays one policy, or leaves it untouched
    ///
    /// Returns `None` if the policy was already resolved. A failed debit releases
    /// the claim, so the policy stays payable by a later observation.
    fn settle(
        &mut self,
        claim: &Triggered,
        payload: &ObservationPayload,
        registry: &mut PolicyRegistry,
        ledger: &mut LiquidityLedger,
        transfer: &mut dyn FundsTransfer,
        now: DateTime<Utc>,
    ) -> Result<Option<ClaimRecord>, ClaimError> {
        match registry.mark_claimed(&self.settler, claim.policy_id, now) {
            Ok(()) => {}
            Err(PolicyError::AlreadyResolved { policy_id, status }) => {
                debug!(%policy_id, %status, "policy already resolved");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        }

        if let Err(e) = ledger.debit_payout(&self.settler, &claim.holder, claim.payout, transfer, now) {
            if let Err(release) = registry.release_claim(&self.settler, claim.policy_id) {
                warn!(policy_id = %claim.policy_id, error = %release, "could not release claim");
            }
            return Err(e.into());
        }

        let record = ClaimRecord {
            claim_id: ClaimId::new_v7(),
            policy_id: claim.policy_id,
            holder: claim.holder,
            payout_amount: claim.payout,
            observed_value: payload.value,
            observed_at: payload.observed_at,
            settled_at: now,
        };
        info!(
            claim_id = %record.claim_id,
            policy_id = %record.policy_id,
            holder = %record.holder,
            payout = %record.payout_amount,
            "claim processed"
        );
        self.events.push(ClaimEvent::ClaimProcessed(record.clone()));
        self.claims.push(record.clone());
        Ok(Some(record))
    }
}
