//! Claim records and evaluation reports

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AccountId, Amount, ClaimId, FixedPoint, PolicyId};
use domain_oracle::ObservationPayload;

/// An automatically settled claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRecord {
    pub claim_id: ClaimId,
    pub policy_id: PolicyId,
    pub holder: AccountId,
    pub payout_amount: Amount,
    /// Observed value that met the trigger
    pub observed_value: FixedPoint,
    pub observed_at: DateTime<Utc>,
    pub settled_at: DateTime<Utc>,
}

/// Outcome of evaluating one observation against every matching policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub observation: ObservationPayload,
    /// Policies claimed and paid by this evaluation
    pub paid: Vec<ClaimRecord>,
    /// Policies whose trigger was met but which had already left Active
    pub already_resolved: Vec<PolicyId>,
    /// Active policies whose trigger was not met
    pub not_triggered: Vec<PolicyId>,
}

impl EvaluationReport {
    pub(crate) fn new(observation: ObservationPayload) -> Self {
        Self {
            observation,
            paid: Vec::new(),
            already_resolved: Vec::new(),
            not_triggered: Vec::new(),
        }
    }

    /// Sum of payouts released
    pub fn total_paid(&self) -> Amount {
        self.paid.iter().map(|c| &c.payout_amount).sum()
    }

    pub fn is_noop(&self) -> bool {
        self.paid.is_empty()
    }
}
