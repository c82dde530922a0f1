//! Claims domain errors

use thiserror::Error;

use core_kernel::{Amount, LocationId, MoneyError, ParameterKind, PolicyId};
use domain_liquidity::LedgerError;
use domain_policy::PolicyError;

use crate::claim::EvaluationReport;

/// Errors that can occur while evaluating an observation
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("Observation for {parameter} at {location} failed authentication")]
    UnauthenticatedObservation {
        location: LocationId,
        parameter: ParameterKind,
    },

    /// Triggered payouts exceed the pool; nothing was settled
    #[error("Insufficient liquidity: triggered payouts {required} exceed pool value {available}")]
    InsufficientLiquidity { required: Amount, available: Amount },

    /// Settlement stopped at `failed`; every claim in `report.paid` was paid and kept
    #[error("Settlement stopped at policy {failed} after {} payouts: {source}", .report.paid.len())]
    PartialSettlement {
        report: Box<EvaluationReport>,
        failed: PolicyId,
        #[source]
        source: Box<ClaimError>,
    },

    #[error("Policy error: {0}")]
    Policy(#[from] PolicyError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Arithmetic error: {0}")]
    Money(#[from] MoneyError),
}

impl ClaimError {
    /// The error that stopped settlement, looking through `PartialSettlement`
    pub fn root(&self) -> &ClaimError {
        match self {
            ClaimError::PartialSettlement { source, .. } => source.root(),
            other => other,
        }
    }

    /// Claims paid before the failure
    pub fn settled(&self) -> Option<&EvaluationReport> {
        match self {
            ClaimError::PartialSettlement { report, .. } => Some(report),
            _ => None,
        }
    }
}
