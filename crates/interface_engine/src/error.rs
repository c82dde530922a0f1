//! Engine error types

use thiserror::Error;

use core_kernel::{AccessError, MoneyError};
use domain_claims::ClaimError;
use domain_liquidity::LedgerError;
use domain_oracle::OracleError;
use domain_policy::PolicyError;

/// Errors surfaced by `SettlementEngine`
///
/// Operation errors are returned after the engine has restored its pre-operation
/// state. Two exceptions: the gateway still counts a refused observation, and a
/// `PartialSettlement` keeps the claims it reports as paid.
#[derive(Debug, Error)]
pub enum EngineError {
    /// New business intake is paused; claims still settle
    #[error("System is paused")]
    SystemPaused,

    #[error(transparent)]
    Unauthorized(#[from] AccessError),

    #[error("Policy error: {0}")]
    Policy(#[from] PolicyError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Oracle error: {0}")]
    Oracle(#[from] OracleError),

    #[error("Claim error: {0}")]
    Claim(#[from] ClaimError),

    /// Rejected at startup; the engine was not built
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Arithmetic error: {0}")]
    Money(#[from] MoneyError),
}

impl EngineError {
    /// Returns true for failures caused by the caller's identity
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            EngineError::Unauthorized(_)
                | EngineError::Policy(PolicyError::Unauthorized(_))
                | EngineError::Ledger(LedgerError::Unauthorized(_))
                | EngineError::Oracle(OracleError::Unauthorized(_))
        )
    }

    /// Returns true if retrying the same request could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            EngineError::Ledger(LedgerError::Transfer(e)) => e.is_transient(),
            EngineError::Claim(claim) => match claim.root() {
                ClaimError::Ledger(LedgerError::Transfer(e)) => e.is_transient(),
                _ => false,
            },
            _ => false,
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
