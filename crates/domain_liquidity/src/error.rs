//! Liquidity domain errors

use thiserror::Error;

use core_kernel::{AccessError, AccountId, Amount, MoneyError, PortError};

/// Errors that can occur in the liquidity ledger
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Amount must be greater than zero")]
    ZeroAmount,

    /// Shares are outstanding but the pool holds nothing; minting would divide by zero
    #[error("Pool value is zero while shares are outstanding")]
    ZeroPoolValue,

    #[error("Deposit of {0} is too small to mint a share")]
    DepositTooSmall(Amount),

    #[error("Insufficient shares for {provider}: requested {requested}, held {held}")]
    InsufficientShares {
        provider: AccountId,
        requested: u128,
        held: u128,
    },

    #[error("Insufficient liquidity: requested {requested}, available {available}")]
    InsufficientLiquidity {
        requested: Amount,
        available: Amount,
    },

    #[error("Yield fraction {0}% exceeds 100%")]
    InvalidFraction(u32),

    #[error(transparent)]
    Unauthorized(#[from] AccessError),

    #[error("Arithmetic error: {0}")]
    Money(#[from] MoneyError),

    #[error("Transfer failed: {0}")]
    Transfer(#[from] PortError),
}

impl LedgerError {
    /// Returns true for state-conflict rejections the caller may retry later
    pub fn is_liquidity_conflict(&self) -> bool {
        matches!(
            self,
            LedgerError::InsufficientLiquidity { .. } | LedgerError::InsufficientShares { .. }
        )
    }
}
