//! Liquidity Pool Domain
//!
//! This crate implements the shared capital pool that backs every policy payout.
//!
//! # Key Concepts
//!
//! - **Share**: a unit of proportional ownership of the pool, not a fixed amount
//! - **Liability**: payout amounts of all Active policies, reserved against withdrawal
//! - **Yield**: a provider's portion of net underwriting income earned while invested
//!
//! # Share Arithmetic
//!
//! Both directions multiply before dividing and floor the result. Floor rounding
//! always favours the pool, so dust stays with the remaining providers:
//! - Deposit 500 into a pool of value 1000 with 1000 shares: 500 shares
//! - Redeem 750 of 1500 shares from a pool of value 1500: 750 units

pub mod error;
pub mod events;
pub mod ledger;
pub mod pool;
pub mod position;

pub use error::LedgerError;
pub use events::LedgerEvent;
pub use ledger::LiquidityLedger;
pub use pool::{PoolState, PoolStats, BASIS_POINTS};
pub use position::LiquidityPosition;

use core_kernel::{mul_div_floor, Amount, MoneyError};

/// Shares minted for a deposit of `amount`
///
/// An empty share supply bootstraps 1:1. Otherwise
/// `shares = amount * total_shares / total_value`, floored.
///
/// # Example
///
/// ```rust
/// use core_kernel::Amount;
/// use domain_liquidity::mint_shares;
///
/// let shares = mint_shares(Amount::new(500), Amount::new(1_000), 1_000).unwrap();
/// assert_eq!(shares, 500);
/// ```
pub fn mint_shares(amount: Amount, total_value: Amount, total_shares: u128) -> Result<u128, MoneyError> {
    if total_shares == 0 {
        return Ok(amount.units());
    }
    mul_div_floor(amount.units(), total_shares, total_value.units())
}

/// Value returned for burning `shares`: `shares * total_value / total_shares`, floored
pub fn redeem_value(shares: u128, total_value: Amount, total_shares: u128) -> Result<Amount, MoneyError> {
    mul_div_floor(shares, total_value.units(), total_shares).map(Amount::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mint_bootstraps_one_to_one() {
        assert_eq!(mint_shares(Amount::new(700), Amount::ZERO, 0).unwrap(), 700);
    }

    #[test]
    fn test_mint_floors() {
        // 100 * 1000 / 1500 = 66.67
        assert_eq!(mint_shares(Amount::new(100), Amount::new(1_500), 1_000).unwrap(), 66);
    }

    #[test]
    fn test_redeem_value() {
        assert_eq!(redeem_value(750, Amount::new(1_500), 1_500).unwrap(), Amount::new(750));
        assert!(matches!(redeem_value(1, Amount::new(1), 0), Err(MoneyError::DivisionByZero)));
    }
}
