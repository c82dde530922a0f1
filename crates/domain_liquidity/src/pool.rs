//! Pool-wide accounting state

use serde::{Deserialize, Serialize};

use core_kernel::{mul_div_floor, Amount, MoneyError};

/// Utilisation is reported in basis points
pub const BASIS_POINTS: u128 = 10_000;

/// Totals held by the pool
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolState {
    /// Currency units currently held
    pub total_value: Amount,
    /// Total share supply
    pub total_shares: u128,
    /// Cumulative premiums collected
    pub total_premiums: Amount,
    /// Cumulative payouts made
    pub total_payouts: Amount,
    /// Sum of payout amounts over Active policies
    pub total_liability: Amount,
}

impl PoolState {
    /// `total_value - total_liability`, zero if liability exceeds value
    pub fn available_liquidity(&self) -> Amount {
        self.total_value.saturating_sub(self.total_liability)
    }

    /// Liability as basis points of value; zero for an empty pool
    pub fn utilization_bps(&self) -> Result<u128, MoneyError> {
        if self.total_value.is_zero() {
            return Ok(0);
        }
        mul_div_floor(
            self.total_liability.units(),
            BASIS_POINTS,
            self.total_value.units(),
        )
    }

    pub fn stats(&self) -> Result<PoolStats, MoneyError> {
        Ok(PoolStats {
            total_value: self.total_value,
            total_liability: self.total_liability,
            utilization_bps: self.utilization_bps()?,
            total_premiums: self.total_premiums,
            total_payouts: self.total_payouts,
        })
    }
}

/// Read-only snapshot returned by `pool_stats`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    pub total_value: Amount,
    pub total_liability: Amount,
    pub utilization_bps: u128,
    pub total_premiums: Amount,
    pub total_payouts: Amount,
}
