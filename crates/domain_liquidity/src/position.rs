//! Liquidity provider positions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::Amount;

/// A provider's share balance and the pool totals seen at its last deposit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityPosition {
    pub shares: u128,
    pub deposited_at: DateTime<Utc>,
    /// Pool `total_premiums` at `deposited_at`
    pub premiums_snapshot: Amount,
    /// Pool `total_payouts` at `deposited_at`
    pub payouts_snapshot: Amount,
}

impl LiquidityPosition {
    pub fn is_empty(&self) -> bool {
        self.shares == 0
    }
}
