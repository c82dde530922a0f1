//! Domain events for the liquidity ledger

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AccountId, Amount, ConfigurationChange};

/// Domain events emitted by the LiquidityLedger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    LiquidityDeposited {
        provider: AccountId,
        amount: Amount,
        shares_minted: u128,
        total_value_before: Amount,
        total_value_after: Amount,
        total_shares_after: u128,
        timestamp: DateTime<Utc>,
    },

    LiquidityWithdrawn {
        provider: AccountId,
        shares_burned: u128,
        amount: Amount,
        total_value_before: Amount,
        total_value_after: Amount,
        total_shares_after: u128,
        timestamp: DateTime<Utc>,
    },

    PremiumCredited {
        amount: Amount,
        total_premiums_after: Amount,
        total_value_after: Amount,
        timestamp: DateTime<Utc>,
    },

    PayoutDebited {
        recipient: AccountId,
        amount: Amount,
        total_value_before: Amount,
        total_value_after: Amount,
        timestamp: DateTime<Utc>,
    },

    /// Outstanding liability recomputed from the registry
    LiabilityUpdated {
        before: Amount,
        after: Amount,
        timestamp: DateTime<Utc>,
    },

    ConfigurationChanged(ConfigurationChange),
}

impl LedgerEvent {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            LedgerEvent::LiquidityDeposited { timestamp, .. }
            | LedgerEvent::LiquidityWithdrawn { timestamp, .. }
            | LedgerEvent::PremiumCredited { timestamp, .. }
            | LedgerEvent::PayoutDebited { timestamp, .. }
            | LedgerEvent::LiabilityUpdated { timestamp, .. } => *timestamp,
            LedgerEvent::ConfigurationChanged(change) => change.timestamp,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            LedgerEvent::LiquidityDeposited { .. } => "LiquidityDeposited",
            LedgerEvent::LiquidityWithdrawn { .. } => "LiquidityWithdrawn",
            LedgerEvent::PremiumCredited { .. } => "PremiumCredited",
            LedgerEvent::PayoutDebited { .. } => "PayoutDebited",
            LedgerEvent::LiabilityUpdated { .. } => "LiabilityUpdated",
            LedgerEvent::ConfigurationChanged(_) => "ConfigurationChanged",
        }
    }
}
