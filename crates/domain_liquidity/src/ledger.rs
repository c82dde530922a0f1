//! Liquidity ledger
//!
//! Owns the pool totals and every provider position. Bookkeeping is always completed
//! before value leaves the pool through the `FundsTransfer` port; if the transfer
//! fails, the ledger is put back exactly as it was.
//!
//! # Invariants
//!
//! - The sum of all position shares equals `total_shares`
//! - Withdrawals never take `total_value` below `total_liability`
//! - Payouts never take `total_value` below zero

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use core_kernel::{
    mul_div_floor, AccessControl, AccountId, Amount, ConfigurationChange, FundsTransfer, MoneyError,
    Percent, Role,
};
use crate::error::LedgerError;
use crate::events::LedgerEvent;
use crate::pool::{PoolState, PoolStats};
use crate::position::LiquidityPosition;
use crate::{mint_shares, redeem_value};

/// The shared capital pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidityLedger {
    pool: PoolState,
    positions: HashMap<AccountId, LiquidityPosition>,
    yield_fraction: Percent,
    access: AccessControl,
    #[serde(skip)]
    events: Vec<LedgerEvent>,
}

impl LiquidityLedger {
    pub fn new(access: AccessControl, yield_fraction: Percent) -> Self {
        Self {
            pool: PoolState::default(),
            positions: HashMap::new(),
            yield_fraction,
            access,
            events: Vec::new(),
        }
    }

    pub fn pool(&self) -> &PoolState {
        &self.pool
    }

    pub fn total_shares(&self) -> u128 {
        self.pool.total_shares
    }

    pub fn yield_fraction(&self) -> Percent {
        self.yield_fraction
    }

    pub fn available_liquidity(&self) -> Amount {
        self.pool.available_liquidity()
    }

    pub fn position(&self, provider: &AccountId) -> Option<&LiquidityPosition> {
        self.positions.get(provider)
    }

    pub fn share_balance(&self, provider: &AccountId) -> u128 {
        self.positions.get(provider).map_or(0, |p| p.shares)
    }

    /// Iterates over providers holding shares
    pub fn positions(&self) -> impl Iterator<Item = (&AccountId, &LiquidityPosition)> {
        self.positions.iter()
    }

    pub fn pool_stats(&self) -> Result<PoolStats, LedgerError> {
        Ok(self.pool.stats()?)
    }

    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    /// Returns accumulated domain events and clears them
    pub fn take_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.events)
    }

    /// Deposits `amount` on behalf of `provider` and returns the shares minted
    ///
    /// A repeat deposit adds to the share balance and resets the yield snapshots to the
    /// current pool totals.
    ///
    /// # Errors
    ///
    /// - `ZeroAmount` if `amount` is zero
    /// - `ZeroPoolValue` if shares are outstanding against an empty pool
    /// - `DepositTooSmall` if the floor mint yields no shares
    pub fn deposit(
        &mut self,
        provider: &AccountId,
        amount: Amount,
        now: DateTime<Utc>,
    ) -> Result<u128, LedgerError> {
        if amount.is_zero() {
            return Err(LedgerError::ZeroAmount);
        }
        if self.pool.total_shares > 0 && self.pool.total_value.is_zero() {
            return Err(LedgerError::ZeroPoolValue);
        }

        let shares = mint_shares(amount, self.pool.total_value, self.pool.total_shares)?;
        if shares == 0 {
            return Err(LedgerError::DepositTooSmall(amount));
        }

        let total_value_before = self.pool.total_value;
        let total_value = total_value_before.checked_add(amount)?;
        let total_shares = self
            .pool
            .total_shares
            .checked_add(shares)
            .ok_or(MoneyError::Overflow)?;
        let held = self.share_balance(provider);
        let position = LiquidityPosition {
            shares: held + shares,
            deposited_at: now,
            premiums_snapshot: self.pool.total_premiums,
            payouts_snapshot: self.pool.total_payouts,
        };

        self.pool.total_value = total_value;
        self.pool.total_shares = total_shares;
        self.positions.insert(*provider, position);

        self.events.push(LedgerEvent::LiquidityDeposited {
            provider: *provider,
            amount,
            shares_minted: shares,
            total_value_before,
            total_value_after: total_value,
            total_shares_after: total_shares,
            timestamp: now,
        });
        info!(%provider, %amount, shares, %total_value, "liquidity deposited");

        Ok(shares)
    }

    /// Burns `shares` from `provider` and transfers their value out
    ///
    /// # Errors
    ///
    /// - `ZeroAmount` if `shares` is zero
    /// - `InsufficientShares` if the provider holds fewer shares
    /// - `InsufficientLiquidity` if the value exceeds `total_value - total_liability`
    /// - `Transfer` if the transfer port fails; the ledger is left unchanged
    pub fn withdraw(
        &mut self,
        provider: &AccountId,
        shares: u128,
        transfer: &mut dyn FundsTransfer,
        now: DateTime<Utc>,
    ) -> Result<Amount, LedgerError> {
        if shares == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        let held = self.share_balance(provider);
        if held < shares {
            return Err(LedgerError::InsufficientShares {
                provider: *provider,
                requested: shares,
                held,
            });
        }

        let amount = redeem_value(shares, self.pool.total_value, self.pool.total_shares)?;
        let available = self.pool.available_liquidity();
        if amount > available {
            warn!(%provider, %amount, %available, "withdrawal exceeds available liquidity");
            return Err(LedgerError::InsufficientLiquidity {
                requested: amount,
                available,
            });
        }

        let pool_before = self.pool;
        let position_before = self.positions.get(provider).copied();

        self.pool.total_value = pool_before.total_value.checked_sub(amount)?;
        self.pool.total_shares = pool_before.total_shares - shares;
        match self.positions.get_mut(provider) {
            Some(position) if position.shares > shares => position.shares -= shares,
            _ => {
                self.positions.remove(provider);
            }
        }

        if !amount.is_zero() {
            if let Err(e) = transfer.transfer(provider, amount) {
                warn!(%provider, %amount, error = %e, "withdrawal transfer failed, restoring");
                self.pool = pool_before;
                if let Some(position) = position_before {
                    self.positions.insert(*provider, position);
                }
                return Err(e.into());
            }
        }

        self.events.push(LedgerEvent::LiquidityWithdrawn {
            provider: *provider,
            shares_burned: shares,
            amount,
            total_value_before: pool_before.total_value,
            total_value_after: self.pool.total_value,
            total_shares_after: self.pool.total_shares,
            timestamp: now,
        });
        info!(%provider, shares, %amount, "liquidity withdrawn");

        Ok(amount)
    }

    /// Credits a premium to the pool (policy issuer only)
    pub fn credit_premium(
        &mut self,
        caller: &AccountId,
        amount: Amount,
        now: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        self.access.ensure(caller, Role::PolicyIssuer)?;

        let total_premiums = self.pool.total_premiums.checked_add(amount)?;
        let total_value = self.pool.total_value.checked_add(amount)?;
        self.pool.total_premiums = total_premiums;
        self.pool.total_value = total_value;

        self.events.push(LedgerEvent::PremiumCredited {
            amount,
            total_premiums_after: total_premiums,
            total_value_after: total_value,
            timestamp: now,
        });
        debug!(%amount, %total_value, "premium credited");
        Ok(())
    }

    /// Debits a payout and transfers it to `recipient` (claim settler only)
    ///
    /// Every call debits independently; callers gate duplicates.
    ///
    /// # Errors
    ///
    /// - `InsufficientLiquidity` if `amount` exceeds the pool value
    /// - `Transfer` if the transfer port fails; the ledger is left unchanged
    pub fn debit_payout(
        &mut self,
        caller: &AccountId,
        recipient: &AccountId,
        amount: Amount,
        transfer: &mut dyn FundsTransfer,
        now: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        self.access.ensure(caller, Role::ClaimSettler)?;
        if amount.is_zero() {
            return Err(LedgerError::ZeroAmount);
        }
        if amount > self.pool.total_value {
            return Err(LedgerError::InsufficientLiquidity {
                requested: amount,
                available: self.pool.total_value,
            });
        }

        let pool_before = self.pool;
        let total_payouts = pool_before.total_payouts.checked_add(amount)?;
        let total_value = pool_before.total_value.checked_sub(amount)?;
        self.pool.total_payouts = total_payouts;
        self.pool.total_value = total_value;

        if let Err(e) = transfer.transfer(recipient, amount) {
            warn!(%recipient, %amount, error = %e, "payout transfer failed, restoring");
            self.pool = pool_before;
            return Err(e.into());
        }

        self.events.push(LedgerEvent::PayoutDebited {
            recipient: *recipient,
            amount,
            total_value_before: pool_before.total_value,
            total_value_after: self.pool.total_value,
            timestamp: now,
        });
        info!(%recipient, %amount, total_value = %self.pool.total_value, "payout debited");
        Ok(())
    }

    /// Yield accrued to `provider` since its last deposit
    ///
    /// `net = max(0, Δpremiums - Δpayouts)`, then
    /// `floor(floor(net * shares / total_shares) * yield_fraction / 100)`.
    pub fn calculate_yield(&self, provider: &AccountId) -> Result<Amount, LedgerError> {
        let Some(position) = self.positions.get(provider) else {
            return Ok(Amount::ZERO);
        };
        if self.pool.total_shares == 0 {
            return Ok(Amount::ZERO);
        }

        let premiums = signed(self.pool.total_premiums)? - signed(position.premiums_snapshot)?;
        let payouts = signed(self.pool.total_payouts)? - signed(position.payouts_snapshot)?;
        let net = (premiums - payouts).max(0) as u128;

        let share = mul_div_floor(net, position.shares, self.pool.total_shares)?;
        Ok(self.yield_fraction.apply_floor(Amount::new(share))?)
    }

    /// Replaces the outstanding liability with a freshly recomputed total
    pub fn set_liability(
        &mut self,
        caller: &AccountId,
        total: Amount,
        now: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        self.access
            .ensure_any(caller, &[Role::Admin, Role::PolicyIssuer, Role::ClaimSettler])?;

        let before = self.pool.total_liability;
        if before == total {
            return Ok(());
        }
        self.pool.total_liability = total;
        self.events.push(LedgerEvent::LiabilityUpdated {
            before,
            after: total,
            timestamp: now,
        });
        debug!(%before, after = %total, "liability updated");
        Ok(())
    }

    /// Sets the share of net income paid out as yield (admin only)
    ///
    /// # Errors
    ///
    /// Returns `InvalidFraction` if `percent` exceeds 100.
    pub fn set_yield_fraction(
        &mut self,
        caller: &AccountId,
        percent: u32,
        now: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        self.access.ensure(caller, Role::Admin)?;
        let fraction = Percent::new(percent).map_err(|_| LedgerError::InvalidFraction(percent))?;

        let change = ConfigurationChange::new("yield_fraction", self.yield_fraction, fraction, now);
        self.yield_fraction = fraction;
        self.events.push(LedgerEvent::ConfigurationChanged(change));
        Ok(())
    }
}

fn signed(amount: Amount) -> Result<i128, MoneyError> {
    i128::try_from(amount.units()).map_err(|_| MoneyError::Overflow)
}
