//! Capability ports supplied by the hosting environment
//!
//! The settlement core never moves funds or reads the wall clock directly. It is
//! handed these capabilities and calls them at well-defined points:
//!
//! ```text
//! ┌───────────────────────────┐      ┌──────────────────────────┐
//! │   Settlement components   │ ───▶ │  FundsTransfer (port)    │ ──▶ custody / payment rail
//! │ (registry, ledger, ...)   │      └──────────────────────────┘
//! │                           │      ┌──────────────────────────┐
//! │                           │ ───▶ │  Clock (port)            │ ──▶ system or fixed time
//! └───────────────────────────┘      └──────────────────────────┘
//! ```
//!
//! Transfers are always invoked after the caller's own bookkeeping is complete.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::fmt;
use thiserror::Error;

use crate::identifiers::AccountId;
use crate::money::Amount;

/// Error type for port operations
#[derive(Debug, Error)]
pub enum PortError {
    /// The counterparty rejected the operation
    #[error("Rejected: {message}")]
    Rejected { message: String },

    /// Connection to the underlying system failed
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The operation timed out
    #[error("Timeout after {duration_ms}ms: {operation}")]
    Timeout { operation: String, duration_ms: u64 },

    /// An internal error occurred
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl PortError {
    /// Creates a Rejected error
    pub fn rejected(message: impl Into<String>) -> Self {
        PortError::Rejected {
            message: message.into(),
        }
    }

    /// Creates a Connection error
    pub fn connection(message: impl Into<String>) -> Self {
        PortError::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true if this error indicates a transient failure that may succeed on retry
    pub fn is_transient(&self) -> bool {
        matches!(self, PortError::Connection { .. } | PortError::Timeout { .. })
    }
}

/// Moves value out of the pool to a recipient
pub trait FundsTransfer: Send {
    fn transfer(&mut self, recipient: &AccountId, amount: Amount) -> Result<(), PortError>;
}

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// A completed transfer as seen by `InMemoryTransfer`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferRecord {
    pub recipient: AccountId,
    pub amount: Amount,
}

/// Transfer adapter that records transfers in memory
///
/// Used by tests and by the replay binary. It can be told to reject a single
/// upcoming transfer to exercise rollback paths.
#[derive(Debug, Default)]
pub struct InMemoryTransfer {
    records: Vec<TransferRecord>,
    /// Successful transfers remaining before one is refused
    refuse_in: Option<usize>,
}

impl InMemoryTransfer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next transfer fail with `PortError::Rejected`
    pub fn fail_next(&mut self) {
        self.fail_after(0);
    }

    /// Lets `successes` transfers through, then refuses the one after
    pub fn fail_after(&mut self, successes: usize) {
        self.refuse_in = Some(successes);
    }

    pub fn records(&self) -> &[TransferRecord] {
        &self.records
    }

    /// Total transferred to `recipient`
    pub fn total_to(&self, recipient: &AccountId) -> Amount {
        self.records
            .iter()
            .filter(|r| &r.recipient == recipient)
            .map(|r| &r.amount)
            .sum()
    }
}

impl FundsTransfer for InMemoryTransfer {
    fn transfer(&mut self, recipient: &AccountId, amount: Amount) -> Result<(), PortError> {
        match self.refuse_in {
            Some(0) => {
                self.refuse_in = None;
                return Err(PortError::rejected(format!(
                    "transfer of {} to {} refused",
                    amount, recipient
                )));
            }
            Some(n) => self.refuse_in = Some(n - 1),
            None => {}
        }
        self.records.push(TransferRecord {
            recipient: *recipient,
            amount,
        });
        Ok(())
    }
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A manually advanced clock
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now = *now + by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

impl fmt::Debug for FixedClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedClock").field("now", &self.now()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_transfer_records() {
        let mut transfers = InMemoryTransfer::new();
        let alice = AccountId::new();

        transfers.transfer(&alice, Amount::new(10)).unwrap();
        transfers.transfer(&alice, Amount::new(5)).unwrap();

        assert_eq!(transfers.records().len(), 2);
        assert_eq!(transfers.total_to(&alice), Amount::new(15));
    }

    #[test]
    fn test_in_memory_transfer_fail_next() {
        let mut transfers = InMemoryTransfer::new();
        let bob = AccountId::new();

        transfers.fail_next();
        assert!(transfers.transfer(&bob, Amount::new(1)).is_err());
        assert!(transfers.transfer(&bob, Amount::new(1)).is_ok());
        assert_eq!(transfers.records().len(), 1);
    }

    #[test]
    fn test_in_memory_transfer_fail_after() {
        let mut transfers = InMemoryTransfer::new();
        let carol = AccountId::new();

        transfers.fail_after(1);
        assert!(transfers.transfer(&carol, Amount::new(1)).is_ok());
        assert!(transfers.transfer(&carol, Amount::new(2)).is_err());
        assert!(transfers.transfer(&carol, Amount::new(3)).is_ok());
        assert_eq!(transfers.total_to(&carol), Amount::new(4));
    }

    #[test]
    fn test_fixed_clock_advance() {
        let start = Utc::now();
        let clock = FixedClock::new(start);
        clock.advance(Duration::hours(2));
        assert_eq!(clock.now(), start + Duration::hours(2));
    }

    #[test]
    fn test_port_error_transient() {
        assert!(PortError::connection("down").is_transient());
        assert!(!PortError::rejected("no").is_transient());
    }
}
