//! Custom Test Assertions
//!
//! Invariant checks with messages that name the offending values.

use core_kernel::PolicyId;
use domain_liquidity::LiquidityLedger;
use domain_policy::{PolicyRegistry, PolicyStatus};

/// Asserts that the sum of position shares equals the total share supply
pub fn assert_shares_conserved(ledger: &LiquidityLedger) {
    let sum: u128 = ledger.positions().map(|(_, p)| p.shares).sum();
    assert_eq!(
        sum,
        ledger.total_shares(),
        "Share conservation violated: positions sum to {}, supply is {}",
        sum,
        ledger.total_shares()
    );
}

/// Asserts that the ledger's liability matches the registry's Active payouts
pub fn assert_liability_synced(registry: &PolicyRegistry, ledger: &LiquidityLedger) {
    let expected = registry.outstanding_liability().unwrap();
    assert_eq!(
        ledger.pool().total_liability,
        expected,
        "Ledger liability {} does not match registry liability {}",
        ledger.pool().total_liability,
        expected
    );
}

/// Asserts the stored status of a policy
pub fn assert_status(registry: &PolicyRegistry, id: PolicyId, expected: PolicyStatus) {
    let actual = registry
        .get_policy(id)
        .unwrap_or_else(|e| panic!("Policy {} missing: {}", id, e))
        .status();
    assert_eq!(actual, expected, "Policy {} is {}, expected {}", id, actual, expected);
}
