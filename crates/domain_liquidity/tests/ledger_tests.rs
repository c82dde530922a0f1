//! Liquidity Ledger Tests
//!
//! # Test Organization
//!
//! - `deposit_tests` - share minting and position snapshots
//! - `withdraw_tests` - redemption, liquidity gate and transfer rollback
//! - `payout_tests` - premium credit and payout debit
//! - `yield_tests` - provider yield accounting
//! - `configuration_tests` - yield fraction and liability
//! - `conservation_properties` - proptest share conservation and proportionality

use chrono::{DateTime, Duration, TimeZone, Utc};
use core_kernel::{AccessControl, AccountId, Amount, InMemoryTransfer, Percent, Role};
use domain_liquidity::{LedgerError, LedgerEvent, LiquidityLedger};
use proptest::prelude::*;

// ============================================================================
// TEST FIXTURES
// ============================================================================

struct Actors {
    admin: AccountId,
    issuer: AccountId,
    settler: AccountId,
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

fn setup(yield_percent: u32) -> (LiquidityLedger, Actors) {
    let actors = Actors {
        admin: AccountId::new(),
        issuer: AccountId::new(),
        settler: AccountId::new(),
    };
    let access = AccessControl::new(actors.admin)
        .grant(Role::PolicyIssuer, actors.issuer)
        .grant(Role::ClaimSettler, actors.settler);
    let ledger = LiquidityLedger::new(access, Percent::new(yield_percent).unwrap());
    (ledger, actors)
}

fn seeded(amount: u128) -> (LiquidityLedger, Actors, AccountId) {
    let (mut ledger, actors) = setup(100);
    let seed = AccountId::new();
    ledger.deposit(&seed, Amount::new(amount), now()).unwrap();
    (ledger, actors, seed)
}

// ============================================================================
// DEPOSITS
// ============================================================================

mod deposit_tests {
    use super::*;

    #[test]
    fn test_first_deposit_is_one_to_one() {
        let (ledger, _, seed) = seeded(1_000);
        assert_eq!(ledger.total_shares(), 1_000);
        assert_eq!(ledger.share_balance(&seed), 1_000);
        assert_eq!(ledger.pool().total_value, Amount::new(1_000));
    }

    #[test]
    fn test_documented_deposit_then_withdraw() {
        let (mut ledger, _, _) = seeded(1_000);
        let lp = AccountId::new();
        let mut transfer = InMemoryTransfer::new();

        let minted = ledger.deposit(&lp, Amount::new(500), now()).unwrap();
        assert_eq!(minted, 500);
        assert_eq!(ledger.pool().total_value, Amount::new(1_500));
        assert_eq!(ledger.total_shares(), 1_500);

        // top the lp up so it can burn 750
        ledger.deposit(&lp, Amount::new(250), now()).unwrap();
        let withdrawn = ledger.withdraw(&lp, 750, &mut transfer, now()).unwrap();
        assert_eq!(withdrawn, Amount::new(750));
        assert_eq!(transfer.total_to(&lp), Amount::new(750));
    }

    #[test]
    fn test_deposit_after_premiums_mints_fewer_shares() {
        let (mut ledger, actors, _) = seeded(1_000);
        ledger.credit_premium(&actors.issuer, Amount::new(500), now()).unwrap();

        // 300 * 1000 / 1500
        let minted = ledger.deposit(&AccountId::new(), Amount::new(300), now()).unwrap();
        assert_eq!(minted, 200);
    }

    #[test]
    fn test_deposit_records_snapshots() {
        let (mut ledger, actors, _) = seeded(1_000);
        ledger.credit_premium(&actors.issuer, Amount::new(40), now()).unwrap();
        let lp = AccountId::new();
        let later = now() + Duration::hours(1);
        ledger.deposit(&lp, Amount::new(100), later).unwrap();

        let position = ledger.position(&lp).unwrap();
        assert_eq!(position.premiums_snapshot, Amount::new(40));
        assert_eq!(position.payouts_snapshot, Amount::ZERO);
        assert_eq!(position.deposited_at, later);
    }

    #[test]
    fn test_deposit_emits_event() {
        let (mut ledger, _) = setup(100);
        let lp = AccountId::new();
        ledger.deposit(&lp, Amount::new(10), now()).unwrap();

        match ledger.take_events().as_slice() {
            [LedgerEvent::LiquidityDeposited {
                provider,
                shares_minted,
                total_value_before,
                total_value_after,
                ..
            }] => {
                assert_eq!(provider, &lp);
                assert_eq!(*shares_minted, 10);
                assert_eq!(*total_value_before, Amount::ZERO);
                assert_eq!(*total_value_after, Amount::new(10));
            }
            other => panic!("unexpected events: {:?}", other),
        }
    }
}

// ============================================================================
// WITHDRAWALS
// ============================================================================

mod withdraw_tests {
    use super::*;

    #[test]
    fn test_insufficient_shares() {
        let (mut ledger, _, seed) = seeded(1_000);
        let mut transfer = InMemoryTransfer::new();

        let result = ledger.withdraw(&seed, 1_001, &mut transfer, now());
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientShares { requested: 1_001, held: 1_000, .. })
        ));
        assert!(transfer.records().is_empty());
    }

    #[test]
    fn test_liability_blocks_withdrawal() {
        let (mut ledger, actors, seed) = seeded(1_000);
        let mut transfer = InMemoryTransfer::new();
        ledger.set_liability(&actors.issuer, Amount::new(400), now()).unwrap();

        let result = ledger.withdraw(&seed, 700, &mut transfer, now());
        assert!(matches!(result, Err(LedgerError::InsufficientLiquidity { .. })));
        assert_eq!(ledger.share_balance(&seed), 1_000);
        assert_eq!(ledger.pool().total_value, Amount::new(1_000));

        assert_eq!(ledger.withdraw(&seed, 600, &mut transfer, now()).unwrap(), Amount::new(600));
        assert_eq!(ledger.pool().total_value, Amount::new(400));
    }

    #[test]
    fn test_failed_transfer_restores_state() {
        let (mut ledger, _, seed) = seeded(1_000);
        let mut transfer = InMemoryTransfer::new();
        transfer.fail_next();
        ledger.take_events();

        let result = ledger.withdraw(&seed, 1_000, &mut transfer, now());
        assert!(matches!(result, Err(LedgerError::Transfer(_))));
        assert_eq!(ledger.share_balance(&seed), 1_000);
        assert_eq!(ledger.total_shares(), 1_000);
        assert_eq!(ledger.pool().total_value, Amount::new(1_000));
        assert!(ledger.events().is_empty());
    }

    #[test]
    fn test_full_withdrawal_closes_position() {
        let (mut ledger, _, seed) = seeded(1_000);
        let mut transfer = InMemoryTransfer::new();

        ledger.withdraw(&seed, 1_000, &mut transfer, now()).unwrap();
        assert!(ledger.position(&seed).is_none());
        assert_eq!(ledger.total_shares(), 0);
    }

    #[test]
    fn test_zero_shares_rejected() {
        let (mut ledger, _, seed) = seeded(1_000);
        let result = ledger.withdraw(&seed, 0, &mut InMemoryTransfer::new(), now());
        assert!(matches!(result, Err(LedgerError::ZeroAmount)));
    }
}

// ============================================================================
// PREMIUMS AND PAYOUTS
// ============================================================================

mod payout_tests {
    use super::*;

    #[test]
    fn test_credit_premium_requires_issuer() {
        let (mut ledger, actors, _) = seeded(1_000);
        let result = ledger.credit_premium(&actors.settler, Amount::new(10), now());
        assert!(matches!(result, Err(LedgerError::Unauthorized(_))));
        assert_eq!(ledger.pool().total_premiums, Amount::ZERO);
    }

    #[test]
    fn test_debit_payout() {
        let (mut ledger, actors, _) = seeded(1_000);
        let holder = AccountId::new();
        let mut transfer = InMemoryTransfer::new();

        ledger
            .debit_payout(&actors.settler, &holder, Amount::new(300), &mut transfer, now())
            .unwrap();

        assert_eq!(ledger.pool().total_value, Amount::new(700));
        assert_eq!(ledger.pool().total_payouts, Amount::new(300));
        assert_eq!(transfer.total_to(&holder), Amount::new(300));
    }

    #[test]
    fn test_each_debit_is_independent() {
        let (mut ledger, actors, _) = seeded(1_000);
        let holder = AccountId::new();
        let mut transfer = InMemoryTransfer::new();

        for _ in 0..2 {
            ledger
                .debit_payout(&actors.settler, &holder, Amount::new(100), &mut transfer, now())
                .unwrap();
        }
        assert_eq!(ledger.pool().total_payouts, Amount::new(200));
        assert_eq!(transfer.records().len(), 2);
    }

    #[test]
    fn test_payout_exceeding_pool_rejected() {
        let (mut ledger, actors, _) = seeded(100);
        let mut transfer = InMemoryTransfer::new();

        let result = ledger.debit_payout(
            &actors.settler,
            &AccountId::new(),
            Amount::new(101),
            &mut transfer,
            now(),
        );
        assert!(matches!(result, Err(LedgerError::InsufficientLiquidity { .. })));
        assert_eq!(ledger.pool().total_value, Amount::new(100));
    }

    #[test]
    fn test_payout_transfer_failure_rolls_back() {
        let (mut ledger, actors, _) = seeded(1_000);
        let mut transfer = InMemoryTransfer::new();
        transfer.fail_next();

        let result = ledger.debit_payout(
            &actors.settler,
            &AccountId::new(),
            Amount::new(50),
            &mut transfer,
            now(),
        );
        assert!(matches!(result, Err(LedgerError::Transfer(_))));
        assert_eq!(ledger.pool().total_payouts, Amount::ZERO);
        assert_eq!(ledger.pool().total_value, Amount::new(1_000));
    }

    #[test]
    fn test_pool_stats() {
        let (mut ledger, actors, _) = seeded(2_000);
        ledger.credit_premium(&actors.issuer, Amount::new(500), now()).unwrap();
        ledger.set_liability(&actors.issuer, Amount::new(1_250), now()).unwrap();

        let stats = ledger.pool_stats().unwrap();
        assert_eq!(stats.total_value, Amount::new(2_500));
        assert_eq!(stats.total_liability, Amount::new(1_250));
        assert_eq!(stats.utilization_bps, 5_000);
        assert_eq!(stats.total_premiums, Amount::new(500));
        assert_eq!(stats.total_payouts, Amount::ZERO);
    }
}

// ============================================================================
// YIELD
// ============================================================================

mod yield_tests {
    use super::*;

    #[test]
    fn test_yield_counts_only_income_after_deposit() {
        let (mut ledger, actors) = setup(50);
        let early = AccountId::new();
        let late = AccountId::new();

        ledger.deposit(&early, Amount::new(1_000), now()).unwrap();
        ledger.credit_premium(&actors.issuer, Amount::new(200), now()).unwrap();
        // 1000 * 1000 / 1200 = 833
        ledger.deposit(&late, Amount::new(1_000), now()).unwrap();
        ledger.credit_premium(&actors.issuer, Amount::new(100), now()).unwrap();

        let total = ledger.total_shares();
        assert_eq!(total, 1_833);
        // net 300 * 1000 / 1833 = 163, half of which is 81
        assert_eq!(ledger.calculate_yield(&early).unwrap(), Amount::new(81));
        // net 100 * 833 / 1833 = 45, half is 22
        assert_eq!(ledger.calculate_yield(&late).unwrap(), Amount::new(22));
    }

    #[test]
    fn test_yield_clamps_losses_to_zero() {
        let (mut ledger, actors, seed) = seeded(1_000);
        let mut transfer = InMemoryTransfer::new();
        ledger.credit_premium(&actors.issuer, Amount::new(10), now()).unwrap();
        ledger
            .debit_payout(&actors.settler, &AccountId::new(), Amount::new(500), &mut transfer, now())
            .unwrap();

        assert_eq!(ledger.calculate_yield(&seed).unwrap(), Amount::ZERO);
    }

    #[test]
    fn test_yield_for_unknown_provider() {
        let (ledger, _, _) = seeded(1_000);
        assert_eq!(ledger.calculate_yield(&AccountId::new()).unwrap(), Amount::ZERO);
    }
}

// ============================================================================
// CONFIGURATION
// ============================================================================

mod configuration_tests {
    use super::*;

    #[test]
    fn test_yield_fraction_over_hundred_rejected() {
        let (mut ledger, actors) = setup(80);
        let result = ledger.set_yield_fraction(&actors.admin, 101, now());
        assert!(matches!(result, Err(LedgerError::InvalidFraction(101))));
        assert_eq!(ledger.yield_fraction().value(), 80);
    }

    #[test]
    fn test_yield_fraction_admin_only() {
        let (mut ledger, actors) = setup(80);
        let result = ledger.set_yield_fraction(&actors.issuer, 50, now());
        assert!(matches!(result, Err(LedgerError::Unauthorized(_))));
    }

    #[test]
    fn test_yield_fraction_change_audited() {
        let (mut ledger, actors) = setup(80);
        ledger.set_yield_fraction(&actors.admin, 60, now()).unwrap();

        match ledger.take_events().as_slice() {
            [LedgerEvent::ConfigurationChanged(change)] => {
                assert_eq!(change.parameter, "yield_fraction");
                assert_eq!(change.old_value, "80%");
                assert_eq!(change.new_value, "60%");
            }
            other => panic!("unexpected events: {:?}", other),
        }
    }

    #[test]
    fn test_unchanged_liability_emits_nothing() {
        let (mut ledger, actors) = setup(80);
        ledger.set_liability(&actors.settler, Amount::ZERO, now()).unwrap();
        assert!(ledger.events().is_empty());
    }
}

// ============================================================================
// PROPERTIES
// ============================================================================

mod conservation_properties {
    use super::*;

    #[derive(Debug, Clone)]
    enum Op {
        Deposit(usize, u128),
        Withdraw(usize, u128),
        Premium(u128),
        Payout(u128),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0usize..4, 1u128..100_000).prop_map(|(p, a)| Op::Deposit(p, a)),
            (0usize..4, 1u128..100_000).prop_map(|(p, s)| Op::Withdraw(p, s)),
            (0u128..10_000).prop_map(Op::Premium),
            (1u128..10_000).prop_map(Op::Payout),
        ]
    }

    proptest! {
        #[test]
        fn shares_are_conserved(ops in prop::collection::vec(op_strategy(), 1..60)) {
            let (mut ledger, actors) = setup(100);
            let providers: Vec<AccountId> = (0..4).map(|_| AccountId::new()).collect();
            let mut transfer = InMemoryTransfer::new();

            for op in ops {
                let _ = match op {
                    Op::Deposit(p, a) => ledger.deposit(&providers[p], Amount::new(a), now()).map(|_| ()),
                    Op::Withdraw(p, s) => ledger.withdraw(&providers[p], s, &mut transfer, now()).map(|_| ()),
                    Op::Premium(a) => ledger.credit_premium(&actors.issuer, Amount::new(a), now()),
                    Op::Payout(a) => ledger.debit_payout(
                        &actors.settler, &AccountId::new(), Amount::new(a), &mut transfer, now(),
                    ),
                };

                let sum: u128 = ledger.positions().map(|(_, p)| p.shares).sum();
                prop_assert_eq!(sum, ledger.total_shares());
            }
        }

        #[test]
        fn minted_shares_are_proportional(
            seed in 1u128..1_000_000,
            premium in 0u128..1_000_000,
            amount in 1u128..1_000_000,
        ) {
            let (mut ledger, actors) = setup(100);
            ledger.deposit(&AccountId::new(), Amount::new(seed), now()).unwrap();
            ledger.credit_premium(&actors.issuer, Amount::new(premium), now()).unwrap();

            let value_before = ledger.pool().total_value.units();
            let shares_before = ledger.total_shares();

            if let Ok(minted) = ledger.deposit(&AccountId::new(), Amount::new(amount), now()) {
                // floor: minted * value <= amount * shares < (minted + 1) * value
                prop_assert!(minted * value_before <= amount * shares_before);
                prop_assert!(amount * shares_before < (minted + 1) * value_before);
            }
        }

        #[test]
        fn rejected_withdrawal_leaves_balance(
            seed in 100u128..1_000_000,
            liability_pct in 1u128..100,
        ) {
            let (mut ledger, actors) = setup(100);
            let lp = AccountId::new();
            ledger.deposit(&lp, Amount::new(seed), now()).unwrap();
            let liability = seed * liability_pct / 100;
            ledger.set_liability(&actors.admin, Amount::new(liability), now()).unwrap();

            let mut transfer = InMemoryTransfer::new();
            let result = ledger.withdraw(&lp, seed, &mut transfer, now());

            if liability > 0 {
                prop_assert!(result.is_err());
                prop_assert_eq!(ledger.share_balance(&lp), seed);
            }
        }
    }
}
