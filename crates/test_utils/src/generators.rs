//! Property-Based Test Generators
//!
//! Proptest strategies that respect the default policy limits.

use core_kernel::{Amount, FixedPoint, ParameterKind};
use domain_policy::ComparisonOperator;
use proptest::prelude::*;

pub fn operator_strategy() -> impl Strategy<Value = ComparisonOperator> {
    prop_oneof![
        Just(ComparisonOperator::GreaterThan),
        Just(ComparisonOperator::LessThan),
        Just(ComparisonOperator::EqualTo),
    ]
}

pub fn parameter_kind_strategy() -> impl Strategy<Value = ParameterKind> {
    prop::sample::select(ParameterKind::ALL.to_vec())
}

/// Observed values between -100.00 and 100.00
pub fn observed_value_strategy() -> impl Strategy<Value = FixedPoint> {
    (-10_000i64..=10_000).prop_map(FixedPoint::from_raw)
}

/// Whole-unit temperature thresholds inside the default range
pub fn temperature_threshold_strategy() -> impl Strategy<Value = i64> {
    -60i64..=60
}

/// Payouts inside the default payout bounds
pub fn payout_strategy() -> impl Strategy<Value = u128> {
    100u128..=1_000_000
}

pub fn positive_amount_strategy() -> impl Strategy<Value = Amount> {
    (1u128..10_000_000).prop_map(Amount::new)
}
