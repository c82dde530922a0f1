//! Premium and Trigger Property Tests
//!
//! - `premium_properties` - determinism and monotonicity of the required premium
//! - `trigger_properties` - determinism of trigger evaluation

use chrono::Duration;
use core_kernel::{Amount, FixedPoint, ParameterKind};
use domain_policy::{
    ComparisonOperator, PolicyLimits, PremiumCalculator, PremiumInputs, Trigger,
};
use proptest::prelude::*;

fn operator_strategy() -> impl Strategy<Value = ComparisonOperator> {
    prop_oneof![
        Just(ComparisonOperator::GreaterThan),
        Just(ComparisonOperator::LessThan),
        Just(ComparisonOperator::EqualTo),
    ]
}

fn kind_strategy() -> impl Strategy<Value = ParameterKind> {
    prop::sample::select(ParameterKind::ALL.to_vec())
}

mod premium_properties {
    use super::*;

    proptest! {
        #[test]
        fn identical_inputs_price_identically(
            days in 1i64..=365,
            payout in 100u128..=1_000_000,
            kind in kind_strategy(),
            operator in operator_strategy(),
            threshold in -6_000i64..=6_000,
        ) {
            let limits = PolicyLimits::default();
            let inputs = PremiumInputs {
                duration: Duration::days(days),
                payout: Amount::new(payout),
                parameter: kind,
                trigger: Trigger::new(operator, FixedPoint::from_raw(threshold)),
            };

            let first = PremiumCalculator::default()
                .required_premium(&inputs, limits.threshold_range(kind))
                .unwrap();
            let second = PremiumCalculator::default()
                .required_premium(&inputs, limits.threshold_range(kind))
                .unwrap();

            prop_assert_eq!(first, second);
            prop_assert!(first >= Amount::new(1));
        }

        #[test]
        fn longer_cover_never_costs_less(
            days in 1i64..365,
            payout in 100u128..=1_000_000,
            kind in kind_strategy(),
        ) {
            let calc = PremiumCalculator::default();
            let trigger = Trigger::new(ComparisonOperator::LessThan, FixedPoint::from_raw(0));
            let short = PremiumInputs {
                duration: Duration::days(days),
                payout: Amount::new(payout),
                parameter: kind,
                trigger,
            };
            let long = PremiumInputs { duration: Duration::days(days + 1), ..short };

            prop_assert!(
                calc.required_premium(&long, None).unwrap()
                    >= calc.required_premium(&short, None).unwrap()
            );
        }
    }
}

mod trigger_properties {
    use super::*;

    proptest! {
        #[test]
        fn evaluation_is_deterministic(
            value in any::<i64>(),
            threshold in any::<i64>(),
            operator in operator_strategy(),
        ) {
            let trigger = Trigger::new(operator, FixedPoint::from_raw(threshold));
            let value = FixedPoint::from_raw(value);
            prop_assert_eq!(trigger.is_met_by(value), trigger.is_met_by(value));
        }
    }

    #[test]
    fn test_documented_example() {
        let trigger = Trigger::new(ComparisonOperator::GreaterThan, FixedPoint::from_int(30).unwrap());
        assert!(trigger.is_met_by(FixedPoint::from_int(35).unwrap()));
        assert!(!trigger.is_met_by(FixedPoint::from_int(25).unwrap()));
        assert!(!trigger.is_met_by(FixedPoint::from_int(30).unwrap()));
    }
}
