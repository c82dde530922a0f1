//! Tests for core_kernel amount and fixed-point types

use core_kernel::money::{mul_div_floor, Amount, FixedPoint, MoneyError, Percent};
use rust_decimal_macros::dec;

// ============================================================================
// Amount Tests
// ============================================================================

mod amount_tests {
    use super::*;

    #[test]
    fn test_amount_zero() {
        assert!(Amount::ZERO.is_zero());
        assert_eq!(Amount::default(), Amount::ZERO);
    }

    #[test]
    fn test_amount_ordering() {
        assert!(Amount::new(1) < Amount::new(2));
        assert_eq!(Amount::new(7).max(Amount::new(3)), Amount::new(7));
    }

    #[test]
    fn test_amount_sum() {
        let amounts = vec![Amount::new(10), Amount::new(20), Amount::new(30)];
        let total: Amount = amounts.iter().sum();
        assert_eq!(total, Amount::new(60));
    }

    #[test]
    fn test_amount_serializes_as_number() {
        let json = serde_json::to_string(&Amount::new(1500)).unwrap();
        assert_eq!(json, "1500");
    }

    #[test]
    fn test_amount_to_decimal() {
        assert_eq!(Amount::new(250).to_decimal().unwrap(), dec!(250));
    }
}

// ============================================================================
// Share Arithmetic Tests
// ============================================================================

mod mul_div_tests {
    use super::*;

    #[test]
    fn test_proportional_mint_example() {
        // deposit 500 into a pool with 1000 value and 1000 shares
        assert_eq!(mul_div_floor(500, 1000, 1000).unwrap(), 500);
    }

    #[test]
    fn test_proportional_redeem_example() {
        // burn 750 shares of 1500 against a 1500 pool
        assert_eq!(mul_div_floor(750, 1500, 1500).unwrap(), 750);
    }

    #[test]
    fn test_floor_rounding() {
        assert_eq!(mul_div_floor(100, 2, 3).unwrap(), 66);
    }

    #[test]
    fn test_overflow_detected() {
        assert_eq!(mul_div_floor(u128::MAX, 2, 1), Err(MoneyError::Overflow));
    }
}

// ============================================================================
// FixedPoint Tests
// ============================================================================

mod fixed_point_tests {
    use super::*;

    #[test]
    fn test_from_int() {
        assert_eq!(FixedPoint::from_int(30).unwrap().raw(), 3000);
        assert_eq!(FixedPoint::from_int(i64::MAX), Err(MoneyError::Overflow));
    }

    #[test]
    fn test_display() {
        assert_eq!(FixedPoint::from_raw(3050).to_string(), "30.50");
        assert_eq!(FixedPoint::from_raw(-5).to_string(), "-0.05");
    }

    #[test]
    fn test_canonical_bytes_are_big_endian() {
        let bytes = FixedPoint::from_raw(1).to_be_bytes();
        assert_eq!(bytes, [0, 0, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn test_equal_values_compare_equal() {
        let a = FixedPoint::from_decimal(dec!(30)).unwrap();
        let b = FixedPoint::from_decimal(dec!(30.00)).unwrap();
        assert_eq!(a, b);
    }
}

// ============================================================================
// Percent Tests
// ============================================================================

mod percent_tests {
    use super::*;

    #[test]
    fn test_percent_deserialize_rejects_out_of_range() {
        let ok: Percent = serde_json::from_str("80").unwrap();
        assert_eq!(ok.value(), 80);

        let err = serde_json::from_str::<Percent>("101");
        assert!(err.is_err());
    }

    #[test]
    fn test_percent_display() {
        assert_eq!(Percent::new(25).unwrap().to_string(), "25%");
    }
}
