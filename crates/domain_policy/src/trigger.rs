//! Trigger conditions
//!
//! A trigger is the (operator, threshold) pair that decides payout eligibility from
//! an observed value. Evaluation is an integer comparison on `FixedPoint` values, so
//! the same (value, threshold, operator) triple always yields the same answer.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use core_kernel::FixedPoint;

/// Comparison applied between the observed value and the threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComparisonOperator {
    GreaterThan,
    LessThan,
    EqualTo,
}

impl ComparisonOperator {
    /// Applies the operator to `value` against `threshold`
    pub fn holds(&self, value: FixedPoint, threshold: FixedPoint) -> bool {
        let ordering = value.compare(&threshold);
        match self {
            ComparisonOperator::GreaterThan => ordering == Ordering::Greater,
            ComparisonOperator::LessThan => ordering == Ordering::Less,
            ComparisonOperator::EqualTo => ordering == Ordering::Equal,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            ComparisonOperator::GreaterThan => ">",
            ComparisonOperator::LessThan => "<",
            ComparisonOperator::EqualTo => "==",
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A contractual trigger condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    pub operator: ComparisonOperator,
    pub threshold: FixedPoint,
}

impl Trigger {
    pub fn new(operator: ComparisonOperator, threshold: FixedPoint) -> Self {
        Self { operator, threshold }
    }

    /// Returns true if `value` satisfies this trigger
    pub fn is_met_by(&self, value: FixedPoint) -> bool {
        self.operator.holds(value, self.threshold)
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "value {} {}", self.operator, self.threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fp(v: i64) -> FixedPoint {
        FixedPoint::from_int(v).unwrap()
    }

    #[test]
    fn test_greater_than_is_strict() {
        let trigger = Trigger::new(ComparisonOperator::GreaterThan, fp(30));

        assert!(trigger.is_met_by(fp(35)));
        assert!(!trigger.is_met_by(fp(25)));
        assert!(!trigger.is_met_by(fp(30)));
    }

    #[test]
    fn test_less_than_is_strict() {
        let trigger = Trigger::new(ComparisonOperator::LessThan, fp(-10));

        assert!(trigger.is_met_by(fp(-11)));
        assert!(!trigger.is_met_by(fp(-10)));
    }

    #[test]
    fn test_equal_to_uses_fixed_point_precision() {
        let trigger = Trigger::new(ComparisonOperator::EqualTo, FixedPoint::from_raw(1250));

        assert!(trigger.is_met_by(FixedPoint::from_raw(1250)));
        assert!(!trigger.is_met_by(FixedPoint::from_raw(1251)));
    }

    #[test]
    fn test_operator_serde_names() {
        let json = serde_json::to_string(&ComparisonOperator::GreaterThan).unwrap();
        assert_eq!(json, "\"GREATER_THAN\"");
    }
}
