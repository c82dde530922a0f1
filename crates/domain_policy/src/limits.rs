//! Configured bounds for new policies

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use core_kernel::{Amount, FixedPoint, ParameterKind};
use crate::error::PolicyError;

const SECONDS_PER_DAY: u64 = 86_400;

/// Inclusive range of acceptable thresholds for one parameter kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdRange {
    pub min: FixedPoint,
    pub max: FixedPoint,
}

impl ThresholdRange {
    pub fn new(min: FixedPoint, max: FixedPoint) -> Result<Self, PolicyError> {
        if min > max {
            return Err(PolicyError::InvalidConfiguration(format!(
                "threshold range min {} exceeds max {}",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    pub fn contains(&self, value: FixedPoint) -> bool {
        value >= self.min && value <= self.max
    }

    fn whole(min: i64, max: i64) -> Self {
        Self {
            min: FixedPoint::from_raw(min * FixedPoint::SCALE),
            max: FixedPoint::from_raw(max * FixedPoint::SCALE),
        }
    }
}

/// Bounds applied to every `createPolicy` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyLimits {
    /// Shortest allowed coverage window, in seconds
    pub min_duration_secs: u64,
    /// Longest allowed coverage window, in seconds
    pub max_duration_secs: u64,
    pub min_payout: Amount,
    pub max_payout: Amount,
    /// Acceptable thresholds per parameter kind; kinds without a range are not underwritten
    pub threshold_ranges: BTreeMap<ParameterKind, ThresholdRange>,
}

impl Default for PolicyLimits {
    fn default() -> Self {
        let threshold_ranges = BTreeMap::from([
            (ParameterKind::Temperature, ThresholdRange::whole(-60, 60)),
            (ParameterKind::Rainfall, ThresholdRange::whole(0, 2_000)),
            (ParameterKind::WindSpeed, ThresholdRange::whole(0, 400)),
            (ParameterKind::Humidity, ThresholdRange::whole(0, 100)),
        ]);

        Self {
            min_duration_secs: SECONDS_PER_DAY,
            max_duration_secs: 365 * SECONDS_PER_DAY,
            min_payout: Amount::new(100),
            max_payout: Amount::new(1_000_000),
            threshold_ranges,
        }
    }
}

impl PolicyLimits {
    /// Checks the limits are internally consistent
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.min_duration_secs == 0 || self.min_duration_secs > self.max_duration_secs {
            return Err(PolicyError::InvalidConfiguration(format!(
                "duration bounds [{}, {}] are invalid",
                self.min_duration_secs, self.max_duration_secs
            )));
        }
        if self.max_duration_secs > i64::MAX as u64 {
            return Err(PolicyError::InvalidConfiguration(
                "max duration out of range".to_string(),
            ));
        }
        if self.min_payout.is_zero() || self.min_payout > self.max_payout {
            return Err(PolicyError::InvalidConfiguration(format!(
                "payout bounds [{}, {}] are invalid",
                self.min_payout, self.max_payout
            )));
        }
        for (kind, range) in &self.threshold_ranges {
            if range.min > range.max {
                return Err(PolicyError::InvalidConfiguration(format!(
                    "threshold range for {} is inverted",
                    kind
                )));
            }
        }
        Ok(())
    }

    pub fn min_duration(&self) -> Duration {
        Duration::seconds(self.min_duration_secs as i64)
    }

    pub fn max_duration(&self) -> Duration {
        Duration::seconds(self.max_duration_secs as i64)
    }

    pub fn threshold_range(&self, kind: ParameterKind) -> Option<&ThresholdRange> {
        self.threshold_ranges.get(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits_are_valid() {
        let limits = PolicyLimits::default();
        assert!(limits.validate().is_ok());
        assert_eq!(limits.min_duration(), Duration::days(1));
        assert_eq!(limits.max_duration(), Duration::days(365));
    }

    #[test]
    fn test_inverted_payout_bounds_rejected() {
        let limits = PolicyLimits {
            min_payout: Amount::new(500),
            max_payout: Amount::new(100),
            ..PolicyLimits::default()
        };
        assert!(matches!(limits.validate(), Err(PolicyError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_threshold_range_contains() {
        let range = ThresholdRange::new(FixedPoint::from_raw(0), FixedPoint::from_raw(100)).unwrap();
        assert!(range.contains(FixedPoint::from_raw(0)));
        assert!(range.contains(FixedPoint::from_raw(100)));
        assert!(!range.contains(FixedPoint::from_raw(101)));
        assert!(ThresholdRange::new(FixedPoint::from_raw(2), FixedPoint::from_raw(1)).is_err());
    }
}
