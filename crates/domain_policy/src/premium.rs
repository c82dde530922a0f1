//! Premium calculation
//!
//! The required premium is a pure function of the coverage duration, payout, parameter
//! kind, trigger, and the configured risk-rate table:
//!
//! ```text
//! required = ceil(payout × annual_rate[kind] × duration / 1 year
//!                 × operator_loading × threshold_factor)
//! required = max(required, minimum_premium)
//! ```
//!
//! `threshold_factor` ranges over `[1, 2]` and grows as the trigger becomes easier to
//! hit within the configured threshold range. Everything is computed in `Decimal`; no
//! floating point is involved, so identical inputs always price identically.

use chrono::Duration;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use core_kernel::{Amount, MoneyError, ParameterKind};
use crate::error::PolicyError;
use crate::limits::ThresholdRange;
use crate::trigger::{ComparisonOperator, Trigger};

const SECONDS_PER_YEAR: i64 = 365 * 86_400;

/// Multipliers applied per comparison operator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorLoadings {
    pub greater_than: Decimal,
    pub less_than: Decimal,
    pub equal_to: Decimal,
}

impl OperatorLoadings {
    pub fn for_operator(&self, operator: ComparisonOperator) -> Decimal {
        match operator {
            ComparisonOperator::GreaterThan => self.greater_than,
            ComparisonOperator::LessThan => self.less_than,
            ComparisonOperator::EqualTo => self.equal_to,
        }
    }
}

impl Default for OperatorLoadings {
    fn default() -> Self {
        Self {
            greater_than: dec!(1.0),
            less_than: dec!(1.0),
            // exact matches are rare on a two-decimal scale
            equal_to: dec!(0.5),
        }
    }
}

/// Configured risk rates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskRateTable {
    /// Annual rate as a fraction of the payout (0.08 = 8% of payout per year of cover)
    pub annual_rates: BTreeMap<ParameterKind, Decimal>,
    pub operator_loadings: OperatorLoadings,
    /// Floor applied after rating
    pub minimum_premium: Amount,
}

impl Default for RiskRateTable {
    fn default() -> Self {
        Self {
            annual_rates: BTreeMap::from([
                (ParameterKind::Temperature, dec!(0.08)),
                (ParameterKind::Rainfall, dec!(0.12)),
                (ParameterKind::WindSpeed, dec!(0.10)),
                (ParameterKind::Humidity, dec!(0.06)),
            ]),
            operator_loadings: OperatorLoadings::default(),
            minimum_premium: Amount::new(1),
        }
    }
}

impl RiskRateTable {
    /// Rejects negative rates and loadings
    pub fn validate(&self) -> Result<(), PolicyError> {
        let loadings = &self.operator_loadings;
        let negative_rate = self.annual_rates.values().any(|r| r.is_sign_negative());
        let negative_loading = [loadings.greater_than, loadings.less_than, loadings.equal_to]
            .iter()
            .any(|l| l.is_sign_negative());

        if negative_rate || negative_loading {
            return Err(PolicyError::InvalidConfiguration(
                "risk rates and loadings must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Inputs to the premium calculation
#[derive(Debug, Clone, Copy)]
pub struct PremiumInputs {
    pub duration: Duration,
    pub payout: Amount,
    pub parameter: ParameterKind,
    pub trigger: Trigger,
}

/// Calculates the premium required for a prospective policy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiumCalculator {
    rates: RiskRateTable,
}

impl PremiumCalculator {
    pub fn new(rates: RiskRateTable) -> Self {
        Self { rates }
    }

    pub fn rates(&self) -> &RiskRateTable {
        &self.rates
    }

    pub(crate) fn replace_rates(&mut self, rates: RiskRateTable) -> RiskRateTable {
        std::mem::replace(&mut self.rates, rates)
    }

    /// Calculates the required premium
    ///
    /// # Arguments
    ///
    /// * `inputs` - Duration, payout, parameter kind and trigger of the prospective policy
    /// * `range` - The configured threshold range for the parameter kind, if any
    ///
    /// # Errors
    ///
    /// Returns `InvalidPolicyParameters` if no rate is configured for the parameter kind
    /// and `Money` if the calculation overflows.
    pub fn required_premium(
        &self,
        inputs: &PremiumInputs,
        range: Option<&ThresholdRange>,
    ) -> Result<Amount, PolicyError> {
        let rate = self.rates.annual_rates.get(&inputs.parameter).ok_or_else(|| {
            PolicyError::invalid(format!("no risk rate configured for {}", inputs.parameter))
        })?;

        let loading = self
            .rates
            .operator_loadings
            .for_operator(inputs.trigger.operator);
        let factor = threshold_factor(&inputs.trigger, range);
        let duration_secs = Decimal::from(inputs.duration.num_seconds());

        let raw = inputs
            .payout
            .to_decimal()?
            .checked_mul(*rate)
            .and_then(|v| v.checked_mul(duration_secs))
            .and_then(|v| v.checked_div(Decimal::from(SECONDS_PER_YEAR)))
            .and_then(|v| v.checked_mul(loading))
            .and_then(|v| v.checked_mul(factor))
            .ok_or(MoneyError::Overflow)?;

        let premium = Amount::from_decimal_ceil(raw)?;
        Ok(premium.max(self.rates.minimum_premium))
    }
}

/// How easy the trigger is to hit within the configured range, mapped to `[1, 2]`
fn threshold_factor(trigger: &Trigger, range: Option<&ThresholdRange>) -> Decimal {
    let Some(range) = range else {
        return Decimal::ONE;
    };

    let min = range.min.raw() as i128;
    let max = range.max.raw() as i128;
    let threshold = (trigger.threshold.raw() as i128).clamp(min, max);
    let width = max - min;
    if width == 0 {
        return Decimal::ONE;
    }

    let distance = match trigger.operator {
        ComparisonOperator::GreaterThan => max - threshold,
        ComparisonOperator::LessThan => threshold - min,
        ComparisonOperator::EqualTo => 0,
    };

    Decimal::ONE + Decimal::from_i128_with_scale(distance, 0) / Decimal::from_i128_with_scale(width, 0)
}
