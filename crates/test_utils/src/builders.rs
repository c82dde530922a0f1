//! Test Data Builders
//!
//! Builders with sensible defaults so tests specify only the fields they care about.

use chrono::{DateTime, Duration, Utc};
use core_kernel::{
    AccountId, Amount, CoverageWindow, FixedPoint, LocationId, ParameterKind, Percent, PolicyId,
};
use domain_liquidity::LiquidityLedger;
use domain_oracle::ObservationGateway;
use domain_policy::{ComparisonOperator, PolicyRegistry, PolicyRequest, Trigger};

use crate::fixtures::{Actors, IssuerFixture, LocationFixtures, TemporalFixtures};

/// Builder for `PolicyRequest`
///
/// Defaults: temperature above 30 at KSEA, 30 days of cover starting one day after
/// `TemporalFixtures::now()`, payout 5 000, premium 1 000 (well above the default quote).
pub struct PolicyRequestBuilder {
    holder: AccountId,
    start: DateTime<Utc>,
    length: Duration,
    location: LocationId,
    parameter: ParameterKind,
    operator: ComparisonOperator,
    threshold: FixedPoint,
    premium: Amount,
    payout: Amount,
}

impl Default for PolicyRequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PolicyRequestBuilder {
    pub fn new() -> Self {
        Self {
            holder: AccountId::new(),
            start: TemporalFixtures::coverage_start(),
            length: Duration::days(30),
            location: LocationFixtures::seattle(),
            parameter: ParameterKind::Temperature,
            operator: ComparisonOperator::GreaterThan,
            threshold: FixedPoint::from_int(30).unwrap(),
            premium: Amount::new(1_000),
            payout: Amount::new(5_000),
        }
    }

    pub fn holder(mut self, holder: AccountId) -> Self {
        self.holder = holder;
        self
    }

    pub fn starting(mut self, start: DateTime<Utc>) -> Self {
        self.start = start;
        self
    }

    pub fn lasting(mut self, length: Duration) -> Self {
        self.length = length;
        self
    }

    pub fn location(mut self, location: LocationId) -> Self {
        self.location = location;
        self
    }

    pub fn parameter(mut self, parameter: ParameterKind) -> Self {
        self.parameter = parameter;
        self
    }

    /// Sets the trigger; `threshold` is in whole units
    pub fn trigger(mut self, operator: ComparisonOperator, threshold: i64) -> Self {
        self.operator = operator;
        self.threshold = FixedPoint::from_int(threshold).unwrap();
        self
    }

    pub fn premium(mut self, premium: u128) -> Self {
        self.premium = Amount::new(premium);
        self
    }

    pub fn payout(mut self, payout: u128) -> Self {
        self.payout = Amount::new(payout);
        self
    }

    pub fn build(self) -> PolicyRequest {
        PolicyRequest {
            holder: self.holder,
            window: CoverageWindow::starting_at(self.start, self.length).unwrap(),
            location: self.location,
            parameter: self.parameter,
            trigger: Trigger::new(self.operator, self.threshold),
            premium_paid: self.premium,
            payout_amount: self.payout,
        }
    }
}

/// Registry, ledger and gateway wired to one set of actors and one issuer
pub struct SettlementFixture {
    pub actors: Actors,
    pub oracle: IssuerFixture,
    pub registry: PolicyRegistry,
    pub ledger: LiquidityLedger,
    pub gateway: ObservationGateway,
}

impl SettlementFixture {
    /// Empty components, yield fraction 100%
    pub fn new() -> Self {
        let actors = Actors::new();
        let oracle = IssuerFixture::generate();
        Self {
            registry: PolicyRegistry::with_defaults(actors.access()),
            ledger: LiquidityLedger::new(actors.access(), Percent::HUNDRED),
            gateway: ObservationGateway::new(actors.access(), oracle.key()),
            actors,
            oracle,
        }
    }

    /// Seeds the pool with `amount` from a fresh provider, returning the provider
    pub fn with_liquidity(mut self, amount: u128) -> Self {
        self.ledger
            .deposit(&AccountId::new(), Amount::new(amount), TemporalFixtures::now())
            .unwrap();
        self
    }

    /// Creates a policy and credits its premium, as the engine does
    pub fn issue(&mut self, request: PolicyRequest) -> PolicyId {
        let premium = request.premium_paid;
        let id = self
            .registry
            .create_policy(&self.actors.issuer, request, TemporalFixtures::now())
            .unwrap();
        self.ledger
            .credit_premium(&self.actors.issuer, premium, TemporalFixtures::now())
            .unwrap();
        self.sync_liability();
        id
    }

    /// Pushes the registry's outstanding liability into the ledger
    pub fn sync_liability(&mut self) {
        let liability = self.registry.outstanding_liability().unwrap();
        self.ledger
            .set_liability(&self.actors.settler, liability, TemporalFixtures::now())
            .unwrap();
    }
}

impl Default for SettlementFixture {
    fn default() -> Self {
        Self::new()
    }
}
