//! Test Fixtures
//!
//! Pre-built identities, instants, and signed observations.

use chrono::{DateTime, Duration, TimeZone, Utc};
use core_kernel::{AccessControl, AccountId, FixedPoint, LocationId, ParameterKind, Role};
use domain_oracle::{IssuerKey, ObservationPayload, ObservationProof, WeatherObservation};
use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;

/// Fixed instants used across the suite
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// The "current time" for most tests
    pub fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap()
    }

    /// One day after `now`; default coverage start
    pub fn coverage_start() -> DateTime<Utc> {
        Self::now() + Duration::days(1)
    }

    /// Inside the default 30-day coverage window
    pub fn mid_coverage() -> DateTime<Utc> {
        Self::coverage_start() + Duration::days(10)
    }

    /// After the default coverage window has lapsed
    pub fn after_coverage() -> DateTime<Utc> {
        Self::coverage_start() + Duration::days(31)
    }
}

/// Common locations
pub struct LocationFixtures;

impl LocationFixtures {
    pub fn seattle() -> LocationId {
        LocationId::new("KSEA")
    }

    pub fn portland() -> LocationId {
        LocationId::new("KPDX")
    }
}

/// The three privileged identities
#[derive(Debug, Clone, Copy)]
pub struct Actors {
    pub admin: AccountId,
    pub issuer: AccountId,
    pub settler: AccountId,
}

impl Actors {
    pub fn new() -> Self {
        Self {
            admin: AccountId::new(),
            issuer: AccountId::new(),
            settler: AccountId::new(),
        }
    }

    /// Access control granting each actor its role
    pub fn access(&self) -> AccessControl {
        AccessControl::new(self.admin)
            .grant(Role::PolicyIssuer, self.issuer)
            .grant(Role::ClaimSettler, self.settler)
    }
}

impl Default for Actors {
    fn default() -> Self {
        Self::new()
    }
}

/// A trusted observation issuer with a freshly generated Ed25519 key
pub struct IssuerFixture {
    signing_key: SigningKey,
}

impl IssuerFixture {
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    pub fn key(&self) -> IssuerKey {
        IssuerKey::from_verifying_key(&self.signing_key.verifying_key())
    }

    pub fn key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    pub fn sign(&self, payload: &ObservationPayload) -> ObservationProof {
        ObservationProof::from_bytes(self.signing_key.sign(&payload.canonical_bytes()).to_bytes())
    }

    /// A signed observation; `value` is in whole units
    pub fn observe(
        &self,
        location: LocationId,
        parameter: ParameterKind,
        value: i64,
        at: DateTime<Utc>,
    ) -> WeatherObservation {
        let payload = ObservationPayload::new(location, parameter, FixedPoint::from_int(value).unwrap(), at);
        let proof = self.sign(&payload);
        WeatherObservation::new(payload, proof)
    }

    /// Same as `observe` but signed by an unrelated key
    pub fn forge(
        location: LocationId,
        parameter: ParameterKind,
        value: i64,
        at: DateTime<Utc>,
    ) -> WeatherObservation {
        IssuerFixture::generate().observe(location, parameter, value, at)
    }
}
