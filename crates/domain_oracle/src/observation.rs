//! Weather observations and their canonical encoding
//!
//! The issuer signs the canonical bytes of an observation payload:
//!
//! ```text
//! b"wx-obs/v1"
//! location length (u32 BE) || location UTF-8
//! parameter kind code (u8)
//! value (i64 BE, two implied decimals)
//! observed_at (i64 BE unix seconds || u32 BE subsecond nanoseconds)
//! ```
//!
//! Every field is length-prefixed or fixed-width, so distinct payloads never share an
//! encoding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{FixedPoint, LocationId, ParameterKind};
use crate::error::OracleError;

/// Domain separation tag prefixed to every signed payload
pub const CANONICAL_TAG: &[u8] = b"wx-obs/v1";

/// The signed content of an observation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationPayload {
    pub location: LocationId,
    pub parameter: ParameterKind,
    pub value: FixedPoint,
    pub observed_at: DateTime<Utc>,
}

impl ObservationPayload {
    pub fn new(
        location: impl Into<LocationId>,
        parameter: ParameterKind,
        value: FixedPoint,
        observed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            location: location.into(),
            parameter,
            value,
            observed_at,
        }
    }

    /// Bytes the issuer signs
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let location = self.location.as_str().as_bytes();
        let mut bytes = Vec::with_capacity(CANONICAL_TAG.len() + 4 + location.len() + 1 + 8 + 8 + 4);

        bytes.extend_from_slice(CANONICAL_TAG);
        bytes.extend_from_slice(&(location.len() as u32).to_be_bytes());
        bytes.extend_from_slice(location);
        bytes.push(self.parameter.code());
        bytes.extend_from_slice(&self.value.to_be_bytes());
        bytes.extend_from_slice(&self.observed_at.timestamp().to_be_bytes());
        bytes.extend_from_slice(&self.observed_at.timestamp_subsec_nanos().to_be_bytes());
        bytes
    }
}

impl fmt::Display for ObservationPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}={} at {}",
            self.location, self.parameter, self.value, self.observed_at
        )
    }
}

/// Ed25519 signature over `canonical_bytes`, hex encoded on the wire
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationProof(#[serde(with = "hex_array")] [u8; 64]);

impl ObservationProof {
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for ObservationProof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObservationProof({})", self.to_hex())
    }
}

impl FromStr for ObservationProof {
    type Err = OracleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_hex::<64>(s)
            .map(Self)
            .map_err(OracleError::InvalidProof)
    }
}

/// A payload together with its proof
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub payload: ObservationPayload,
    pub proof: ObservationProof,
}

impl WeatherObservation {
    pub fn new(payload: ObservationPayload, proof: ObservationProof) -> Self {
        Self { payload, proof }
    }
}

pub(crate) fn decode_hex<const N: usize>(s: &str) -> Result<[u8; N], String> {
    let bytes = hex::decode(s.trim()).map_err(|e| e.to_string())?;
    <[u8; N]>::try_from(bytes.as_slice())
        .map_err(|_| format!("expected {} bytes, got {}", N, bytes.len()))
}

/// Serde adapter for fixed-size byte arrays as hex strings
pub(crate) mod hex_array {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S, const N: usize>(bytes: &[u8; N], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D, const N: usize>(deserializer: D) -> Result<[u8; N], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::decode_hex::<N>(&s).map_err(de::Error::custom)
    }
}
