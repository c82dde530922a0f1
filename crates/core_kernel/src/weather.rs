//! Weather vocabulary shared by policies and observations

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The observable weather parameter a policy is written against
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    /// Degrees Celsius
    Temperature,
    /// Millimetres of precipitation
    Rainfall,
    /// Kilometres per hour
    WindSpeed,
    /// Relative humidity percent
    Humidity,
}

impl ParameterKind {
    pub const ALL: [ParameterKind; 4] = [
        ParameterKind::Temperature,
        ParameterKind::Rainfall,
        ParameterKind::WindSpeed,
        ParameterKind::Humidity,
    ];

    /// Stable one-byte code used in canonical encodings
    pub fn code(&self) -> u8 {
        match self {
            ParameterKind::Temperature => 1,
            ParameterKind::Rainfall => 2,
            ParameterKind::WindSpeed => 3,
            ParameterKind::Humidity => 4,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ParameterKind::Temperature => "temperature",
            ParameterKind::Rainfall => "rainfall",
            ParameterKind::WindSpeed => "wind_speed",
            ParameterKind::Humidity => "humidity",
        }
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown parameter kind: {0}")]
pub struct UnknownParameterKind(String);

impl FromStr for ParameterKind {
    type Err = UnknownParameterKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParameterKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| UnknownParameterKind(s.to_string()))
    }
}

/// Opaque location identifier (station code, grid cell, geohash)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(String);

impl LocationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for LocationId {
    fn from(s: &str) -> Self {
        LocationId::new(s)
    }
}
