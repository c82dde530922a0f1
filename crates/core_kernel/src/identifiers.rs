//! Strongly-typed identifiers for domain entities
//!
//! Participants (holders, liquidity providers, administrators, internal system
//! roles) are identified by UUID-backed `AccountId`s. Policies use a monotonically
//! increasing sequence number allocated by the registry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// UUID-backed identifier rendered as `<TAG>-<uuid>`
macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident, $tag:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Random (v4) identifier
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Time-ordered (v7) identifier, sortable by creation
            pub fn new_v7() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($tag, "-{}"), self.0)
            }
        }

        /// Accepts the bare UUID or the tagged display form
        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = s.strip_prefix(concat!($tag, "-")).unwrap_or(s);
                Uuid::parse_str(raw).map(Self)
            }
        }
    };
}

uuid_identifier!(
    /// A participant: holder, liquidity provider, administrator or internal role
    AccountId,
    "ACC"
);

uuid_identifier!(
    /// A settled claim
    ClaimId,
    "CLM"
);

/// Error parsing a sequence identifier
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid policy id: {0}")]
pub struct ParseSequenceIdError(String);

/// Policy identifier allocated in strictly increasing order by the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyId(u64);

impl PolicyId {
    /// The first id handed out by a fresh registry
    pub const FIRST: PolicyId = PolicyId(1);

    pub const fn new(sequence: u64) -> Self {
        Self(sequence)
    }

    pub const fn sequence(&self) -> u64 {
        self.0
    }

    /// Returns the id that follows this one, or None on exhaustion
    pub fn next(&self) -> Option<PolicyId> {
        self.0.checked_add(1).map(PolicyId)
    }
}

impl fmt::Display for PolicyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "POL-{}", self.0)
    }
}

impl FromStr for PolicyId {
    type Err = ParseSequenceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("POL-").unwrap_or(s);
        digits
            .parse::<u64>()
            .map(PolicyId)
            .map_err(|_| ParseSequenceIdError(s.to_string()))
    }
}
