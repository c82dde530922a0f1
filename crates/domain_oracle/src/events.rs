//! Domain events for the observation gateway

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::ConfigurationChange;
use crate::observation::ObservationPayload;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OracleEvent {
    ObservationVerified {
        payload: ObservationPayload,
        timestamp: DateTime<Utc>,
    },

    /// Proof did not verify against the configured issuer
    ObservationRejected {
        payload: ObservationPayload,
        timestamp: DateTime<Utc>,
    },

    ConfigurationChanged(ConfigurationChange),
}

impl OracleEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            OracleEvent::ObservationVerified { .. } => "ObservationVerified",
            OracleEvent::ObservationRejected { .. } => "ObservationRejected",
            OracleEvent::ConfigurationChanged(_) => "ConfigurationChanged",
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            OracleEvent::ObservationVerified { timestamp, .. }
            | OracleEvent::ObservationRejected { timestamp, .. } => *timestamp,
            OracleEvent::ConfigurationChanged(change) => change.timestamp,
        }
    }
}
