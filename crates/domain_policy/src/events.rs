//! Domain events for the policy registry
//!
//! Every state change in the registry appends one event. Events are used for:
//! - Audit trails
//! - Downstream indexing and display

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AccountId, Amount, ConfigurationChange, LocationId, ParameterKind, PolicyId};
use crate::policy::PolicyStatus;

/// Domain events emitted by the PolicyRegistry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyEvent {
    /// A policy was created in the Active state
    PolicyCreated {
        policy_id: PolicyId,
        holder: AccountId,
        location: LocationId,
        parameter: ParameterKind,
        premium_paid: Amount,
        payout_amount: Amount,
        coverage_start: DateTime<Utc>,
        coverage_end: DateTime<Utc>,
        timestamp: DateTime<Utc>,
    },

    /// Trigger met; the policy is now Claimed
    PolicyClaimed {
        policy_id: PolicyId,
        from: PolicyStatus,
        to: PolicyStatus,
        timestamp: DateTime<Utc>,
    },

    /// Coverage lapsed without a trigger
    PolicyExpired {
        policy_id: PolicyId,
        from: PolicyStatus,
        to: PolicyStatus,
        coverage_end: DateTime<Utc>,
        timestamp: DateTime<Utc>,
    },

    /// Cancelled by the administrator
    PolicyCancelled {
        policy_id: PolicyId,
        from: PolicyStatus,
        to: PolicyStatus,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// Limits or risk rates changed
    ConfigurationChanged(ConfigurationChange),
}

impl PolicyEvent {
    /// Returns the policy ID associated with this event, if any
    pub fn policy_id(&self) -> Option<PolicyId> {
        match self {
            PolicyEvent::PolicyCreated { policy_id, .. }
            | PolicyEvent::PolicyClaimed { policy_id, .. }
            | PolicyEvent::PolicyExpired { policy_id, .. }
            | PolicyEvent::PolicyCancelled { policy_id, .. } => Some(*policy_id),
            PolicyEvent::ConfigurationChanged(_) => None,
        }
    }

    /// Returns the timestamp of this event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            PolicyEvent::PolicyCreated { timestamp, .. }
            | PolicyEvent::PolicyClaimed { timestamp, .. }
            | PolicyEvent::PolicyExpired { timestamp, .. }
            | PolicyEvent::PolicyCancelled { timestamp, .. } => *timestamp,
            PolicyEvent::ConfigurationChanged(change) => change.timestamp,
        }
    }

    /// Returns the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            PolicyEvent::PolicyCreated { .. } => "PolicyCreated",
            PolicyEvent::PolicyClaimed { .. } => "PolicyClaimed",
            PolicyEvent::PolicyExpired { .. } => "PolicyExpired",
            PolicyEvent::PolicyCancelled { .. } => "PolicyCancelled",
            PolicyEvent::ConfigurationChanged(_) => "ConfigurationChanged",
        }
    }
}
