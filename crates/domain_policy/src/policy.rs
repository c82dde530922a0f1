//! Policy record
//!
//! A policy is the contract between a holder and the pool: coverage for one weather
//! parameter at one location over a coverage window, paying a fixed amount if the
//! trigger condition is met by an authenticated observation.
//!
//! # Invariants
//!
//! - The only legal transitions are Active -> Claimed, Active -> Expired and
//!   Active -> Cancelled
//! - Once the policy leaves Active it is never mutated again
//! - Records are never deleted

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{AccountId, Amount, CoverageWindow, LocationId, ParameterKind, PolicyId};
use crate::error::PolicyError;
use crate::trigger::{ComparisonOperator, Trigger};

/// Policy lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolicyStatus {
    /// Coverage purchased and not yet resolved
    Active,
    /// Trigger met and payout released
    Claimed,
    /// Coverage window lapsed without a trigger
    Expired,
    /// Cancelled by the administrator
    Cancelled,
}

impl PolicyStatus {
    /// Returns true for terminal states
    pub fn is_resolved(&self) -> bool {
        !matches!(self, PolicyStatus::Active)
    }
}

impl fmt::Display for PolicyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PolicyStatus::Active => "Active",
            PolicyStatus::Claimed => "Claimed",
            PolicyStatus::Expired => "Expired",
            PolicyStatus::Cancelled => "Cancelled",
        };
        write!(f, "{}", name)
    }
}

/// Request to purchase coverage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRequest {
    pub holder: AccountId,
    pub window: CoverageWindow,
    pub location: LocationId,
    pub parameter: ParameterKind,
    pub trigger: Trigger,
    pub premium_paid: Amount,
    pub payout_amount: Amount,
}

/// A parametric weather policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    id: PolicyId,
    holder: AccountId,
    window: CoverageWindow,
    location: LocationId,
    parameter: ParameterKind,
    trigger: Trigger,
    premium_paid: Amount,
    payout_amount: Amount,
    status: PolicyStatus,
    created_at: DateTime<Utc>,
    resolved_at: Option<DateTime<Utc>>,
}

impl Policy {
    /// Creates an Active policy from a validated request
    pub(crate) fn issue(id: PolicyId, request: PolicyRequest, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            holder: request.holder,
            window: request.window,
            location: request.location,
            parameter: request.parameter,
            trigger: request.trigger,
            premium_paid: request.premium_paid,
            payout_amount: request.payout_amount,
            status: PolicyStatus::Active,
            created_at,
            resolved_at: None,
        }
    }

    pub fn id(&self) -> PolicyId {
        self.id
    }

    pub fn holder(&self) -> AccountId {
        self.holder
    }

    pub fn window(&self) -> &CoverageWindow {
        &self.window
    }

    pub fn location(&self) -> &LocationId {
        &self.location
    }

    pub fn parameter(&self) -> ParameterKind {
        self.parameter
    }

    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    pub fn operator(&self) -> ComparisonOperator {
        self.trigger.operator
    }

    pub fn premium_paid(&self) -> Amount {
        self.premium_paid
    }

    pub fn payout_amount(&self) -> Amount {
        self.payout_amount
    }

    pub fn status(&self) -> PolicyStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn resolved_at(&self) -> Option<DateTime<Utc>> {
        self.resolved_at
    }

    /// Returns true if the stored status is Active
    pub fn is_active(&self) -> bool {
        self.status == PolicyStatus::Active
    }

    /// Active and inside the coverage window at `at`
    pub fn is_in_force_at(&self, at: DateTime<Utc>) -> bool {
        self.is_active() && self.window.contains(at)
    }

    /// Expired by tag, or still tagged Active with a lapsed window
    pub fn is_expired_at(&self, at: DateTime<Utc>) -> bool {
        match self.status {
            PolicyStatus::Expired => true,
            PolicyStatus::Active => self.window.has_lapsed(at),
            _ => false,
        }
    }

    /// Returns true if this policy covers `parameter` at `location`
    pub fn covers(&self, location: &LocationId, parameter: ParameterKind) -> bool {
        &self.location == location && self.parameter == parameter
    }

    /// Moves the policy out of Active
    ///
    /// # Errors
    ///
    /// Returns `AlreadyResolved` if the policy is no longer Active, leaving it untouched.
    pub(crate) fn resolve(
        &mut self,
        target: PolicyStatus,
        at: DateTime<Utc>,
    ) -> Result<PolicyStatus, PolicyError> {
        if !self.can_transition_to(target) {
            return Err(PolicyError::AlreadyResolved {
                policy_id: self.id,
                status: self.status,
            });
        }
        let previous = self.status;
        self.status = target;
        self.resolved_at = Some(at);
        Ok(previous)
    }

    /// Returns a Claimed policy to Active after its payout could not be made
    pub(crate) fn reopen_claim(&mut self) -> Result<(), PolicyError> {
        if self.status != PolicyStatus::Claimed {
            return Err(PolicyError::AlreadyResolved {
                policy_id: self.id,
                status: self.status,
            });
        }
        self.status = PolicyStatus::Active;
        self.resolved_at = None;
        Ok(())
    }

    fn can_transition_to(&self, target: PolicyStatus) -> bool {
        use PolicyStatus::*;
        matches!(
            (self.status, target),
            (Active, Claimed) | (Active, Expired) | (Active, Cancelled)
        )
    }
}
