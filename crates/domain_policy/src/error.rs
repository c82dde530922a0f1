//! Policy domain errors
//!
//! This module defines all error types that can occur within the
//! policy registry.

use thiserror::Error;

use core_kernel::{AccessError, MoneyError, PolicyId};
use crate::policy::PolicyStatus;

/// Errors that can occur in the policy domain
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// Request failed validation; nothing was written
    #[error("Invalid policy parameters: {0}")]
    InvalidPolicyParameters(String),

    /// No policy with this id exists
    #[error("Policy not found: {0}")]
    NotFound(PolicyId),

    /// The policy has already left the Active state
    #[error("Policy {policy_id} already resolved as {status}")]
    AlreadyResolved {
        policy_id: PolicyId,
        status: PolicyStatus,
    },

    /// Expiry requested before the coverage window has lapsed
    #[error("Coverage for policy {0} has not lapsed")]
    CoverageNotLapsed(PolicyId),

    /// Invalid configuration supplied by an administrator
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Policy id sequence exhausted
    #[error("Policy id space exhausted")]
    IdSpaceExhausted,

    #[error(transparent)]
    Unauthorized(#[from] AccessError),

    #[error("Arithmetic error: {0}")]
    Money(#[from] MoneyError),
}

impl PolicyError {
    /// Creates an invalid parameters error
    pub fn invalid(message: impl Into<String>) -> Self {
        PolicyError::InvalidPolicyParameters(message.into())
    }

    /// Returns true for deterministic validation rejections
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PolicyError::InvalidPolicyParameters(_) | PolicyError::InvalidConfiguration(_)
        )
    }
}
