//! Identity-based access control
//!
//! Every restricted operation takes the caller's `AccountId` and checks it against
//! the role it requires before touching any state.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

use crate::identifiers::AccountId;

/// Roles that gate restricted operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Configuration changes, cancellations, sweeps
    Admin,
    /// The policy-creation path, allowed to credit premiums
    PolicyIssuer,
    /// The claim evaluator, allowed to mark claims and debit payouts
    ClaimSettler,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Admin => "admin",
            Role::PolicyIssuer => "policy_issuer",
            Role::ClaimSettler => "claim_settler",
        };
        write!(f, "{}", name)
    }
}

/// Error returned when a caller lacks the required role
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unauthorized: {caller} does not hold role {role}")]
pub struct AccessError {
    pub caller: AccountId,
    pub role: Role,
}

/// Role assignments for a component
///
/// The administrative identity always holds `Admin`; other roles are granted to
/// the internal identities that drive cross-component calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessControl {
    admin: AccountId,
    grants: BTreeMap<Role, BTreeSet<AccountId>>,
}

impl AccessControl {
    /// Creates access control with a single administrative identity
    pub fn new(admin: AccountId) -> Self {
        let mut grants = BTreeMap::new();
        grants.insert(Role::Admin, BTreeSet::from([admin]));
        Self { admin, grants }
    }

    /// Grants a role to an account
    pub fn grant(mut self, role: Role, account: AccountId) -> Self {
        self.grants.entry(role).or_default().insert(account);
        self
    }

    /// Returns the administrative identity
    pub fn admin(&self) -> AccountId {
        self.admin
    }

    /// Returns true if `caller` holds `role`
    pub fn has_role(&self, caller: &AccountId, role: Role) -> bool {
        self.grants
            .get(&role)
            .map_or(false, |holders| holders.contains(caller))
    }

    /// Fails with `AccessError` unless `caller` holds `role`
    pub fn ensure(&self, caller: &AccountId, role: Role) -> Result<(), AccessError> {
        if self.has_role(caller, role) {
            Ok(())
        } else {
            tracing::warn!(%caller, %role, "access denied");
            Err(AccessError {
                caller: *caller,
                role,
            })
        }
    }

    /// Fails unless `caller` holds any of `roles`
    pub fn ensure_any(&self, caller: &AccountId, roles: &[Role]) -> Result<(), AccessError> {
        if roles.iter().any(|role| self.has_role(caller, *role)) {
            return Ok(());
        }
        let role = roles.first().copied().unwrap_or(Role::Admin);
        tracing::warn!(%caller, %role, "access denied");
        Err(AccessError {
            caller: *caller,
            role,
        })
    }
}
