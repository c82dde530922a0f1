//! Policy Registry Domain
//!
//! This crate owns parametric weather policies: their records, trigger conditions,
//! premium calculation, and lifecycle transitions.
//!
//! # Architecture
//!
//! - **Registry**: `PolicyRegistry` is the sole owner of policy records
//! - **Value Objects**: Trigger, PolicyLimits, RiskRateTable
//! - **Domain Events**: PolicyCreated, PolicyClaimed, PolicyExpired, PolicyCancelled
//!
//! # Policy Lifecycle
//!
//! ```text
//! Active -> Claimed
//!        \-> Expired
//!        \-> Cancelled
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_policy::{PolicyRegistry, PolicyRequest};
//!
//! let id = registry.create_policy(&issuer, request, now)?;
//! registry.mark_claimed(&settler, id, observed_at)?;
//! ```

pub mod error;
pub mod events;
pub mod limits;
pub mod policy;
pub mod premium;
pub mod registry;
pub mod trigger;

pub use error::PolicyError;
pub use events::PolicyEvent;
pub use limits::{PolicyLimits, ThresholdRange};
pub use policy::{Policy, PolicyRequest, PolicyStatus};
pub use premium::{OperatorLoadings, PremiumCalculator, PremiumInputs, RiskRateTable};
pub use registry::PolicyRegistry;
pub use trigger::{ComparisonOperator, Trigger};
