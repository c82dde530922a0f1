//! Core Kernel - Foundational types for the parametric settlement engine
//!
//! This crate provides the building blocks used across all domain crates:
//! - Integer amounts and signed fixed-point measurements
//! - Coverage windows and the weather parameter vocabulary
//! - Identifiers, access control, and audit records
//! - Capability ports for fund transfers and time

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod access;
pub mod audit;
pub mod weather;
pub mod ports;

pub use money::{mul_div_floor, Amount, FixedPoint, Percent, MoneyError};
pub use temporal::{CoverageWindow, TemporalError};
pub use identifiers::{AccountId, ClaimId, PolicyId};
pub use access::{AccessControl, AccessError, Role};
pub use audit::ConfigurationChange;
pub use weather::{LocationId, ParameterKind};
pub use ports::{Clock, FundsTransfer, PortError, InMemoryTransfer, SystemClock, FixedClock, TransferRecord};
