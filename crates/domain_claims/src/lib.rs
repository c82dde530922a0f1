//! Claim Evaluation Domain
//!
//! This crate settles parametric claims without manual adjudication: an authenticated
//! observation is compared against the trigger of every matching policy and met
//! triggers are paid from the pool.
//!
//! # Settlement Order
//!
//! ```text
//! verify proof -> match policies -> check pool -> mark Claimed -> debit payout
//! ```

pub mod claim;
pub mod error;
pub mod evaluator;
pub mod events;

pub use claim::{ClaimRecord, EvaluationReport};
pub use error::ClaimError;
pub use evaluator::ClaimEvaluator;
pub use events::ClaimEvent;
