//! Observation gateway errors

use thiserror::Error;

use core_kernel::AccessError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OracleError {
    #[error("Invalid issuer key: {0}")]
    InvalidIssuerKey(String),

    #[error("Invalid proof encoding: {0}")]
    InvalidProof(String),

    #[error(transparent)]
    Unauthorized(#[from] AccessError),
}
