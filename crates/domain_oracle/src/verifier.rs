//! Proof verification capability
//!
//! The gateway delegates the cryptographic check to an `ObservationVerifier`. The
//! default is Ed25519 over the canonical payload bytes.

use ed25519_dalek::{Signature, VerifyingKey};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::OracleError;
use crate::observation::{decode_hex, hex_array, ObservationProof};

/// The trusted issuer's public key
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "IssuerKeyRepr")]
pub struct IssuerKey(#[serde(with = "hex_array")] [u8; 32]);

#[derive(Deserialize)]
struct IssuerKeyRepr(#[serde(with = "hex_array")] [u8; 32]);

impl TryFrom<IssuerKeyRepr> for IssuerKey {
    type Error = OracleError;

    fn try_from(repr: IssuerKeyRepr) -> Result<Self, Self::Error> {
        IssuerKey::from_bytes(repr.0)
    }
}

impl IssuerKey {
    /// Accepts only bytes that decode to a valid Ed25519 point of large order
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, OracleError> {
        let key = VerifyingKey::from_bytes(&bytes)
            .map_err(|e| OracleError::InvalidIssuerKey(e.to_string()))?;
        if key.is_weak() {
            return Err(OracleError::InvalidIssuerKey("small-order point".to_string()));
        }
        Ok(Self(bytes))
    }

    pub fn from_verifying_key(key: &VerifyingKey) -> Self {
        Self(key.to_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for IssuerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for IssuerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IssuerKey({})", self.to_hex())
    }
}

impl FromStr for IssuerKey {
    type Err = OracleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = decode_hex::<32>(s).map_err(OracleError::InvalidIssuerKey)?;
        IssuerKey::from_bytes(bytes)
    }
}

/// Checks a proof over a message against the issuer key
pub trait ObservationVerifier: Send + Sync + fmt::Debug {
    /// Returns true only for a valid proof; never fails
    fn verify(&self, issuer: &IssuerKey, message: &[u8], proof: &ObservationProof) -> bool;
}

/// Ed25519 signature verification
///
/// Uses strict verification, so a payload has exactly one accepted proof per key.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Verifier;

impl ObservationVerifier for Ed25519Verifier {
    fn verify(&self, issuer: &IssuerKey, message: &[u8], proof: &ObservationProof) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(issuer.as_bytes()) else {
            return false;
        };
        let signature = Signature::from_bytes(proof.as_bytes());

        match verifying_key.verify_strict(message, &signature) {
            Ok(()) => true,
            Err(_) => false,
        }
    }
}
