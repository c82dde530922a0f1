//! Observation gateway
//!
//! Authenticates externally supplied observations against a single trusted issuer.
//! `submit` never fails: any mismatch, malformed key or bad signature is simply
//! reported as unverified.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

use core_kernel::{AccessControl, AccountId, ConfigurationChange, Role};
use crate::error::OracleError;
use crate::events::OracleEvent;
use crate::observation::{ObservationPayload, ObservationProof};
use crate::verifier::{Ed25519Verifier, IssuerKey, ObservationVerifier};

/// Submission counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GatewayStats {
    pub verified: u64,
    pub rejected: u64,
}

#[derive(Debug, Clone)]
pub struct ObservationGateway {
    issuer: IssuerKey,
    verifier: Arc<dyn ObservationVerifier>,
    access: AccessControl,
    stats: GatewayStats,
    events: Vec<OracleEvent>,
}

impl ObservationGateway {
    /// Creates a gateway verifying Ed25519 signatures from `issuer`
    pub fn new(access: AccessControl, issuer: IssuerKey) -> Self {
        Self::with_verifier(access, issuer, Arc::new(Ed25519Verifier))
    }

    pub fn with_verifier(
        access: AccessControl,
        issuer: IssuerKey,
        verifier: Arc<dyn ObservationVerifier>,
    ) -> Self {
        Self {
            issuer,
            verifier,
            access,
            stats: GatewayStats::default(),
            events: Vec::new(),
        }
    }

    pub fn issuer(&self) -> &IssuerKey {
        &self.issuer
    }

    pub fn stats(&self) -> GatewayStats {
        self.stats
    }

    pub fn events(&self) -> &[OracleEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<OracleEvent> {
        std::mem::take(&mut self.events)
    }

    /// Returns true if `proof` is the issuer's signature over `payload`
    pub fn submit(
        &mut self,
        payload: &ObservationPayload,
        proof: &ObservationProof,
        now: DateTime<Utc>,
    ) -> bool {
        let message = payload.canonical_bytes();
        let verified = self.verifier.verify(&self.issuer, &message, proof);

        if verified {
            self.stats.verified += 1;
            debug!(observation = %payload, "observation verified");
            self.events.push(OracleEvent::ObservationVerified {
                payload: payload.clone(),
                timestamp: now,
            });
        } else {
            self.stats.rejected += 1;
            warn!(observation = %payload, issuer = %self.issuer, "observation rejected");
            self.events.push(OracleEvent::ObservationRejected {
                payload: payload.clone(),
                timestamp: now,
            });
        }
        verified
    }

    /// Rotates the trusted issuer key (admin only)
    ///
    /// # Errors
    ///
    /// - `Unauthorized` unless the caller is the administrator
    /// - `InvalidIssuerKey` if `key` is not a valid Ed25519 public key
    pub fn set_issuer(
        &mut self,
        caller: &AccountId,
        key: [u8; 32],
        now: DateTime<Utc>,
    ) -> Result<(), OracleError> {
        self.access.ensure(caller, Role::Admin)?;
        let key = IssuerKey::from_bytes(key)?;

        let change = ConfigurationChange::new("issuer_key", self.issuer, key, now);
        self.issuer = key;
        self.events.push(OracleEvent::ConfigurationChanged(change));
        Ok(())
    }
}
