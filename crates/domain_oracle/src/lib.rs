//! Observation Gateway Domain
//!
//! Authenticates weather observations before they are allowed to move money.
//! An observation is a payload (location, parameter kind, value, timestamp) plus a
//! proof: the trusted issuer's Ed25519 signature over the payload's canonical bytes.

pub mod error;
pub mod events;
pub mod gateway;
pub mod observation;
pub mod verifier;

pub use error::OracleError;
pub use events::OracleEvent;
pub use gateway::{GatewayStats, ObservationGateway};
pub use observation::{ObservationPayload, ObservationProof, WeatherObservation, CANONICAL_TAG};
pub use verifier::{Ed25519Verifier, IssuerKey, ObservationVerifier};
