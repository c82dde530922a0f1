//! Domain events for claim evaluation

use serde::{Deserialize, Serialize};

use crate::claim::ClaimRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimEvent {
    /// A policy was claimed and its payout released
    ClaimProcessed(ClaimRecord),
}

impl ClaimEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            ClaimEvent::ClaimProcessed(_) => "ClaimProcessed",
        }
    }
}
