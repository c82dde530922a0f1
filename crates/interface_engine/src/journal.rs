//! Engine-wide event journal
//!
//! Component events are drained after each successful operation and appended here in
//! order, so the journal is the single observable audit stream of the engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::ConfigurationChange;
use domain_claims::ClaimEvent;
use domain_liquidity::LedgerEvent;
use domain_oracle::OracleEvent;
use domain_policy::PolicyEvent;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", content = "event", rename_all = "snake_case")]
pub enum SettlementEvent {
    Policy(PolicyEvent),
    Ledger(LedgerEvent),
    Oracle(OracleEvent),
    Claim(ClaimEvent),
    /// Engine-level configuration, e.g. the pause flag
    Engine(ConfigurationChange),
}

impl SettlementEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            SettlementEvent::Policy(e) => e.event_type(),
            SettlementEvent::Ledger(e) => e.event_type(),
            SettlementEvent::Oracle(e) => e.event_type(),
            SettlementEvent::Claim(e) => e.event_type(),
            SettlementEvent::Engine(_) => "ConfigurationChanged",
        }
    }

    pub fn is_configuration_change(&self) -> bool {
        matches!(
            self,
            SettlementEvent::Policy(PolicyEvent::ConfigurationChanged(_))
                | SettlementEvent::Ledger(LedgerEvent::ConfigurationChanged(_))
                | SettlementEvent::Oracle(OracleEvent::ConfigurationChanged(_))
                | SettlementEvent::Engine(_)
        )
    }
}

/// One journal entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Position in the journal, starting at 0
    pub sequence: u64,
    pub recorded_at: DateTime<Utc>,
    #[serde(flatten)]
    pub event: SettlementEvent,
}
