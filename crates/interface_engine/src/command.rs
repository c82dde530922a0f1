//! Replayable engine commands
//!
//! One JSON object per line, tagged by `op`. An optional `at` moves the replay clock
//! before the command runs.
//!
//! Amounts in results are rendered as decimal strings.
//!
//! ```json
//! {"at":"2026-06-01T00:00:00Z","op":"deposit","provider":"<uuid>","amount":10000}
//! {"op":"evaluate","observation":{"payload":{..},"proof":"<hex>"}}
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use core_kernel::{AccountId, Amount, FundsTransfer, PolicyId};
use domain_oracle::{IssuerKey, WeatherObservation};
use domain_policy::PolicyRequest;

use crate::engine::SettlementEngine;
use crate::error::EngineResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    CreatePolicy {
        holder: AccountId,
        request: PolicyRequest,
    },
    Deposit {
        provider: AccountId,
        amount: Amount,
    },
    Withdraw {
        provider: AccountId,
        shares: u128,
    },
    Evaluate {
        observation: WeatherObservation,
    },
    SweepExpired {
        caller: AccountId,
    },
    CancelPolicy {
        caller: AccountId,
        policy_id: PolicyId,
        reason: String,
    },
    SetIssuer {
        caller: AccountId,
        key: IssuerKey,
    },
    SetYieldFraction {
        caller: AccountId,
        percent: u32,
    },
    SetPaused {
        caller: AccountId,
        paused: bool,
    },
    PoolStats,
}

/// A command with an optional clock override
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub command: Command,
}

impl Command {
    /// Applies the command and returns its result as JSON
    pub fn apply<T: FundsTransfer>(&self, engine: &SettlementEngine<T>) -> EngineResult<Value> {
        let result = match self {
            Command::CreatePolicy { holder, request } => {
                json!({ "policy_id": engine.create_policy(holder, request.clone())? })
            }
            Command::Deposit { provider, amount } => {
                json!({ "shares_minted": engine.deposit(provider, *amount)?.to_string() })
            }
            Command::Withdraw { provider, shares } => {
                json!({ "amount": engine.withdraw(provider, *shares)?.to_string() })
            }
            Command::Evaluate { observation } => {
                let report = engine.evaluate(observation)?;
                json!({
                    "paid": report.paid.iter().map(|c| c.policy_id).collect::<Vec<_>>(),
                    "already_resolved": report.already_resolved,
                    "not_triggered": report.not_triggered,
                    "total_paid": report.total_paid().to_string(),
                })
            }
            Command::SweepExpired { caller } => {
                json!({ "expired": engine.sweep_expired(caller)? })
            }
            Command::CancelPolicy {
                caller,
                policy_id,
                reason,
            } => {
                engine.cancel_policy(caller, *policy_id, reason)?;
                json!({ "cancelled": policy_id })
            }
            Command::SetIssuer { caller, key } => {
                engine.set_issuer(caller, *key.as_bytes())?;
                json!({ "issuer_key": key.to_hex() })
            }
            Command::SetYieldFraction { caller, percent } => {
                engine.set_yield_fraction(caller, *percent)?;
                json!({ "yield_fraction": percent })
            }
            Command::SetPaused { caller, paused } => {
                engine.set_paused(caller, *paused)?;
                json!({ "paused": paused })
            }
            Command::PoolStats => {
                let stats = engine.pool_stats()?;
                json!({
                    "total_value": stats.total_value.to_string(),
                    "total_liability": stats.total_liability.to_string(),
                    "utilization_bps": stats.utilization_bps.to_string(),
                    "total_premiums": stats.total_premiums.to_string(),
                    "total_payouts": stats.total_payouts.to_string(),
                })
            }
        };
        Ok(result)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::CreatePolicy { .. } => "create_policy",
            Command::Deposit { .. } => "deposit",
            Command::Withdraw { .. } => "withdraw",
            Command::Evaluate { .. } => "evaluate",
            Command::SweepExpired { .. } => "sweep_expired",
            Command::CancelPolicy { .. } => "cancel_policy",
            Command::SetIssuer { .. } => "set_issuer",
            Command::SetYieldFraction { .. } => "set_yield_fraction",
            Command::SetPaused { .. } => "set_paused",
            Command::PoolStats => "pool_stats",
        }
    }
}
