//! Settlement Engine Interface
//!
//! This crate composes the policy, liquidity, oracle and claims domains into one
//! serialized engine with all-or-nothing operations.
//!
//! # Architecture
//!
//! - **Engine**: `SettlementEngine`, a single-writer facade over the four components
//! - **Journal**: The ordered audit stream of every committed event
//! - **Commands**: JSON-lines commands replayed by the `settlement-replay` binary
//! - **Config / Telemetry**: `config`-crate loading and tracing setup
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_engine::{EngineConfig, SettlementEngine};
//!
//! let engine = SettlementEngine::new(&config, InMemoryTransfer::new(), Arc::new(SystemClock))?;
//! let shares = engine.deposit(&provider, Amount::new(10_000))?;
//! let report = engine.evaluate(&observation)?;
//! ```

pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod journal;
pub mod telemetry;

pub use command::{Command, Step};
pub use config::{EngineConfig, LogFormat};
pub use engine::SettlementEngine;
pub use error::{EngineError, EngineResult};
pub use journal::{JournalEntry, SettlementEvent};
pub use telemetry::init_tracing;
