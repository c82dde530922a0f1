//! Settlement Replay Binary
//!
//! Replays a JSON-lines command stream against a fresh engine and prints the
//! resulting journal as JSON lines.
//!
//! # Usage
//!
//! ```bash
//! # Read commands from a file
//! settlement-replay commands.jsonl
//!
//! # Read commands from stdin
//! cat commands.jsonl | settlement-replay
//! ```
//!
//! # Environment Variables
//!
//! * `SETTLEMENT_CONFIG_FILE` - Optional configuration file (toml, yaml or json)
//! * `SETTLEMENT_ADMIN` - Administrator account UUID
//! * `SETTLEMENT_ISSUER_KEY` - Hex Ed25519 public key of the observation issuer
//! * `SETTLEMENT_YIELD_FRACTION` - Provider yield share in percent (default: 100)
//! * `SETTLEMENT_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `SETTLEMENT_LOG_FORMAT` - `pretty` or `json` (default: pretty)

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use core_kernel::{FixedClock, InMemoryTransfer};
use interface_engine::{init_tracing, EngineConfig, SettlementEngine, Step};

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config_file = std::env::var_os("SETTLEMENT_CONFIG_FILE").map(PathBuf::from);
    let config = EngineConfig::load(config_file.as_deref()).context("loading configuration")?;

    init_tracing(&config.log_level, config.log_format);

    let clock = Arc::new(FixedClock::new(Utc::now()));
    let engine = SettlementEngine::new(&config, InMemoryTransfer::new(), clock.clone())
        .context("building settlement engine")?;

    let input: Box<dyn BufRead> = match std::env::args_os().nth(1) {
        Some(path) => {
            let file = File::open(&path)
                .with_context(|| format!("opening {}", PathBuf::from(&path).display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut applied = 0usize;
    let mut rejected = 0usize;
    for (index, line) in input.lines().enumerate() {
        let line = line.context("reading command stream")?;
        let line_no = index + 1;
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }

        let step: Step = serde_json::from_str(&line)
            .with_context(|| format!("parsing command on line {}", line_no))?;
        if let Some(at) = step.at {
            clock.set(at);
        }

        match step.command.apply(&engine) {
            Ok(result) => {
                applied += 1;
                tracing::info!(line = line_no, op = step.command.name(), %result, "command applied");
            }
            Err(e) => {
                rejected += 1;
                tracing::warn!(line = line_no, op = step.command.name(), error = %e, "command rejected");
            }
        }
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for entry in engine.drain_journal() {
        serde_json::to_writer(&mut out, &entry)?;
        writeln!(out)?;
    }

    let transfers = engine.with_transfer(|t| t.records().len());
    tracing::info!(applied, rejected, transfers, "replay complete");
    Ok(())
}
