//! Engine configuration

use std::path::Path;

use serde::Deserialize;

use core_kernel::AccountId;
use domain_oracle::IssuerKey;
use domain_policy::{PolicyLimits, RiskRateTable};

use crate::error::EngineError;

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// The single administrative identity
    pub admin: AccountId,
    /// Hex-encoded Ed25519 public key of the trusted observation issuer
    pub issuer_key: IssuerKey,
    /// Share of net pool income paid to providers, in percent
    #[serde(default = "default_yield_fraction")]
    pub yield_fraction: u32,
    /// Start with new business intake paused
    #[serde(default)]
    pub paused: bool,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    #[serde(default)]
    pub limits: PolicyLimits,
    #[serde(default)]
    pub risk_rates: RiskRateTable,
}

fn default_yield_fraction() -> u32 {
    100
}

fn default_log_level() -> String {
    "info".to_string()
}

impl EngineConfig {
    /// Creates a configuration with default limits and rates
    pub fn new(admin: AccountId, issuer_key: IssuerKey) -> Self {
        Self {
            admin,
            issuer_key,
            yield_fraction: default_yield_fraction(),
            paused: false,
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            limits: PolicyLimits::default(),
            risk_rates: RiskRateTable::default(),
        }
    }

    /// Loads configuration from an optional file, then `SETTLEMENT_*` environment variables
    ///
    /// Nested keys use `__`, e.g. `SETTLEMENT_LIMITS__MIN_PAYOUT=500`.
    pub fn load(file: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder
            .add_source(
                config::Environment::with_prefix("SETTLEMENT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Rejects values the engine cannot start with
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.yield_fraction > 100 {
            return Err(EngineError::InvalidConfiguration(format!(
                "yield_fraction {} exceeds 100",
                self.yield_fraction
            )));
        }
        self.limits
            .validate()
            .and_then(|_| self.risk_rates.validate())
            .map_err(|e| EngineError::InvalidConfiguration(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> IssuerKey {
        // RFC 8032 test vector 1 public key
        "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a"
            .parse()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::new(AccountId::new(), key());
        assert_eq!(config.yield_fraction, 100);
        assert!(!config.paused);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_minimal_json() {
        let admin = AccountId::new();
        let json = format!(
            r#"{{"admin":"{}","issuer_key":"{}","log_format":"json"}}"#,
            admin.as_uuid(),
            key().to_hex()
        );
        let config: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config.admin, admin);
        assert_eq!(config.issuer_key, key());
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.limits, PolicyLimits::default());
    }

    #[test]
    fn test_rejects_yield_fraction_over_hundred() {
        let mut config = EngineConfig::new(AccountId::new(), key());
        config.yield_fraction = 101;
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidConfiguration(_))
        ));
    }
}
