//! TOML-backed engine configuration.
//!
//! Describes the session's starting selection and optional alert-rule seeds:
//!
//! ```toml
//! symbol = "ethusdt"
//! benchmark = "BTCUSDT"
//! granularity = "monthly"
//!
//! [[alerts]]
//! volatility_threshold = 0.02
//! anchor_date = "2024-01-01"
//! ```
//!
//! Dates are quoted `"YYYY-MM-DD"` strings. Normalization trims and
//! uppercases symbols, drops rules with no threshold set, and de-duplicates
//! identical rules while preserving order. Unknown fields are rejected.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{calendar::Granularity, errors::Error};

/// Top-level engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// The active symbol (e.g., "BTCUSDT").
    pub symbol: String,

    /// Benchmark symbol for index-aligned comparisons.
    #[serde(default = "default_benchmark")]
    pub benchmark: String,

    /// Starting view granularity.
    #[serde(default)]
    pub granularity: Granularity,

    /// Alert rules to seed the session with.
    #[serde(default)]
    pub alerts: Vec<AlertRuleCfg>,
}

/// One alert-rule seed from the configuration file.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AlertRuleCfg {
    /// Volatility threshold, if the rule watches volatility.
    pub volatility_threshold: Option<f64>,
    /// Performance threshold in percent, if the rule watches day moves.
    pub performance_threshold: Option<f64>,
    /// The day the rule is anchored to.
    pub anchor_date: NaiveDate,
}

fn default_benchmark() -> String {
    "BTCUSDT".to_string()
}

/// Parses and normalizes a configuration from a TOML string.
pub fn load_config_str(raw: &str) -> Result<EngineConfig, Error> {
    let mut config: EngineConfig =
        toml::from_str(raw).map_err(|e| Error::Config(e.to_string()))?;
    normalize_config(&mut config)?;
    Ok(config)
}

/// Parses and normalizes a configuration from a file path.
pub fn load_config_path(path: impl AsRef<Path>) -> Result<EngineConfig, Error> {
    let raw = std::fs::read_to_string(path).map_err(|e| Error::Config(e.to_string()))?;
    load_config_str(&raw)
}

fn normalize_config(config: &mut EngineConfig) -> Result<(), Error> {
    config.symbol = config.symbol.trim().to_uppercase();
    config.benchmark = config.benchmark.trim().to_uppercase();
    if config.symbol.is_empty() {
        return Err(Error::Config("symbol must not be empty".to_string()));
    }

    let mut kept: Vec<AlertRuleCfg> = Vec::with_capacity(config.alerts.len());
    for rule in config.alerts.drain(..) {
        if rule.volatility_threshold.is_none() && rule.performance_threshold.is_none() {
            warn!(anchor = %rule.anchor_date, "dropping alert rule with no thresholds");
            continue;
        }
        if kept.contains(&rule) {
            continue;
        }
        kept.push(rule);
    }
    config.alerts = kept;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_fills_defaults() {
        let config = load_config_str(r#"symbol = "ethusdt""#).unwrap();
        assert_eq!(config.symbol, "ETHUSDT");
        assert_eq!(config.benchmark, "BTCUSDT");
        assert_eq!(config.granularity, Granularity::Monthly);
        assert!(config.alerts.is_empty());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = load_config_str(r#"symbol = "BTCUSDT"
exchange = "binance""#)
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn empty_symbol_is_rejected() {
        let err = load_config_str(r#"symbol = "  ""#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn alert_seeds_are_normalized() {
        let raw = r#"
symbol = "btcusdt"
granularity = "weekly"

[[alerts]]
volatility_threshold = 0.02
anchor_date = "2024-01-01"

[[alerts]]
anchor_date = "2024-01-02"

[[alerts]]
volatility_threshold = 0.02
anchor_date = "2024-01-01"
"#;
        let config = load_config_str(raw).unwrap();
        assert_eq!(config.granularity, Granularity::Weekly);
        // The threshold-less rule is dropped and the duplicate collapsed.
        assert_eq!(config.alerts.len(), 1);
        assert_eq!(config.alerts[0].volatility_threshold, Some(0.02));
        assert_eq!(
            config.alerts[0].anchor_date,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
    }
}
