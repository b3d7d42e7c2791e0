//! Engine configuration
//!
//! Loaded from a JSON file. Unknown keys are rejected; missing keys take
//! the defaults below.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tradecycle_gateway::{RetryPolicy, SandboxConfig};
use tradecycle_order_manager::{FillWait, SelectionPolicy};
use tradecycle_strategy::{SessionGate, SignalParams};

use crate::error::{EngineError, Result};

/// Which venue environment the engine trades in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountMode {
    Live,
    #[default]
    Sandbox,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Fraction of free capital spent on one entry
    pub allocation_fraction: Decimal,
    pub stop_loss_pct: Decimal,
    pub target_profit_pct: Decimal,
    pub commission_rate: Decimal,
    /// Signal tick interval
    pub poll_interval_secs: u64,
    pub account_mode: AccountMode,
    pub selection: SelectionPolicy,
    pub order_poll_interval_secs: u64,
    pub order_fill_timeout_secs: u64,
    /// Sleep while the instrument's session is closed
    pub session_poll_interval_secs: u64,
    /// Unbounded when absent
    pub session_max_wait_secs: Option<u64>,
    pub venue_retry_attempts: u32,
    pub venue_retry_backoff_ms: u64,
    pub sandbox: SandboxConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            allocation_fraction: dec!(0.1),
            stop_loss_pct: dec!(0.01),
            target_profit_pct: dec!(0.01),
            commission_rate: dec!(0.0004),
            poll_interval_secs: 10,
            account_mode: AccountMode::Sandbox,
            selection: SelectionPolicy::default(),
            order_poll_interval_secs: 3,
            order_fill_timeout_secs: 600,
            session_poll_interval_secs: 2000,
            session_max_wait_secs: None,
            venue_retry_attempts: 3,
            venue_retry_backoff_ms: 500,
            sandbox: SandboxConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            EngineError::Input(format!("cannot read {}: {}", path.as_ref().display(), e))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| EngineError::Input(format!("invalid config: {}", e)))
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(EngineError::Input(msg));

        if self.allocation_fraction <= Decimal::ZERO || self.allocation_fraction > Decimal::ONE {
            return invalid(format!(
                "allocation_fraction {} outside (0, 1]",
                self.allocation_fraction
            ));
        }
        if self.stop_loss_pct <= Decimal::ZERO || self.stop_loss_pct >= Decimal::ONE {
            return invalid(format!("stop_loss_pct {} outside (0, 1)", self.stop_loss_pct));
        }
        if self.target_profit_pct <= Decimal::ZERO {
            return invalid(format!(
                "target_profit_pct {} must be positive",
                self.target_profit_pct
            ));
        }
        if self.commission_rate < Decimal::ZERO || self.commission_rate >= Decimal::ONE {
            return invalid(format!(
                "commission_rate {} outside [0, 1)",
                self.commission_rate
            ));
        }
        for (name, secs) in [
            ("poll_interval_secs", self.poll_interval_secs),
            ("order_poll_interval_secs", self.order_poll_interval_secs),
            ("order_fill_timeout_secs", self.order_fill_timeout_secs),
            ("session_poll_interval_secs", self.session_poll_interval_secs),
        ] {
            if secs == 0 {
                return invalid(format!("{} must be positive", name));
            }
        }
        if self.session_max_wait_secs == Some(0) {
            return invalid("session_max_wait_secs must be positive when set".to_string());
        }
        if let SelectionPolicy::RandomFavorite { favorites } = &self.selection {
            if favorites.is_empty() {
                return invalid("random_favorite selection needs at least one favorite".to_string());
            }
        }
        if self.venue_retry_attempts == 0 {
            return invalid("venue_retry_attempts must be at least 1".to_string());
        }
        Ok(())
    }

    pub fn signal_params(&self) -> SignalParams {
        SignalParams {
            stop_loss_pct: self.stop_loss_pct,
            target_profit_pct: self.target_profit_pct,
            commission_rate: self.commission_rate,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn fill_wait(&self) -> FillWait {
        FillWait {
            poll_interval: Duration::from_secs(self.order_poll_interval_secs),
            timeout: Duration::from_secs(self.order_fill_timeout_secs),
        }
    }

    pub fn session_gate(&self) -> SessionGate {
        SessionGate::new(Duration::from_secs(self.session_poll_interval_secs))
            .with_max_wait(self.session_max_wait_secs.map(Duration::from_secs))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.venue_retry_attempts,
            Duration::from_millis(self.venue_retry_backoff_ms),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tradecycle_core::InstrumentId;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.allocation_fraction, dec!(0.1));
        assert_eq!(config.account_mode, AccountMode::Sandbox);
        assert_eq!(config.session_max_wait_secs, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            "allocation_fraction": 0.25,
            "stop_loss_pct": 0.02,
            "target_profit_pct": 0.015,
            "commission_rate": 0.0005,
            "poll_interval_secs": 5,
            "account_mode": "live",
            "selection": { "policy": "random_favorite", "favorites": ["SBER", "GAZP"] },
            "session_max_wait_secs": 3600
        }"#;

        let config = EngineConfig::from_json(json).unwrap();
        assert_eq!(config.allocation_fraction, dec!(0.25));
        assert_eq!(config.commission_rate, dec!(0.0005));
        assert_eq!(config.account_mode, AccountMode::Live);
        assert_eq!(
            config.selection.instrument_ids(),
            vec![InstrumentId::new("SBER"), InstrumentId::new("GAZP")]
        );
        assert_eq!(config.fill_wait().timeout, Duration::from_secs(600));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let err = EngineConfig::from_json(r#"{ "leverage": 3 }"#).unwrap_err();
        assert!(matches!(err, EngineError::Input(_)));
    }

    #[test]
    fn test_validation() {
        let mut config = EngineConfig {
            allocation_fraction: dec!(1.5),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.allocation_fraction = dec!(1);
        assert!(config.validate().is_ok());

        config.stop_loss_pct = dec!(0);
        assert!(config.validate().is_err());
        config.stop_loss_pct = dec!(0.01);

        config.poll_interval_secs = 0;
        assert!(config.validate().is_err());
        config.poll_interval_secs = 10;

        config.selection = SelectionPolicy::RandomFavorite { favorites: vec![] };
        assert!(config.validate().is_err());
    }
}
