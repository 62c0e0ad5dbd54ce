//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Configuration is loaded from a TOML file; secrets such as the vault
//! signing key only ever come from the environment.
//!
//! # Example
//!
//! ```no_run
//! use kyute::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;

use super::engine::EngineConfig;
use super::hedge::HedgeConfig;
use super::llm::LlmConfig;
use super::logging::LoggingConfig;
use super::vault::VaultConfig;
use super::venue::VenuesConfig;
use crate::application::HedgeSettings;
use crate::error::{ConfigError, Result};

/// Environment variables checked, in order, for the vault signing key.
pub const PRIVATE_KEY_VARS: [&str; 2] = ["WALLET_PRIVATE_KEY", "PRIVATE_KEY"];

/// Main application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Assets evaluated every tick. Normalized to upper case on load.
    #[serde(default = "default_assets")]
    pub assets: Vec<String>,

    /// Seconds between scheduler ticks.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Simulate the vault instead of broadcasting transactions.
    ///
    /// Defaults to true.
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,

    /// Path to the SQLite audit database.
    #[serde(default = "default_database_path")]
    pub database: String,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub venues: VenuesConfig,

    #[serde(default)]
    pub vault: VaultConfig,

    #[serde(default)]
    pub hedge: HedgeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            assets: default_assets(),
            interval_secs: default_interval_secs(),
            dry_run: default_dry_run(),
            database: default_database_path(),
            logging: LoggingConfig::default(),
            engine: EngineConfig::default(),
            llm: LlmConfig::default(),
            venues: VenuesConfig::default(),
            vault: VaultConfig::default(),
            hedge: HedgeConfig::default(),
        }
    }
}

fn default_assets() -> Vec<String> {
    vec!["ETH".to_string()]
}

const fn default_interval_secs() -> u64 {
    30
}

const fn default_dry_run() -> bool {
    true
}

fn default_database_path() -> String {
    "kyute.db".to_string()
}

fn private_key_from_env() -> Option<String> {
    PRIVATE_KEY_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|key| !key.trim().is_empty())
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.to_string(),
    }
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// Loads the vault key from `WALLET_PRIVATE_KEY`, falling back to
    /// `PRIVATE_KEY`.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.vault.private_key = private_key_from_env();
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Upper-case and de-duplicate assets, keeping first occurrence order.
    ///
    /// Call again after overriding `assets` in code.
    pub fn normalize(&mut self) {
        let mut seen = std::collections::HashSet::new();
        self.assets = self
            .assets
            .iter()
            .map(|a| a.trim().to_uppercase())
            .filter(|a| seen.insert(a.clone()))
            .collect();
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        if self.assets.is_empty() || self.assets.iter().any(String::is_empty) {
            return Err(invalid("assets", "must list at least one non-empty asset").into());
        }
        if self.interval_secs == 0 {
            return Err(invalid("interval_secs", "must be greater than 0").into());
        }

        let engine = &self.engine;
        if engine.hedge_threshold <= Decimal::ZERO {
            return Err(invalid("engine.hedge_threshold", "must be greater than 0").into());
        }
        if engine.history_window < 2 {
            return Err(invalid("engine.history_window", "must be at least 2").into());
        }
        if engine.outlier_tolerance_pct <= Decimal::ZERO
            || engine.outlier_tolerance_pct > Decimal::ONE_HUNDRED
        {
            return Err(invalid("engine.outlier_tolerance_pct", "must be in (0, 100]").into());
        }
        if engine.volatility_baseline <= Decimal::ZERO {
            return Err(invalid("engine.volatility_baseline", "must be greater than 0").into());
        }
        if engine.assessor_timeout_secs == 0 {
            return Err(invalid("engine.assessor_timeout_secs", "must be greater than 0").into());
        }
        if engine.cycle_timeout_secs == 0 {
            return Err(invalid("engine.cycle_timeout_secs", "must be greater than 0").into());
        }
        if engine.placeholder_score > 100 {
            return Err(invalid("engine.placeholder_score", "must be at most 100").into());
        }

        if !self.venues.has_fixed() {
            return Err(invalid("venues.boros", "the fixed-rate venue must be enabled").into());
        }
        if !self.venues.has_floating() {
            return Err(invalid("venues", "at least one floating-rate venue must be enabled").into());
        }

        if self.hedge.notional <= Decimal::ZERO {
            return Err(invalid("hedge.notional", "must be greater than 0").into());
        }
        if self.hedge.fallback.strategy() == Some(self.hedge.primary) {
            return Err(invalid("hedge.fallback", "must differ from hedge.primary").into());
        }

        if !self.dry_run && self.vault.address.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "vault.address",
            }
            .into());
        }

        Ok(())
    }

    /// Scheduler tick interval.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Hedge policy for the orchestrator.
    #[must_use]
    pub fn hedge_settings(&self) -> HedgeSettings {
        HedgeSettings {
            notional: self.hedge.notional,
            auto_top_up: self.hedge.auto_top_up,
            markets: self.venues.markets(),
        }
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::adapter::outbound::execution::StrategyKind;
    use crate::domain::ConfidenceMode;
    use crate::error::Error;
    use crate::infrastructure::config::hedge::FallbackKind;
    use crate::infrastructure::config::llm::LlmProvider;

    fn invalid_field(content: &str) -> &'static str {
        match Config::parse_toml(content) {
            Err(Error::Config(ConfigError::InvalidValue { field, .. })) => field,
            Err(Error::Config(ConfigError::MissingField { field })) => field,
            other => panic!("expected a config error, got {other:?}"),
        }
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::parse_toml("").unwrap();

        assert_eq!(config.assets, vec!["ETH"]);
        assert_eq!(config.interval_secs, 30);
        assert!(config.dry_run);
        assert_eq!(config.database, "kyute.db");
        assert_eq!(config.engine.trigger_bps, 500);
        assert_eq!(config.engine.hedge_threshold, dec!(100));
        assert_eq!(config.engine.history_window, 24);
        assert_eq!(config.engine.volatility_baseline, dec!(0.05));
        assert_eq!(config.engine.placeholder_score, 10);
        assert_eq!(config.llm.provider, LlmProvider::Gemini);
        assert_eq!(config.hedge.notional, dec!(0.12));
        assert_eq!(config.hedge.primary, StrategyKind::DirectOrder);
        assert_eq!(config.hedge.fallback, FallbackKind::VaultRecord);
    }

    #[test]
    fn full_file_parses() {
        let config = Config::parse_toml(
            r#"
            assets = ["eth", "btc"]
            interval_secs = 60
            dry_run = true

            [logging]
            level = "debug"
            format = "json"

            [engine]
            trigger_bps = 800
            hedge_threshold = 90
            confidence = "reported"

            [engine.override]
            enabled = false

            [llm]
            provider = "anthropic"

            [llm.anthropic]
            model = "claude-test"

            [venues.binance]
            enabled = false

            [venues.boros.markets]
            eth = "0xabc"

            [hedge]
            notional = "0.5"
            fallback = "none"
            "#,
        )
        .unwrap();

        assert_eq!(config.assets, vec!["ETH", "BTC"]);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.engine.trigger_bps, 800);
        assert_eq!(config.engine.confidence, ConfidenceMode::Reported);
        assert!(!config.engine.override_check.enabled);
        assert_eq!(config.llm.completion_settings().model, "claude-test");
        assert!(!config.venues.binance.enabled);
        assert_eq!(config.hedge.notional, dec!(0.5));
        assert_eq!(config.hedge.fallback.strategy(), None);
        assert_eq!(
            config.hedge_settings().markets.get("ETH").map(String::as_str),
            Some("0xabc")
        );
    }

    #[test]
    fn engine_settings_carry_timeouts() {
        let config = Config::parse_toml("[engine]\ncycle_timeout_secs = 5").unwrap();
        let settings = config.engine.settings();
        assert_eq!(settings.cycle_timeout, Duration::from_secs(5));
        assert_eq!(settings.assessor_timeout, Duration::from_secs(20));
    }

    #[test]
    fn rejects_empty_assets() {
        assert_eq!(invalid_field("assets = []"), "assets");
    }

    #[test]
    fn rejects_non_positive_threshold() {
        assert_eq!(
            invalid_field("[engine]\nhedge_threshold = 0"),
            "engine.hedge_threshold"
        );
    }

    #[test]
    fn rejects_tiny_history_window() {
        assert_eq!(
            invalid_field("[engine]\nhistory_window = 1"),
            "engine.history_window"
        );
    }

    #[test]
    fn rejects_tolerance_out_of_range() {
        assert_eq!(
            invalid_field("[engine]\noutlier_tolerance_pct = 150"),
            "engine.outlier_tolerance_pct"
        );
    }

    #[test]
    fn rejects_zero_timeouts() {
        assert_eq!(
            invalid_field("[engine]\ncycle_timeout_secs = 0"),
            "engine.cycle_timeout_secs"
        );
    }

    #[test]
    fn rejects_missing_floating_venue() {
        assert_eq!(
            invalid_field("[venues.binance]\nenabled = false\n[venues.hyperliquid]\nenabled = false"),
            "venues"
        );
    }

    #[test]
    fn rejects_fallback_equal_to_primary() {
        assert_eq!(
            invalid_field("[hedge]\nprimary = \"vault_record\"\nfallback = \"vault_record\""),
            "hedge.fallback"
        );
    }

    #[test]
    fn rejects_non_positive_notional() {
        assert_eq!(invalid_field("[hedge]\nnotional = \"0\""), "hedge.notional");
    }

    #[test]
    fn live_mode_requires_vault_address() {
        assert_eq!(invalid_field("dry_run = false"), "vault.address");
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        assert!(matches!(
            Config::parse_toml("assets = ["),
            Err(Error::Config(ConfigError::Parse(_)))
        ));
    }
}
