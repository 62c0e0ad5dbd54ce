//! Decision engine configuration.

use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::application::EngineSettings;
use crate::domain::{ConfidenceMode, OverrideConfig};

/// `[engine]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Spread in basis points that edge-triggers the risk assessment.
    #[serde(default = "default_trigger_bps")]
    pub trigger_bps: i64,

    /// Composite score at or above which a hedge is executed.
    #[serde(default = "default_hedge_threshold")]
    pub hedge_threshold: Decimal,

    /// Spread samples kept for volatility and assessor context.
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Consensus outlier tolerance in percent.
    #[serde(default = "default_outlier_tolerance_pct")]
    pub outlier_tolerance_pct: Decimal,

    /// Spread volatility considered normal.
    #[serde(default = "default_volatility_baseline")]
    pub volatility_baseline: Decimal,

    #[serde(default = "default_assessor_timeout_secs")]
    pub assessor_timeout_secs: u64,

    /// Upper bound on the hedge phase of one cycle.
    #[serde(default = "default_cycle_timeout_secs")]
    pub cycle_timeout_secs: u64,

    /// Risk score used while no new crossing occurs.
    #[serde(default = "default_placeholder_score")]
    pub placeholder_score: u8,

    /// Source of the confidence boost.
    #[serde(default)]
    pub confidence: ConfidenceMode,

    /// Rate-confidence must-hedge check.
    #[serde(default, rename = "override")]
    pub override_check: OverrideConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            trigger_bps: default_trigger_bps(),
            hedge_threshold: default_hedge_threshold(),
            history_window: default_history_window(),
            outlier_tolerance_pct: default_outlier_tolerance_pct(),
            volatility_baseline: default_volatility_baseline(),
            assessor_timeout_secs: default_assessor_timeout_secs(),
            cycle_timeout_secs: default_cycle_timeout_secs(),
            placeholder_score: default_placeholder_score(),
            confidence: ConfidenceMode::default(),
            override_check: OverrideConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Engine settings from this section.
    #[must_use]
    pub fn settings(&self) -> EngineSettings {
        EngineSettings {
            trigger_bps: self.trigger_bps,
            hedge_threshold: self.hedge_threshold,
            history_window: self.history_window,
            outlier_tolerance_pct: self.outlier_tolerance_pct,
            volatility_baseline: self.volatility_baseline,
            assessor_timeout: Duration::from_secs(self.assessor_timeout_secs),
            cycle_timeout: Duration::from_secs(self.cycle_timeout_secs),
            placeholder_score: self.placeholder_score,
            confidence: self.confidence,
            override_check: self.override_check,
        }
    }
}

const fn default_trigger_bps() -> i64 {
    500
}

fn default_hedge_threshold() -> Decimal {
    Decimal::ONE_HUNDRED
}

const fn default_history_window() -> usize {
    crate::domain::spread::DEFAULT_HISTORY_WINDOW
}

fn default_outlier_tolerance_pct() -> Decimal {
    Decimal::from(5)
}

const fn default_volatility_baseline() -> Decimal {
    crate::domain::volatility::DEFAULT_BASELINE
}

const fn default_assessor_timeout_secs() -> u64 {
    20
}

const fn default_cycle_timeout_secs() -> u64 {
    90
}

const fn default_placeholder_score() -> u8 {
    crate::domain::assessment::DEFAULT_PLACEHOLDER_SCORE
}
