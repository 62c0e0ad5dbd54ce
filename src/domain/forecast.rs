//! Deterministic funding forecast behind the must-hedge override.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const WIDE_SPREAD: Decimal = Decimal::from_parts(5, 0, 0, false, 2);
const WIDE_DRIFT: Decimal = Decimal::from_parts(2, 0, 0, false, 2);
const NARROW_DRIFT: Decimal = Decimal::from_parts(1, 0, 0, false, 2);
const CONFIDENT_BPS: u32 = 8000;
const UNSURE_BPS: u32 = 5000;

/// Predicted floating APR with a confidence in basis points (10000 = certain).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FundingForecast {
    pub predicted_apr: Decimal,
    pub confidence_bps: u32,
}

impl FundingForecast {
    /// Forecast the floating leg from the current pair of rates.
    ///
    /// A spread above 5 points is expected to widen by 2 more; anything
    /// else drifts 1 point lower. Confidence is high whenever floating
    /// trades above fixed.
    #[must_use]
    pub fn predict(floating_rate: Decimal, fixed_rate: Decimal) -> Self {
        let diff = floating_rate - fixed_rate;
        let predicted_apr = if diff > WIDE_SPREAD {
            floating_rate + WIDE_DRIFT
        } else {
            floating_rate - NARROW_DRIFT
        };
        let confidence_bps = if diff > Decimal::ZERO {
            CONFIDENT_BPS
        } else {
            UNSURE_BPS
        };

        Self {
            predicted_apr,
            confidence_bps,
        }
    }
}

/// Settings of the must-hedge override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct OverrideConfig {
    /// Disable to rely on the composite threshold alone.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Minimum forecast confidence in basis points.
    #[serde(default = "default_min_confidence_bps")]
    pub min_confidence_bps: u32,
    /// Minimum predicted spread over the fixed leg, decimal APR.
    #[serde(default = "default_min_predicted_spread")]
    pub min_predicted_spread: Decimal,
}

impl Default for OverrideConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            min_confidence_bps: default_min_confidence_bps(),
            min_predicted_spread: default_min_predicted_spread(),
        }
    }
}

const fn default_enabled() -> bool {
    true
}

const fn default_min_confidence_bps() -> u32 {
    CONFIDENT_BPS
}

fn default_min_predicted_spread() -> Decimal {
    Decimal::new(10, 2)
}

/// Whether the forecast alone mandates a hedge.
#[must_use]
pub fn must_hedge(config: &OverrideConfig, forecast: &FundingForecast, fixed_rate: Decimal) -> bool {
    config.enabled
        && forecast.confidence_bps >= config.min_confidence_bps
        && forecast.predicted_apr - fixed_rate >= config.min_predicted_spread
}
