//! Spread volatility amplification factor.
//!
//! The factor is `1 + stdDev / baseline`, where the baseline is the spread
//! volatility considered normal (5 percentage points by default). Fewer
//! than two samples carry no information and yield the neutral factor 1.

use rust_decimal::{Decimal, MathematicalOps};

/// Default reference spread volatility (5 percentage points).
pub const DEFAULT_BASELINE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

/// Derives a dimensionless multiplier from the rolling spread history.
#[derive(Debug, Clone, Copy)]
pub struct VolatilityEstimator {
    baseline: Decimal,
}

impl Default for VolatilityEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_BASELINE)
    }
}

impl VolatilityEstimator {
    /// Create an estimator with a custom baseline. Non-positive baselines
    /// fall back to the default.
    #[must_use]
    pub fn new(baseline: Decimal) -> Self {
        let baseline = if baseline > Decimal::ZERO {
            baseline
        } else {
            DEFAULT_BASELINE
        };
        Self { baseline }
    }

    /// Reference spread volatility.
    #[must_use]
    pub const fn baseline(&self) -> Decimal {
        self.baseline
    }

    /// Amplification factor for a history of spread values.
    #[must_use]
    pub fn factor(&self, history: &[Decimal]) -> Decimal {
        if history.len() < 2 {
            return Decimal::ONE;
        }
        Decimal::ONE + population_std_dev(history) / self.baseline
    }
}

/// Population standard deviation; zero for fewer than two values.
#[must_use]
pub fn population_std_dev(values: &[Decimal]) -> Decimal {
    if values.len() < 2 {
        return Decimal::ZERO;
    }

    let n = Decimal::from(values.len());
    let mean = values.iter().copied().sum::<Decimal>() / n;
    let variance = values
        .iter()
        .map(|v| {
            let d = *v - mean;
            d * d
        })
        .sum::<Decimal>()
        / n;

    if variance.is_zero() {
        return Decimal::ZERO;
    }
    variance.sqrt().unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn assert_close(actual: Decimal, expected: Decimal) {
        assert!(
            (actual - expected).abs() < dec!(0.000000001),
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn empty_history_is_neutral() {
        assert_eq!(VolatilityEstimator::default().factor(&[]), Decimal::ONE);
    }

    #[test]
    fn single_sample_is_neutral() {
        assert_eq!(
            VolatilityEstimator::default().factor(&[dec!(0.42)]),
            Decimal::ONE
        );
    }

    #[test]
    fn flat_history_gives_baseline_factor() {
        let history = [dec!(0.05), dec!(0.05), dec!(0.05), dec!(0.05)];
        assert_eq!(VolatilityEstimator::default().factor(&history), Decimal::ONE);
    }

    #[test]
    fn std_dev_equal_to_baseline_doubles_factor() {
        // mean 0.05, deviations +-0.05 -> population std dev 0.05
        let history = [dec!(0.00), dec!(0.10)];
        assert_close(VolatilityEstimator::default().factor(&history), dec!(2));
    }

    #[test]
    fn custom_baseline_scales_factor() {
        let history = [dec!(0.00), dec!(0.10)];
        assert_close(VolatilityEstimator::new(dec!(0.10)).factor(&history), dec!(1.5));
    }

    #[test]
    fn non_positive_baseline_uses_default() {
        assert_eq!(VolatilityEstimator::new(dec!(0)).baseline(), dec!(0.05));
    }
}
