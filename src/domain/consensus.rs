//! Consensus rate aggregation.
//!
//! Combines same-asset observations from several venues into one median,
//! rejecting outliers once there are enough samples to tell them apart.
//! A median of zero is the "no data" sentinel: callers must not treat it
//! as a real zero rate.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::rate::RateObservation;

/// Minimum number of observations before outlier rejection applies.
pub const MIN_FILTER_SAMPLE: usize = 3;

/// Default relative deviation tolerance, in percent.
pub const DEFAULT_TOLERANCE_PCT: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// Outlier-filtered median over one asset's observations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsensusRate {
    asset: String,
    median_rate: Decimal,
    sources: Vec<RateObservation>,
    computed_at: DateTime<Utc>,
}

impl ConsensusRate {
    /// The consensus for an asset with no usable observations.
    #[must_use]
    pub fn empty(asset: impl Into<String>) -> Self {
        Self {
            asset: asset.into(),
            median_rate: Decimal::ZERO,
            sources: Vec::new(),
            computed_at: Utc::now(),
        }
    }

    /// Asset the consensus is for.
    #[must_use]
    pub fn asset(&self) -> &str {
        &self.asset
    }

    /// Median after outlier filtering. Zero means no data.
    #[must_use]
    pub const fn median_rate(&self) -> Decimal {
        self.median_rate
    }

    /// Observations that survived outlier filtering.
    #[must_use]
    pub fn sources(&self) -> &[RateObservation] {
        &self.sources
    }

    /// When the consensus was formed.
    #[must_use]
    pub const fn computed_at(&self) -> DateTime<Utc> {
        self.computed_at
    }

    /// True when the median is the zero sentinel.
    #[must_use]
    pub fn is_no_data(&self) -> bool {
        self.median_rate.is_zero()
    }
}

/// Median-of-venues aggregator with relative-deviation outlier rejection.
#[derive(Debug, Clone, Copy)]
pub struct ConsensusAggregator {
    tolerance: Decimal,
}

impl Default for ConsensusAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE_PCT)
    }
}

impl ConsensusAggregator {
    /// Create an aggregator with a tolerance in percent (5 = 5%).
    #[must_use]
    pub fn new(tolerance_pct: Decimal) -> Self {
        Self {
            tolerance: tolerance_pct / Decimal::ONE_HUNDRED,
        }
    }

    /// Aggregate observations for a single asset.
    ///
    /// Input order does not matter. Never fails: no observations yields a
    /// zero median and no sources.
    #[must_use]
    pub fn aggregate(&self, asset: &str, observations: &[RateObservation]) -> ConsensusRate {
        let relevant: Vec<RateObservation> = observations
            .iter()
            .filter(|o| o.asset() == asset)
            .cloned()
            .collect();

        if relevant.is_empty() {
            return ConsensusRate::empty(asset);
        }

        let sources = self.filter_outliers(relevant);
        let rates: Vec<Decimal> = sources.iter().map(RateObservation::annualized_rate).collect();

        ConsensusRate {
            asset: asset.to_string(),
            median_rate: median(&rates),
            sources,
            computed_at: Utc::now(),
        }
    }

    /// Drop observations deviating from the raw median by more than the tolerance.
    fn filter_outliers(&self, observations: Vec<RateObservation>) -> Vec<RateObservation> {
        if observations.len() < MIN_FILTER_SAMPLE {
            return observations;
        }

        let rates: Vec<Decimal> = observations
            .iter()
            .map(RateObservation::annualized_rate)
            .collect();
        let raw = median(&rates);
        if raw.is_zero() {
            return observations;
        }

        observations
            .into_iter()
            .filter(|o| ((o.annualized_rate() - raw) / raw).abs() <= self.tolerance)
            .collect()
    }
}

/// Median of a slice; the mean of the two middle values for even counts.
///
/// Returns zero for an empty slice.
#[must_use]
pub fn median(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }

    let mut sorted = values.to_vec();
    sorted.sort();
    let mid = sorted.len() / 2;

    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / Decimal::TWO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rate::RateLeg;
    use rust_decimal_macros::dec;

    fn obs(venue: &str, rate: Decimal) -> RateObservation {
        RateObservation::new(venue, "ETH", RateLeg::Floating, rate)
    }

    #[test]
    fn median_of_single_value_is_that_value() {
        assert_eq!(median(&[dec!(0.12)]), dec!(0.12));
    }

    #[test]
    fn median_of_two_values_is_their_mean() {
        assert_eq!(median(&[dec!(0.10), dec!(0.20)]), dec!(0.15));
    }

    #[test]
    fn median_of_three_values_is_middle_after_sorting() {
        assert_eq!(median(&[dec!(0.30), dec!(0.10), dec!(0.20)]), dec!(0.20));
    }

    #[test]
    fn median_of_empty_is_zero() {
        assert_eq!(median(&[]), Decimal::ZERO);
    }

    #[test]
    fn aggregate_empty_returns_no_data() {
        let consensus = ConsensusAggregator::default().aggregate("ETH", &[]);
        assert!(consensus.is_no_data());
        assert!(consensus.sources().is_empty());
    }

    #[test]
    fn outlier_filter_skipped_below_three_observations() {
        let observations = vec![obs("a", dec!(0.10)), obs("b", dec!(0.90))];
        let consensus = ConsensusAggregator::default().aggregate("ETH", &observations);
        assert_eq!(consensus.sources().len(), 2);
        assert_eq!(consensus.median_rate(), dec!(0.50));
    }

    #[test]
    fn outlier_is_rejected_with_three_observations() {
        let observations = vec![
            obs("a", dec!(0.100)),
            obs("b", dec!(0.102)),
            obs("c", dec!(0.300)),
        ];
        let consensus = ConsensusAggregator::default().aggregate("ETH", &observations);
        assert_eq!(consensus.sources().len(), 2);
        assert_eq!(consensus.median_rate(), dec!(0.101));
        assert!(consensus.sources().iter().all(|o| o.venue() != "c"));
    }

    #[test]
    fn zero_raw_median_keeps_all_observations() {
        let observations = vec![
            obs("a", dec!(-0.05)),
            obs("b", dec!(0)),
            obs("c", dec!(0.40)),
        ];
        let consensus = ConsensusAggregator::default().aggregate("ETH", &observations);
        assert_eq!(consensus.sources().len(), 3);
        assert!(consensus.is_no_data());
    }

    #[test]
    fn aggregate_ignores_other_assets() {
        let observations = vec![
            obs("a", dec!(0.10)),
            RateObservation::new("b", "BTC", RateLeg::Floating, dec!(0.50)),
        ];
        let consensus = ConsensusAggregator::default().aggregate("ETH", &observations);
        assert_eq!(consensus.sources().len(), 1);
        assert_eq!(consensus.median_rate(), dec!(0.10));
    }

    #[test]
    fn wider_tolerance_keeps_moderate_deviation() {
        let observations = vec![
            obs("a", dec!(0.10)),
            obs("b", dec!(0.11)),
            obs("c", dec!(0.12)),
        ];
        let strict = ConsensusAggregator::new(dec!(5)).aggregate("ETH", &observations);
        let loose = ConsensusAggregator::new(dec!(20)).aggregate("ETH", &observations);
        assert_eq!(strict.sources().len(), 1);
        assert_eq!(loose.sources().len(), 3);
    }
}
