//! Composite hedge scoring.
//!
//! `compositeScore = riskScore + confidenceBoost + spread * 100 * volatilityFactor`
//!
//! The confidence boost comes from a [`ConfidenceSignal`]. The default
//! [`KeywordConfidence`] is a text heuristic over the assessment reason; it
//! can be swapped for [`ReportedConfidence`] (or any other signal) without
//! touching the scorer.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::assessment::{Direction, RiskAssessment};

/// Boost awarded when the confidence signal is positive.
pub const CONFIDENCE_BOOST: u8 = 20;

/// Default composite score at or above which a hedge is taken.
pub const DEFAULT_HEDGE_THRESHOLD: Decimal = Decimal::ONE_HUNDRED;

/// Keywords that mark a confident assessment reason.
pub const CONFIDENCE_KEYWORDS: [&str; 6] = [
    "extreme",
    "high",
    "likely",
    "significant",
    "crash",
    "collapse",
];

/// Minimum reported confidence (0-100) counted as confident.
pub const REPORTED_CONFIDENCE_MIN: u8 = 80;

/// Source of the confidence boost fed into the composite score.
pub trait ConfidenceSignal: Send + Sync {
    /// Signal name for logging.
    fn name(&self) -> &'static str;

    /// Boost to add to the composite score for this assessment.
    fn boost(&self, assessment: &RiskAssessment) -> u8;
}

/// Case-insensitive keyword match over the assessment reason.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordConfidence;

impl ConfidenceSignal for KeywordConfidence {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn boost(&self, assessment: &RiskAssessment) -> u8 {
        let reason = assessment.reason().to_lowercase();
        if CONFIDENCE_KEYWORDS.iter().any(|k| reason.contains(k)) {
            CONFIDENCE_BOOST
        } else {
            0
        }
    }
}

/// Uses the assessor-reported confidence when present, otherwise keywords.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportedConfidence;

impl ConfidenceSignal for ReportedConfidence {
    fn name(&self) -> &'static str {
        "reported"
    }

    fn boost(&self, assessment: &RiskAssessment) -> u8 {
        match assessment.confidence() {
            Some(c) if c >= REPORTED_CONFIDENCE_MIN => CONFIDENCE_BOOST,
            Some(_) => 0,
            None => KeywordConfidence.boost(assessment),
        }
    }
}

/// Configured choice of confidence signal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceMode {
    #[default]
    Keyword,
    Reported,
}

impl ConfidenceMode {
    /// Build the signal for this mode.
    #[must_use]
    pub fn signal(self) -> Box<dyn ConfidenceSignal> {
        match self {
            Self::Keyword => Box::new(KeywordConfidence),
            Self::Reported => Box::new(ReportedConfidence),
        }
    }
}

/// Result of scoring one cycle. Derived, never persisted as state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompositeDecision {
    pub composite_score: Decimal,
    pub volatility_factor: Decimal,
    pub confidence_boost: u8,
    pub spread_term: Decimal,
    /// Composite threshold reached.
    pub threshold_met: bool,
    /// Upstream must-hedge override was set.
    pub override_set: bool,
    /// The assessor advised HOLD.
    pub vetoed: bool,
    /// Final decision: threshold met OR override set, unless vetoed.
    pub hedge: bool,
}

/// Combines risk, confidence, and volatility-weighted spread.
pub struct CompositeScorer {
    hedge_threshold: Decimal,
    signal: Box<dyn ConfidenceSignal>,
}

impl std::fmt::Debug for CompositeScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeScorer")
            .field("hedge_threshold", &self.hedge_threshold)
            .field("signal", &self.signal.name())
            .finish()
    }
}

impl Default for CompositeScorer {
    fn default() -> Self {
        Self::new(DEFAULT_HEDGE_THRESHOLD, Box::new(KeywordConfidence))
    }
}

impl CompositeScorer {
    /// Create a scorer with a threshold and confidence signal.
    #[must_use]
    pub fn new(hedge_threshold: Decimal, signal: Box<dyn ConfidenceSignal>) -> Self {
        Self {
            hedge_threshold,
            signal,
        }
    }

    /// Composite score needed to hedge.
    #[must_use]
    pub const fn hedge_threshold(&self) -> Decimal {
        self.hedge_threshold
    }

    #[must_use]
    pub fn signal_name(&self) -> &'static str {
        self.signal.name()
    }

    /// Score an assessment. `must_hedge` is OR-combined with the threshold.
    ///
    /// An assessment that advises [`Direction::Hold`] vetoes the hedge
    /// whatever the score or override.
    #[must_use]
    pub fn score(
        &self,
        risk: &RiskAssessment,
        spread_decimal: Decimal,
        volatility_factor: Decimal,
        must_hedge: bool,
    ) -> CompositeDecision {
        let confidence_boost = self.signal.boost(risk);
        let spread_term = spread_decimal * Decimal::ONE_HUNDRED * volatility_factor;
        let composite_score =
            Decimal::from(risk.risk_score()) + Decimal::from(confidence_boost) + spread_term;
        let threshold_met = composite_score >= self.hedge_threshold;
        let vetoed = risk.direction() == Some(Direction::Hold);

        CompositeDecision {
            composite_score,
            volatility_factor,
            confidence_boost,
            spread_term,
            threshold_met,
            override_set: must_hedge,
            vetoed,
            hedge: (threshold_met || must_hedge) && !vetoed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::assessment::AssessmentSource;
    use rust_decimal_macros::dec;

    fn assessment(score: i64, reason: &str) -> RiskAssessment {
        RiskAssessment::new(score, reason, AssessmentSource::Assessor)
    }

    #[test]
    fn high_risk_high_confidence_scenario_hedges() {
        let scorer = CompositeScorer::default();
        let risk = assessment(85, "Significant reversion expected");
        let decision = scorer.score(&risk, dec!(0.08), dec!(1.5), false);

        assert_eq!(decision.confidence_boost, 20);
        assert_eq!(decision.spread_term, dec!(12));
        assert_eq!(decision.composite_score, dec!(117));
        assert!(decision.threshold_met);
        assert!(decision.hedge);
    }

    #[test]
    fn keyword_match_is_case_insensitive() {
        assert_eq!(KeywordConfidence.boost(&assessment(10, "EXTREME dislocation")), 20);
        assert_eq!(KeywordConfidence.boost(&assessment(10, "Likely to revert")), 20);
    }

    #[test]
    fn no_keyword_means_no_boost() {
        assert_eq!(KeywordConfidence.boost(&assessment(10, "Spread is stable")), 0);
    }

    #[test]
    fn placeholder_and_fallback_reasons_carry_no_boost() {
        assert_eq!(KeywordConfidence.boost(&RiskAssessment::placeholder(10)), 0);
        assert_eq!(
            KeywordConfidence.boost(&RiskAssessment::fallback(dec!(0.1), dec!(0.1))),
            0
        );
    }

    #[test]
    fn override_forces_hedge_below_threshold() {
        let scorer = CompositeScorer::default();
        let decision = scorer.score(&assessment(10, "calm"), dec!(0.01), dec!(1), true);
        assert!(!decision.threshold_met);
        assert!(decision.override_set);
        assert!(decision.hedge);
    }

    #[test]
    fn below_threshold_without_override_holds() {
        let scorer = CompositeScorer::default();
        let decision = scorer.score(&assessment(10, "calm"), dec!(0.01), dec!(1), false);
        assert_eq!(decision.composite_score, dec!(11));
        assert!(!decision.hedge);
    }

    #[test]
    fn reported_confidence_prefers_assessor_value() {
        let confident = assessment(50, "calm").with_confidence(90);
        let unsure = assessment(50, "high risk").with_confidence(40);
        let unreported = assessment(50, "high risk");

        assert_eq!(ReportedConfidence.boost(&confident), 20);
        assert_eq!(ReportedConfidence.boost(&unsure), 0);
        assert_eq!(ReportedConfidence.boost(&unreported), 20);
    }

    #[test]
    fn hold_direction_vetoes_threshold_and_override() {
        let scorer = CompositeScorer::default();
        let risk = assessment(85, "High reversion risk").with_direction(Direction::Hold);

        let decision = scorer.score(&risk, dec!(0.08), dec!(1.5), true);

        assert!(decision.threshold_met);
        assert!(decision.vetoed);
        assert!(!decision.hedge);
    }

    #[test]
    fn short_direction_does_not_veto() {
        let scorer = CompositeScorer::default();
        let risk = assessment(85, "High reversion risk").with_direction(Direction::Short);
        let decision = scorer.score(&risk, dec!(0.08), dec!(1.5), false);
        assert!(!decision.vetoed);
        assert!(decision.hedge);
    }

    #[test]
    fn custom_threshold_is_respected() {
        let scorer = CompositeScorer::new(dec!(150), ConfidenceMode::Keyword.signal());
        let decision = scorer.score(&assessment(85, "high"), dec!(0.08), dec!(1.5), false);
        assert!(!decision.hedge);
    }
}
