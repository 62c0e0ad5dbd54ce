//! Risk assessments and their local producers.
//!
//! An assessment comes from one of three places: the external assessor
//! (on a new threshold crossing), the deterministic fallback formula (when
//! the assessor fails), or the cheap placeholder (every other cycle). All
//! three satisfy the same contract: score clamped to `[0, 100]` and a
//! non-empty reason.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Reason attached to fallback assessments.
pub const FALLBACK_REASON: &str = "Simulated fallback assessment: risk assessor unavailable";

/// Reason attached to placeholder assessments.
pub const PLACEHOLDER_REASON: &str =
    "No new threshold crossing; assessment reused from local placeholder";

/// Default score of the placeholder assessment.
pub const DEFAULT_PLACEHOLDER_SCORE: u8 = 10;

const MAX_SCORE: i64 = 100;
const FALLBACK_BASE_CAP: i64 = 80;
const FALLBACK_RATE_WEIGHT: Decimal = Decimal::ONE_THOUSAND;
const FALLBACK_OFFSET: i64 = 10;

/// Who produced an assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentSource {
    /// External assessor (LLM or other service).
    Assessor,
    /// Deterministic fallback after an assessor failure.
    Fallback,
    /// Local placeholder when no new crossing occurred.
    Placeholder,
}

/// Trade direction suggested by an assessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Long,
    Short,
    Hold,
}

/// A risk score with its free-text rationale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    risk_score: u8,
    reason: String,
    source: AssessmentSource,
    confidence: Option<u8>,
    direction: Option<Direction>,
}

impl RiskAssessment {
    /// Create an assessment, clamping the score and defaulting a blank reason.
    #[must_use]
    pub fn new(risk_score: i64, reason: impl Into<String>, source: AssessmentSource) -> Self {
        let reason = reason.into();
        let reason = if reason.trim().is_empty() {
            default_reason(source).to_string()
        } else {
            reason
        };

        Self {
            risk_score: clamp_score(risk_score),
            reason,
            source,
            confidence: None,
            direction: None,
        }
    }

    /// Attach an assessor-reported confidence (clamped to 0-100).
    #[must_use]
    pub fn with_confidence(mut self, confidence: i64) -> Self {
        self.confidence = Some(clamp_score(confidence));
        self
    }

    /// Attach an assessor-suggested direction.
    #[must_use]
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    /// Deterministic assessment used when the external assessor fails.
    ///
    /// `min(floor(fixed * 1000), 80) + floor((floating - fixed) * 100) + 10`,
    /// clamped to `[0, 100]`.
    #[must_use]
    pub fn fallback(fixed_rate: Decimal, floating_rate: Decimal) -> Self {
        let base = (fixed_rate * FALLBACK_RATE_WEIGHT)
            .floor()
            .to_i64()
            .unwrap_or(FALLBACK_BASE_CAP)
            .min(FALLBACK_BASE_CAP);
        let spread_weight = ((floating_rate - fixed_rate) * Decimal::ONE_HUNDRED)
            .floor()
            .to_i64()
            .unwrap_or(0);

        Self::new(
            base.saturating_add(spread_weight)
                .saturating_add(FALLBACK_OFFSET),
            FALLBACK_REASON,
            AssessmentSource::Fallback,
        )
    }

    /// Cheap local assessment used while no new crossing occurs.
    #[must_use]
    pub fn placeholder(score: u8) -> Self {
        Self::new(
            i64::from(score),
            PLACEHOLDER_REASON,
            AssessmentSource::Placeholder,
        )
    }

    /// Risk score in `[0, 100]`.
    #[must_use]
    pub const fn risk_score(&self) -> u8 {
        self.risk_score
    }

    /// Free-text rationale, never empty.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Producer of the assessment.
    #[must_use]
    pub const fn source(&self) -> AssessmentSource {
        self.source
    }

    /// Assessor-reported confidence, if any.
    #[must_use]
    pub const fn confidence(&self) -> Option<u8> {
        self.confidence
    }

    /// Assessor-suggested direction, if any.
    #[must_use]
    pub const fn direction(&self) -> Option<Direction> {
        self.direction
    }

    /// Coarse label used in logs.
    #[must_use]
    pub const fn level(&self) -> &'static str {
        match self.risk_score {
            76..=100 => "CRITICAL",
            51..=75 => "HIGH",
            _ => "LOW",
        }
    }
}

fn clamp_score(score: i64) -> u8 {
    // Clamped into 0..=100, so the cast is lossless.
    score.clamp(0, MAX_SCORE) as u8
}

const fn default_reason(source: AssessmentSource) -> &'static str {
    match source {
        AssessmentSource::Assessor => "Assessor returned no rationale",
        AssessmentSource::Fallback => FALLBACK_REASON,
        AssessmentSource::Placeholder => PLACEHOLDER_REASON,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn score_is_clamped_into_range() {
        assert_eq!(
            RiskAssessment::new(140, "x", AssessmentSource::Assessor).risk_score(),
            100
        );
        assert_eq!(
            RiskAssessment::new(-5, "x", AssessmentSource::Assessor).risk_score(),
            0
        );
    }

    #[test]
    fn blank_reason_is_replaced() {
        let assessment = RiskAssessment::new(50, "   ", AssessmentSource::Assessor);
        assert!(!assessment.reason().is_empty());
    }

    #[test]
    fn fallback_scales_with_fixed_rate_and_spread() {
        // base min(100, 80) = 80, spread weight 8, offset 10 -> 98
        let assessment = RiskAssessment::fallback(dec!(0.10), dec!(0.18));
        assert_eq!(assessment.risk_score(), 98);
        assert_eq!(assessment.source(), AssessmentSource::Fallback);
        assert_eq!(assessment.reason(), FALLBACK_REASON);
    }

    #[test]
    fn fallback_is_clamped_at_100() {
        let assessment = RiskAssessment::fallback(dec!(0.20), dec!(0.60));
        assert_eq!(assessment.risk_score(), 100);
    }

    #[test]
    fn fallback_with_negative_spread_can_reach_zero() {
        let assessment = RiskAssessment::fallback(dec!(0.01), dec!(-0.50));
        assert_eq!(assessment.risk_score(), 0);
    }

    #[test]
    fn placeholder_uses_fixed_low_score() {
        let assessment = RiskAssessment::placeholder(DEFAULT_PLACEHOLDER_SCORE);
        assert_eq!(assessment.risk_score(), 10);
        assert_eq!(assessment.source(), AssessmentSource::Placeholder);
        assert_eq!(assessment.level(), "LOW");
    }

    #[test]
    fn levels_follow_score_bands() {
        let level = |s| RiskAssessment::new(s, "r", AssessmentSource::Assessor).level();
        assert_eq!(level(90), "CRITICAL");
        assert_eq!(level(60), "HIGH");
        assert_eq!(level(50), "LOW");
    }

    #[test]
    fn confidence_is_clamped() {
        let assessment =
            RiskAssessment::new(50, "r", AssessmentSource::Assessor).with_confidence(250);
        assert_eq!(assessment.confidence(), Some(100));
    }
}
