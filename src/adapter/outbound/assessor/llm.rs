//! LLM-backed risk assessor.
//!
//! The model sees both legs, the spread, and the rolling history, and must
//! reply with `{riskScore, reason, confidence?, direction?}`.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use crate::domain::{AssessmentSource, Direction, RiskAssessment};
use crate::error::AssessmentError;
use crate::port::outbound::assessor::{AssessmentContext, RiskAssessor};
use crate::port::outbound::llm::Llm;

/// Risk assessor delegating to an [`Llm`] provider.
pub struct LlmRiskAssessor {
    llm: Arc<dyn Llm>,
}

impl LlmRiskAssessor {
    /// Wrap a completion client.
    #[must_use]
    pub fn new(llm: Arc<dyn Llm>) -> Self {
        Self { llm }
    }

    /// Provider behind this assessor.
    #[must_use]
    pub fn provider(&self) -> &'static str {
        self.llm.name()
    }

    fn build_prompt(context: &AssessmentContext) -> String {
        let pct = |d: Decimal| (d * Decimal::ONE_HUNDRED).round_dp(2);
        let direction_hint = if context.spread.spread_decimal.is_sign_negative() {
            "The floating leg trades below the fixed leg; reversion favours a LONG floating position."
        } else {
            "The floating leg trades above the fixed leg; reversion favours a SHORT floating position."
        };

        format!(
            r#"You are a DeFi rates risk analyst guarding a stability vault.

## Market ({asset})
- Fixed-rate venue implied APR: {fixed}%
- Floating funding APR: {floating}%
- Spread (floating - fixed): {spread}% ({bps} bps)
- Recent spread history, oldest first: {history}

## Task
Estimate the risk (0-100) that this spread dislocation reverses against an
unhedged position. {direction_hint}

## Output (JSON only)
{{"riskScore": 0-100, "reason": "one sentence", "confidence": 0-100, "direction": "LONG" | "SHORT" | "HOLD"}}
"#,
            asset = context.asset,
            fixed = pct(context.fixed_rate),
            floating = pct(context.floating_rate),
            spread = pct(context.spread.spread_decimal),
            bps = context.spread.spread_bps,
            history = context.history_list(),
        )
    }

    fn parse_response(response: &str) -> Result<RiskAssessment, AssessmentError> {
        let json = extract_json(response)?;
        let raw: RawAssessment = serde_json::from_str(json)
            .map_err(|e| AssessmentError::Malformed(format!("invalid JSON: {e}")))?;

        if !raw.risk_score.is_finite() {
            return Err(AssessmentError::Malformed("riskScore is not a number".into()));
        }

        // `as` saturates, and the score is clamped afterwards.
        let mut assessment = RiskAssessment::new(
            raw.risk_score.round() as i64,
            raw.reason.unwrap_or_default(),
            AssessmentSource::Assessor,
        );
        if let Some(confidence) = raw.confidence.filter(|c| c.is_finite()) {
            assessment = assessment.with_confidence(confidence.round() as i64);
        }
        if let Some(direction) = raw.direction.as_deref().and_then(parse_direction) {
            assessment = assessment.with_direction(direction);
        }
        Ok(assessment)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAssessment {
    #[serde(alias = "risk_score")]
    risk_score: f64,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    direction: Option<String>,
}

fn parse_direction(raw: &str) -> Option<Direction> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "LONG" => Some(Direction::Long),
        "SHORT" => Some(Direction::Short),
        "HOLD" => Some(Direction::Hold),
        _ => None,
    }
}

/// Strip markdown fences and surrounding prose from a model reply.
fn extract_json(text: &str) -> Result<&str, AssessmentError> {
    let body = match text.find("```") {
        Some(open) => {
            let rest = &text[open + 3..];
            let rest = rest.strip_prefix("json").unwrap_or(rest);
            rest.find("```").map_or(rest, |close| &rest[..close])
        }
        None => text,
    };

    match (body.find('{'), body.rfind('}')) {
        (Some(start), Some(end)) if start < end => Ok(&body[start..=end]),
        _ => Err(AssessmentError::Malformed("no JSON object in response".into())),
    }
}

#[async_trait]
impl RiskAssessor for LlmRiskAssessor {
    fn name(&self) -> &'static str {
        "llm"
    }

    async fn assess(&self, context: &AssessmentContext) -> Result<RiskAssessment, AssessmentError> {
        let prompt = Self::build_prompt(context);
        let response = self
            .llm
            .complete(&prompt)
            .await
            .map_err(|e| AssessmentError::Unavailable(e.to_string()))?;
        debug!(provider = self.llm.name(), asset = %context.asset, "Assessor replied");

        Self::parse_response(&response)
    }
}
